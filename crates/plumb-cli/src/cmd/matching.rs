use crate::output::{print_json, print_table, yes_no};
use anyhow::Context;
use plumb_core::matcher::{MatchDebug, MatchRequest, MatchResult, Matcher};
use plumb_core::provider::ProviderCatalog;
use plumb_core::types::{CapabilityCode, Severity};
use std::path::Path;

pub fn run(
    root: &Path,
    services: &[String],
    severity: &str,
    debug: bool,
    json: bool,
) -> anyhow::Result<()> {
    let severity: Severity = severity.parse()?;
    let codes = services.iter().map(|s| CapabilityCode::new(s.as_str())).collect();
    let request = MatchRequest::new(codes, severity).map_err(plumb_core::PlumbError::from)?;
    run_request(root, &request, debug, json)
}

/// Load the catalog fresh and print the ranking for `request`.
pub fn run_request(
    root: &Path,
    request: &MatchRequest,
    debug: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let catalog = ProviderCatalog::load(&config.catalog_path(root))
        .context("failed to load provider catalog")?;
    let matcher = Matcher::new(config.emergency_capability());

    let providers = matcher.rank_request(&catalog.providers, request);
    let verdicts = debug.then(|| matcher.debug_request(&catalog.providers, request));

    if json {
        let mut value = serde_json::json!({ "ok": true, "providers": providers });
        if let Some(d) = &verdicts {
            value["debug"] = serde_json::to_value(d)?;
        }
        return print_json(&value);
    }

    print_ranking(&providers, request.severity());
    if let Some(d) = &verdicts {
        println!();
        print_verdicts(d);
    }
    Ok(())
}

pub fn print_ranking(providers: &[MatchResult], severity: Severity) {
    if providers.is_empty() {
        println!("No providers cover every required service ({severity}).");
        return;
    }
    let rows = providers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            vec![
                (i + 1).to_string(),
                m.provider.id.clone(),
                m.provider.name.clone(),
                m.provider.phone.clone(),
                m.ranking.score.to_string(),
                yes_no(m.ranking.emergency_capable).to_string(),
            ]
        })
        .collect();
    print_table(&["#", "ID", "NAME", "PHONE", "SCORE", "EMERGENCY"], rows);
}

fn print_verdicts(debug: &MatchDebug) {
    let rows = debug
        .all_providers
        .iter()
        .map(|v| {
            let missing = v
                .missing_services
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(",");
            vec![v.id.clone(), v.reason.clone(), missing]
        })
        .collect();
    print_table(&["ID", "VERDICT", "MISSING"], rows);
}
