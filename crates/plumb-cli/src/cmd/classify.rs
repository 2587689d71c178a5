use crate::output::print_json;
use anyhow::anyhow;
use plumb_core::catalog;
use plumb_core::classify::classify;
use plumb_core::normalize::{normalize, Answers};
use plumb_core::translate::translate;

/// Parse `key=value` pairs. Later duplicates win.
pub fn parse_answers(pairs: &[String]) -> anyhow::Result<Answers> {
    let mut answers = Answers::new();
    for pair in pairs {
        let (k, v) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid answer '{pair}': expected KEY=VALUE"))?;
        let k = k.trim();
        if k.is_empty() {
            return Err(anyhow!("invalid answer '{pair}': empty key"));
        }
        answers.insert(k.to_string(), v.trim().to_string());
    }
    Ok(answers)
}

pub fn run(pairs: &[String], json: bool) -> anyhow::Result<()> {
    let answers = parse_answers(pairs)?;
    let normalized = normalize(&answers);
    let result = classify(&normalized.diagnostic_input());
    let capability = translate(&result.service_code);
    let service = catalog::lookup(result.service_code.as_str());

    if json {
        return print_json(&serde_json::json!({
            "normalized": normalized,
            "result": result,
            "capability": capability,
            "service": service,
        }));
    }

    println!("Reported:   {}", normalized.reported_trail);
    println!(
        "Service:    {} ({})",
        catalog::label_for(result.service_code.as_str()),
        result.service_code
    );
    println!("Capability: {capability}");
    println!("Severity:   {}", result.severity.as_str());
    println!("Confidence: {:.2}", result.confidence);
    if let Some(s) = service {
        println!(
            "Estimate:   ${}-${}, {}",
            s.estimated_price.low, s.estimated_price.high, s.typical_duration
        );
    }
    println!();
    for line in &result.explanation {
        println!("  - {line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_trims() {
        let a = parse_answers(&[
            "location = Kitchen".to_string(),
            "symptom_sink=Clogged or slow drain".to_string(),
        ])
        .unwrap();
        assert_eq!(a["location"], "Kitchen");
        assert_eq!(a["symptom_sink"], "Clogged or slow drain");
    }

    #[test]
    fn value_may_contain_equals() {
        let a = parse_answers(&["note=a=b".to_string()]).unwrap();
        assert_eq!(a["note"], "a=b");
    }

    #[test]
    fn rejects_missing_separator_and_empty_key() {
        assert!(parse_answers(&["Kitchen".to_string()]).is_err());
        assert!(parse_answers(&["=Kitchen".to_string()]).is_err());
    }
}
