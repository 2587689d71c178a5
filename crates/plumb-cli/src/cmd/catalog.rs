use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use plumb_core::provider::ProviderCatalog;
use std::path::Path;

#[derive(Subcommand)]
pub enum CatalogSubcommand {
    /// List providers and the capabilities they advertise
    List,
    /// Report unknown capability codes, empty service lists, duplicate ids
    Audit,
}

pub fn run(root: &Path, subcmd: CatalogSubcommand, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let path = config.catalog_path(root);
    let catalog = ProviderCatalog::load(&path).context("failed to load provider catalog")?;

    match subcmd {
        CatalogSubcommand::List => list(&catalog, json),
        CatalogSubcommand::Audit => audit(&catalog, json),
    }
}

fn list(catalog: &ProviderCatalog, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&catalog.providers);
    }
    if catalog.providers.is_empty() {
        println!("No providers.");
        return Ok(());
    }
    let rows = catalog
        .providers
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                p.phone.clone(),
                p.services
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "PHONE", "SERVICES"], rows);
    Ok(())
}

fn audit(catalog: &ProviderCatalog, json: bool) -> anyhow::Result<()> {
    let findings = catalog.audit();
    if json {
        print_json(&serde_json::json!({
            "providers": catalog.providers.len(),
            "findings": findings,
        }))?;
    } else if findings.is_empty() {
        println!("Catalog is clean ({} providers).", catalog.providers.len());
    } else {
        for f in &findings {
            println!("[warning] {f}");
        }
    }
    Ok(())
}
