use anyhow::Context;
use plumb_core::config::Config;
use plumb_core::{io, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let dir = paths::plumb_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    let config_created = !config_path.exists();
    if config_created {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
    }

    let catalog_path = root.join(paths::DEFAULT_CATALOG_FILE);
    let catalog_created =
        io::write_if_missing(&catalog_path, b"[]\n").context("failed to write providers.json")?;

    if json {
        return crate::output::print_json(&serde_json::json!({
            "root": root,
            "config_created": config_created,
            "catalog_created": catalog_created,
        }));
    }

    println!("Initializing plumb in: {}", root.display());
    let status = |created: bool| if created { "created:" } else { "exists: " };
    println!("  {} {}", status(config_created), paths::CONFIG_FILE);
    println!("  {} {}", status(catalog_created), paths::DEFAULT_CATALOG_FILE);
    Ok(())
}
