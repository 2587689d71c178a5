use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const PLUMB_DIR: &str = ".plumb";
pub const CONFIG_FILE: &str = ".plumb/config.yaml";
pub const DEFAULT_CATALOG_FILE: &str = ".plumb/providers.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn plumb_dir(root: &Path) -> PathBuf {
    root.join(PLUMB_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path. Absolute paths are kept as-is; relative ones
/// are taken from the project root.
pub fn resolve(root: &Path, configured: &str) -> PathBuf {
    let p = Path::new(configured);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}
