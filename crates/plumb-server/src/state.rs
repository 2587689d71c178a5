use plumb_core::config::Config;
use plumb_core::matcher::Matcher;
use plumb_core::tree::DecisionTree;
use plumb_core::{PlumbError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
///
/// The tree is loaded once at startup; the provider catalog is not cached
/// and is read on every match call.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub tree: Arc<DecisionTree>,
    pub matcher: Matcher,
}

impl AppState {
    pub fn load(root: PathBuf) -> Result<Self> {
        let config = match Config::load(&root) {
            Ok(c) => c,
            Err(PlumbError::NotInitialized) => {
                tracing::warn!(root = %root.display(), "no .plumb/config.yaml found, using defaults");
                Config::default()
            }
            Err(e) => return Err(e),
        };

        let tree = match config.tree_path(&root) {
            Some(path) => DecisionTree::load(&path)?,
            None => DecisionTree::builtin(),
        };

        Ok(Self {
            matcher: Matcher::new(config.emergency_capability()),
            root,
            config: Arc::new(config),
            tree: Arc::new(tree),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_root_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::load(dir.path().to_path_buf()).unwrap();
        assert_eq!(state.root, dir.path());
        assert_eq!(state.tree.root, "location");
        assert_eq!(state.matcher.emergency_capability().as_str(), "EMERGENCY_PLUMBING");
    }

    #[test]
    fn missing_tree_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.tree.path = Some("nope.yaml".to_string());
        cfg.save(dir.path()).unwrap();
        assert!(AppState::load(dir.path().to_path_buf()).is_err());
    }
}
