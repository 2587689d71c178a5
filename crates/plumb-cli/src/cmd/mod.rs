pub mod catalog;
pub mod classify;
pub mod config;
pub mod diagnose;
pub mod init;
pub mod matching;
pub mod serve;
pub mod tree;

use anyhow::Context;
use plumb_core::config::Config;
use plumb_core::tree::DecisionTree;
use plumb_core::PlumbError;
use std::path::Path;

/// Project config, or defaults when `plumb init` has not been run.
pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    match Config::load(root) {
        Ok(cfg) => Ok(cfg),
        Err(PlumbError::NotInitialized) => {
            tracing::debug!(root = %root.display(), "no config found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e).context("failed to load .plumb/config.yaml"),
    }
}

/// The configured tree, or the built-in one.
pub fn load_tree(root: &Path, config: &Config) -> anyhow::Result<DecisionTree> {
    match config.tree_path(root) {
        Some(path) => DecisionTree::load(&path)
            .with_context(|| format!("failed to load decision tree {}", path.display())),
        None => Ok(DecisionTree::builtin()),
    }
}
