use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use plumb_core::tree::DecisionTree;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum TreeSubcommand {
    /// Print every node with its options
    Show {
        /// Only this node
        node: Option<String>,
    },
    /// Check a tree for dangling references, unreachable nodes and cycles
    Validate {
        /// YAML tree to check (default: the configured or built-in tree)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

pub fn run(root: &Path, subcmd: TreeSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TreeSubcommand::Show { node } => show(root, node.as_deref(), json),
        TreeSubcommand::Validate { file } => validate(root, file.as_deref(), json),
    }
}

fn show(root: &Path, node: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let tree = super::load_tree(root, &config)?;

    let nodes = match node {
        Some(id) => vec![tree.node(id)?],
        None => tree.nodes.values().collect(),
    };

    if json {
        return print_json(&nodes);
    }

    let mut rows = Vec::new();
    for n in nodes {
        for o in &n.options {
            let marker = if n.id == tree.root { "*" } else { "" };
            rows.push(vec![
                format!("{}{marker}", n.id),
                o.label.clone(),
                o.next_step.clone().unwrap_or_default(),
                o.result.clone().unwrap_or_default(),
            ]);
        }
    }
    print_table(&["NODE", "OPTION", "NEXT", "RESULT"], rows);
    Ok(())
}

fn validate(root: &Path, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let tree = match file {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            DecisionTree::parse(&data)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => {
            let config = super::load_config(root)?;
            super::load_tree(root, &config)?
        }
    };

    let problems = tree.validate();
    if json {
        print_json(&serde_json::json!({ "valid": problems.is_empty(), "problems": problems }))?;
    } else if problems.is_empty() {
        println!("Tree is valid ({} nodes).", tree.nodes.len());
    } else {
        for p in &problems {
            println!("[error] {p}");
        }
    }

    if !problems.is_empty() {
        anyhow::bail!("decision tree has {} problem(s)", problems.len());
    }
    Ok(())
}
