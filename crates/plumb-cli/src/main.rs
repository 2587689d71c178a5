mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    catalog::CatalogSubcommand, config::ConfigSubcommand, tree::TreeSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "plumb",
    about = "Diagnose plumbing problems and match them to capable providers",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .plumb/)
    #[arg(long, global = true, env = "PLUMB_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .plumb/ with a default config and an empty provider catalog
    Init,

    /// Inspect or validate the decision tree
    Tree {
        #[command(subcommand)]
        subcommand: TreeSubcommand,
    },

    /// Walk the decision tree interactively, collect issues, then match
    Diagnose,

    /// Classify one set of answers without walking the tree
    Classify {
        /// Answer as node=label, e.g. location=Kitchen (repeatable)
        #[arg(long = "answer", short = 'a', value_name = "KEY=VALUE")]
        answers: Vec<String>,
    },

    /// Rank providers for a set of required capabilities
    Match {
        /// Required capability code (repeatable)
        #[arg(long = "service", short = 's', value_name = "CODE", required = true)]
        services: Vec<String>,
        /// routine, urgent, or emergency
        #[arg(long, default_value = "routine")]
        severity: String,
        /// Also print the verdict for every catalog provider
        #[arg(long)]
        debug: bool,
    },

    /// Inspect the provider catalog
    Catalog {
        #[command(subcommand)]
        subcommand: CatalogSubcommand,
    },

    /// Inspect the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Start the HTTP API
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Tree { subcommand } => cmd::tree::run(&root, subcommand, cli.json),
        Commands::Diagnose => cmd::diagnose::run(&root, cli.json),
        Commands::Classify { answers } => cmd::classify::run(&answers, cli.json),
        Commands::Match {
            services,
            severity,
            debug,
        } => cmd::matching::run(&root, &services, &severity, debug, cli.json),
        Commands::Catalog { subcommand } => cmd::catalog::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
