//! Interactive help in the terminal
//!
//! Usage:
//!   help-console                              # Built-in demo tree
//!   help-console --tree trees/help.yaml       # Custom tree
//!   help-console --config help-config.yaml    # Custom trigger symbols
//!   RUST_LOG=interactive_help=debug help-console --report

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use interactive_help::authoring::compile_help_yaml;
use interactive_help::{HelpConfig, Navigator, UserId};

use crate::console::ConsoleGateway;

/// Tree used when no `--tree` is given.
const DEMO_TREE: &str = include_str!("../trees/help.yaml");

#[derive(Parser)]
#[command(name = "help-console")]
#[command(about = "Browse an interactive help tree in the terminal")]
struct Args {
    /// Help tree in YAML
    #[arg(short, long, env = "HELP_TREE")]
    tree: Option<PathBuf>,

    /// Trigger and layout configuration in YAML
    #[arg(short, long, env = "HELP_CONFIG")]
    config: Option<PathBuf>,

    /// Name of the user browsing the help
    #[arg(short, long, default_value = "console")]
    user: String,

    /// Print the session report as JSON on exit
    #[arg(long)]
    report: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they do not mix with pages
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interactive_help=info,help_console=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            HelpConfig::from_file(path)?
        }
        None => HelpConfig::default(),
    };

    let yaml = match &args.tree {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read help tree {}", path.display()))?,
        None => DEMO_TREE.to_string(),
    };
    let help = compile_help_yaml(&yaml, config)?;
    let entry = help.entry;
    tracing::info!(tree = %help.id, pages = help.graph.len(), "Help tree loaded");

    let user = UserId::new(args.user);
    let console = Arc::new(ConsoleGateway::new(
        user.clone(),
        tokio::io::stdout(),
        &help.graph,
    ));
    let reader = console.spawn_reader(BufReader::new(tokio::io::stdin()));

    println!("Type a symbol (or its digit) to follow a link, q to leave.");
    let navigator = Navigator::new(console, Arc::new(help.graph));
    let report = navigator.start_session(&user, entry).await?;
    reader.abort();

    tracing::info!(
        session_id = %report.session_id,
        pages = report.displayed_pages().len(),
        "Session finished"
    );
    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
