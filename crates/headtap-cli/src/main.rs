//! headtap CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use headtap_cli::cmd;
use headtap_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            formula,
            formula_file,
            with,
            without,
            head,
            stable,
            prefix,
            macos,
            json,
        } => {
            let request = cmd::resolve::ResolveArgs {
                formula: formula.as_deref(),
                formula_file: formula_file.as_deref(),
                with: &with,
                without: &without,
                head,
                stable,
                prefix: &prefix,
                macos,
            };
            cmd::resolve::resolve(&request, json)
        }
        Commands::Formulae { json } => cmd::formulae::formulae(json),
        Commands::Options { formula, json } => cmd::options::options(&formula, json),
        Commands::Icons { formula, json } => cmd::icons::icons(formula.as_deref(), json),
        Commands::Url { path } => {
            cmd::url::url(&path);
            Ok(())
        }
    }
}
