use anyhow::Context;
use clap::{Parser, Subcommand};

use temporal_provider::{config, duration, logging, spec};

/// Inspect schedule specs and durations the way the provider compiles them
#[derive(Debug, Parser)]
#[command(name = "temporal-provider", version, about)]
struct Cli {
    /// Enable debug logging (also enabled by TF_DEBUG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a spec string and print the result as JSON
    Spec {
        /// e.g. "CRON_TZ=UTC 0 9 * * 1-5" or "@every 1h/15m"
        text: String,
    },
    /// Print the canonical rendering of a spec string
    Canonical { text: String },
    /// Print the canonical form of a duration string
    Duration { text: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let debug = cli.debug || config::debug_requested(|key| std::env::var(key).ok());
    logging::init(debug);

    match cli.command {
        Commands::Spec { text } => {
            let parsed = spec::parse_spec(&text)?;
            tracing::debug!(input = %text, "Parsed spec");
            let json = serde_json::to_string_pretty(&parsed).context("encoding parsed spec")?;
            println!("{}", json);
        }
        Commands::Canonical { text } => {
            let parsed = spec::parse_spec(&text)?;
            println!("{}", parsed);
        }
        Commands::Duration { text } => {
            let parsed = duration::parse_duration(&text)?;
            println!("{}", duration::format_duration(parsed));
        }
    }

    Ok(())
}
