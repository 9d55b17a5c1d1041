//! # querysync CLI
//!
//! Command-line interface for inspecting and rewriting URL queries through a
//! configured query and pagination engine.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "querysync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "querysync.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the typed query and pagination of a URL
    Show {
        /// URL or path with a search string
        url: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Apply query operations to a URL and print the result
    ///
    /// Operations: `set key=value`, `reset`, `page N`, `size N`,
    /// `reset-pagination`, `reset-all`
    Apply {
        /// URL or path with a search string
        url: String,

        /// Keep the current page when the query changes
        #[arg(long)]
        keep_page: bool,

        /// Operations, applied in order
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        ops: Vec<String>,
    },

    /// Print a configuration value (e.g. `pagination.size`)
    Config {
        /// Dotted configuration key
        key: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Show { url, json } => commands::show_url(&cli.config, &url, json),
        Commands::Apply {
            url,
            keep_page,
            ops,
        } => commands::apply_ops(&cli.config, &url, &ops, keep_page),
        Commands::Config { key } => commands::show_config_value(&cli.config, &key),
    }
}
