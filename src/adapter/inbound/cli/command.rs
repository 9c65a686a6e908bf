//! Command-line interface definitions.
//!
//! Defines the CLI structure for trendsmith using `clap`: the HTTP
//! service, one-shot generation, trend listing, manual pipeline passes
//! and configuration checks.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Trend-driven prediction market proposals
#[derive(Parser, Debug)]
#[command(name = "trendsmith")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service and the scheduled pipeline
    Serve(ServeArgs),

    /// Generate proposals for a free-text query
    Generate(GenerateArgs),

    /// Aggregate and print the current trending topics
    Trends(TrendsArgs),

    /// Run one pipeline pass now
    #[command(subcommand)]
    Cycle(CycleCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `trendsmith serve`.
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Serve HTTP only, without the periodic pipeline.
    #[arg(long)]
    pub no_scheduler: bool,
}

/// Arguments for `trendsmith generate`.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// What the markets should be about.
    pub query: String,

    /// Number of proposals (defaults to the configured count).
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

/// Arguments for `trendsmith trends`.
#[derive(Parser, Debug)]
pub struct TrendsArgs {
    /// Maximum topics to print.
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

/// Subcommands for `trendsmith cycle`.
#[derive(Subcommand, Debug)]
pub enum CycleCommand {
    /// Aggregate trends, propose and create markets.
    Generate,
    /// Settle markets whose end time has passed.
    Resolve,
}

/// Subcommands for `trendsmith config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate the configuration file and report missing credentials.
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_with_defaults() {
        let cli = Cli::try_parse_from(["trendsmith", "serve"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert!(matches!(cli.color, ColorChoice::Auto));
        match cli.command {
            Commands::Serve(args) => assert!(!args.no_scheduler),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_generate_with_count() {
        let cli =
            Cli::try_parse_from(["trendsmith", "-c", "alt.toml", "generate", "bitcoin", "-n", "3"])
                .unwrap();
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.query, "bitcoin");
                assert_eq!(args.count, Some(3));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from(["trendsmith", "cycle", "resolve", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Cycle(CycleCommand::Resolve)));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["trendsmith", "trade"]).is_err());
    }

    #[test]
    fn generate_requires_query() {
        assert!(Cli::try_parse_from(["trendsmith", "generate"]).is_err());
    }
}
