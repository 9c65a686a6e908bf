//! CLI module graph.

pub mod command;
pub mod config;
pub mod cycle;
pub mod generate;
pub mod output;
pub mod serve;

use command::{Cli, Commands, ConfigCommand};

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Load configuration and run the selected subcommand.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;

    if !matches!(cli.command, Commands::Config(_)) {
        config.init_logging();
    }

    match &cli.command {
        Commands::Serve(args) => serve::execute(&config, args).await,
        Commands::Generate(args) => generate::execute_generate(&config, args).await,
        Commands::Trends(args) => generate::execute_trends(&config, args).await,
        Commands::Cycle(cycle) => cycle::execute(&config, cycle).await,
        Commands::Config(ConfigCommand::Check) => config::execute_check(&cli.config, &config),
    }
}
