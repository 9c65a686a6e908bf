use std::process::ExitCode;

use clap::Parser;
use trendsmith::adapter::inbound::cli::command::Cli;
use trendsmith::adapter::inbound::cli::output::{self, OutputConfig};
use trendsmith::adapter::inbound::cli::dispatch;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet), &cli.color);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
