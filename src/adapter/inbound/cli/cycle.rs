//! `trendsmith cycle`: one manual pipeline pass.

use serde_json::json;

use super::command::CycleCommand;
use super::output;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

pub async fn execute(config: &Config, command: &CycleCommand) -> Result<()> {
    config.require_contract()?;
    let ctx = bootstrap::build(config, true)?;

    match command {
        CycleCommand::Generate => {
            let report = ctx.pipeline.generate().await;
            if output::is_json() {
                output::json_output(json!({ "generation": report }));
                return Ok(());
            }
            output::section("Generation pass");
            output::field("Topics", report.topics);
            output::field("Proposals", report.proposals);
            output::field("Created", report.created);
            output::field("Failed", report.failed);
        }
        CycleCommand::Resolve => {
            let report = ctx.pipeline.resolve().await?;
            if output::is_json() {
                output::json_output(json!({ "resolution": report }));
                return Ok(());
            }
            output::section("Resolution pass");
            output::field("Due", report.checked);
            output::field("Resolved", report.resolved);
            output::field("Unclear", report.unclear);
            output::field("Failed", report.failed);
        }
    }
    output::success("Pass complete");
    Ok(())
}
