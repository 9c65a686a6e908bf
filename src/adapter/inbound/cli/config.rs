//! `trendsmith config check`.

use std::path::Path;

use super::output;
use crate::error::Result;
use crate::infrastructure::config::llm::LlmProvider;
use crate::infrastructure::config::settings::Config;

fn env_present(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| !v.trim().is_empty())
}

fn credential(label: &str, vars: &[&str], enabled: bool) {
    if !enabled {
        output::field(label, "disabled");
        return;
    }
    let missing: Vec<&str> = vars.iter().copied().filter(|v| !env_present(v)).collect();
    if missing.is_empty() {
        output::success(&format!("{label} credentials detected"));
    } else {
        output::warning(&format!("{label} disabled: set {}", missing.join(", ")));
    }
}

/// Report the effective configuration and which integrations will run.
pub fn execute_check(path: &Path, config: &Config) -> Result<()> {
    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("Server", config.server.bind_address());
    output::field("Database", &config.database);
    output::field("Dry run", config.dry_run);
    output::field(
        "Schedule",
        if config.schedule.enabled {
            format!(
                "generate every {}s, resolve every {}s",
                config.schedule.generation_interval_secs, config.schedule.resolution_interval_secs
            )
        } else {
            "disabled".to_string()
        },
    );

    output::section("Integrations");
    match config.llm.provider {
        LlmProvider::Anthropic => credential("Anthropic", &["ANTHROPIC_API_KEY"], true),
        LlmProvider::OpenAi => credential("OpenAI", &["OPENAI_API_KEY"], true),
        LlmProvider::None => output::field("LLM", "disabled (template fallbacks)"),
    }
    credential(
        "Reddit",
        &["REDDIT_CLIENT_ID", "REDDIT_CLIENT_SECRET"],
        config.sources.reddit.enabled,
    );
    credential("Stock quotes", &["ALPHAVANTAGE_API_KEY"], config.sources.quotes.enabled);
    credential("Search interest", &["SERPAPI_API_KEY"], config.sources.trends.enabled);
    credential("Web search", &["SERPAPI_API_KEY"], true);

    if config.dry_run {
        output::field("Contract", "dry run (in-memory)");
    } else if config.require_contract().is_ok() {
        output::success("Contract address and signer configured");
    } else {
        output::warning("Contract not configured: set CONTRACT_ADDRESS and CONTRACT_SIGNER_KEY");
        output::hint("set dry_run = true to run without a contract");
    }

    output::success("Configuration check complete");
    Ok(())
}
