//! `trendsmith generate` and `trendsmith trends`.

use serde_json::json;
use tracing::warn;

use super::command::{GenerateArgs, TrendsArgs};
use super::output;
use crate::domain::FetchParams;
use crate::error::{ConfigError, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::store::Store;

/// Generate proposals for a query and store them.
pub async fn execute_generate(config: &Config, args: &GenerateArgs) -> Result<()> {
    let query = args.query.trim();
    if query.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "query",
            reason: "must not be empty".into(),
        }
        .into());
    }
    let ctx = bootstrap::build(config, false)?;
    let proposals = ctx.generator.generate_for_query(query, args.count).await;
    for proposal in &proposals {
        if let Err(err) = ctx.store.save_proposal(proposal).await {
            warn!(proposal = %proposal.id(), error = %err, "Failed to store generated proposal");
        }
    }

    if output::is_json() {
        output::json_output(json!({ "query": query, "proposals": proposals }));
        return Ok(());
    }

    output::section(&format!("Proposals for \"{query}\""));
    for (index, proposal) in proposals.iter().enumerate() {
        let detail = format!(
            "{} · closes {} · p={:.2} · confidence {:.2}",
            proposal.category(),
            proposal.end_date().format("%Y-%m-%d"),
            proposal.ai_probability(),
            proposal.ai_confidence(),
        );
        output::item(index + 1, proposal.question(), Some(&detail));
    }
    if proposals.is_empty() {
        output::warning("No proposals generated");
    }
    Ok(())
}

/// Aggregate topics from every configured source and store them.
pub async fn execute_trends(config: &Config, args: &TrendsArgs) -> Result<()> {
    let ctx = bootstrap::build(config, false)?;
    let mut topics = ctx.aggregator.aggregate(&FetchParams::defaults()).await;
    for topic in &topics {
        if let Err(err) = ctx.store.save_topic(topic).await {
            warn!(topic = %topic.id, error = %err, "Failed to store topic");
        }
    }
    topics.truncate(args.limit);

    if output::is_json() {
        output::json_output(json!({ "topics": topics }));
        return Ok(());
    }

    output::section("Trending topics");
    for (index, topic) in topics.iter().enumerate() {
        let detail = format!(
            "{} · {} · potential {:.2}",
            topic.category, topic.source, topic.analysis.market_potential
        );
        output::item(index + 1, &topic.title, Some(&detail));
    }
    if topics.is_empty() {
        output::warning("No topics passed the filters");
        output::hint("check source credentials with `trendsmith config check`");
    }
    Ok(())
}
