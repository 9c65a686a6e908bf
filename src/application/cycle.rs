//! End-to-end pipeline passes: trend collection through market creation,
//! and resolution of expired markets.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::aggregator::TrendAggregator;
use super::generator::ProposalGenerator;
use super::resolver::{MarketResolver, ResolutionReport};
use crate::domain::FetchParams;
use crate::error::Result;
use crate::port::outbound::contract::MarketContract;
use crate::port::outbound::store::Store;

/// Counts from one generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub topics: usize,
    pub proposals: usize,
    /// Markets accepted by the contract.
    pub created: usize,
    /// Store or contract failures.
    pub failed: usize,
}

/// Runs generation and resolution passes against shared services.
pub struct Pipeline<S: Store> {
    aggregator: Arc<TrendAggregator>,
    generator: Arc<ProposalGenerator>,
    resolver: Arc<MarketResolver>,
    contract: Arc<dyn MarketContract>,
    store: Arc<S>,
    creation_pacing: Duration,
}

impl<S: Store> Pipeline<S> {
    pub fn new(
        aggregator: Arc<TrendAggregator>,
        generator: Arc<ProposalGenerator>,
        resolver: Arc<MarketResolver>,
        contract: Arc<dyn MarketContract>,
        store: Arc<S>,
        creation_pacing: Duration,
    ) -> Self {
        Self {
            aggregator,
            generator,
            resolver,
            contract,
            store,
            creation_pacing,
        }
    }

    /// Aggregate topics, draft one proposal per topic and submit each as a
    /// market.
    pub async fn generate(&self) -> GenerationReport {
        let mut report = GenerationReport::default();
        let topics = self.aggregator.aggregate(&FetchParams::defaults()).await;
        report.topics = topics.len();
        info!(topics = topics.len(), "Generation pass started");

        let pacing = self.creation_pacing;
        for (index, topic) in topics.iter().enumerate() {
            if let Err(err) = self.store.save_topic(topic).await {
                warn!(topic = %topic.id, error = %err, "Failed to store topic");
                report.failed += 1;
            }

            let mut proposal = self.generator.propose_from_topic(topic).await;
            report.proposals += 1;
            if let Err(err) = self.store.save_proposal(&proposal).await {
                warn!(proposal = %proposal.id(), error = %err, "Failed to store proposal");
                report.failed += 1;
            }

            if index > 0 && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }

            match self.contract.create_market(&proposal).await {
                Ok(true) => {
                    report.created += 1;
                    info!(proposal = %proposal.id(), question = proposal.question(), "Market created");
                    if let Err(err) = proposal.mark_created() {
                        warn!(proposal = %proposal.id(), error = %err, "Status change rejected");
                        continue;
                    }
                    if let Err(err) = self.store.save_proposal(&proposal).await {
                        warn!(proposal = %proposal.id(), error = %err, "Failed to store created proposal");
                        report.failed += 1;
                    }
                }
                Ok(false) => {
                    warn!(proposal = %proposal.id(), contract = self.contract.name(), "Market creation not accepted");
                    report.failed += 1;
                }
                Err(err) => {
                    warn!(proposal = %proposal.id(), contract = self.contract.name(), error = %err, "Market creation failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            topics = report.topics,
            proposals = report.proposals,
            created = report.created,
            failed = report.failed,
            "Generation pass complete"
        );
        report
    }

    /// Resolve every expired market.
    ///
    /// # Errors
    /// When the open market list cannot be read.
    pub async fn resolve(&self) -> Result<ResolutionReport> {
        self.resolver.run(Utc::now()).await
    }
}
