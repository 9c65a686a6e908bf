//! In-memory contract for dry runs.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use crate::domain::{Market, MarketId, MarketProposal, Outcome};
use crate::error::Result;
use crate::port::outbound::contract::MarketContract;

/// Contract that keeps markets in memory and logs every write.
#[derive(Debug, Default)]
pub struct DryRunContract {
    markets: Mutex<Vec<Market>>,
}

impl DryRunContract {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing markets.
    #[must_use]
    pub fn with_markets(markets: Vec<Market>) -> Self {
        Self {
            markets: Mutex::new(markets),
        }
    }

    /// Snapshot of every market, resolved or not.
    #[must_use]
    pub fn markets(&self) -> Vec<Market> {
        self.markets.lock().clone()
    }
}

#[async_trait]
impl MarketContract for DryRunContract {
    fn name(&self) -> &'static str {
        "dry_run"
    }

    async fn create_market(&self, proposal: &MarketProposal) -> Result<bool> {
        let mut markets = self.markets.lock();
        let next = markets.iter().map(|m| m.id.value()).max().unwrap_or(0) + 1;
        markets.push(Market {
            id: MarketId::new(next),
            description: proposal.question().to_string(),
            end_time: proposal.end_date(),
            resolved: false,
            outcome: Outcome::Unresolved,
        });
        info!(market = next, question = %proposal.question(), "[dry-run] create_market");
        Ok(true)
    }

    async fn get_open_markets(&self) -> Result<Vec<Market>> {
        Ok(self
            .markets
            .lock()
            .iter()
            .filter(|m| !m.resolved)
            .cloned()
            .collect())
    }

    async fn resolve_market(&self, id: MarketId, outcome: bool) -> Result<bool> {
        let mut markets = self.markets.lock();
        let Some(market) = markets.iter_mut().find(|m| m.id == id && !m.resolved) else {
            return Ok(false);
        };
        market.resolved = true;
        market.outcome = Outcome::from(outcome);
        info!(market = %id, outcome, "[dry-run] resolve_market");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::{ProposalDraft, RealtimeContext};

    #[tokio::test]
    async fn create_then_resolve() {
        let contract = DryRunContract::new();
        let proposal = MarketProposal::new(
            ProposalDraft::new("Will it rain?", Utc::now() + Duration::days(2)),
            RealtimeContext::empty(),
        );

        assert!(contract.create_market(&proposal).await.unwrap());
        let open = contract.get_open_markets().await.unwrap();
        assert_eq!(open.len(), 1);

        assert!(contract.resolve_market(open[0].id, true).await.unwrap());
        assert!(contract.get_open_markets().await.unwrap().is_empty());
        assert!(!contract.resolve_market(open[0].id, false).await.unwrap());
        assert_eq!(contract.markets()[0].outcome, Outcome::Yes);
    }
}
