//! Prediction-market contract port.

use async_trait::async_trait;

use crate::domain::{Market, MarketId, MarketProposal};
use crate::error::Result;

/// Read/write access to the on-chain market contract.
///
/// All three operations are fallible and safe to retry on the next cycle.
/// `Ok(false)` means the write was not accepted; idempotency is the
/// implementation's concern.
#[async_trait]
pub trait MarketContract: Send + Sync {
    fn name(&self) -> &'static str;

    /// Submit a market for `proposal`.
    async fn create_market(&self, proposal: &MarketProposal) -> Result<bool>;

    /// Markets that have not been resolved.
    async fn get_open_markets(&self) -> Result<Vec<Market>>;

    /// Record the outcome of market `id`.
    async fn resolve_market(&self, id: MarketId, outcome: bool) -> Result<bool>;
}
