//! Persistence port for topics, proposals and workflow sessions.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{MarketProposal, ProposalId, SessionId, TopicId, TrendingTopic, WorkflowSession};
use crate::error::Result;

/// Storage operations for pipeline records.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - Saves are upserts keyed by id; concurrent saves of one id are last-write-wins
/// - `prune_sessions` should be called periodically to drop stale snapshots
pub trait Store: Send + Sync {
    /// Save a topic, replacing any previous row with the same id.
    fn save_topic(&self, topic: &TrendingTopic) -> impl Future<Output = Result<()>> + Send;

    /// Get a topic by id.
    fn get_topic(&self, id: &TopicId) -> impl Future<Output = Result<Option<TrendingTopic>>> + Send;

    /// Most recent topics first.
    fn list_topics(&self, limit: usize) -> impl Future<Output = Result<Vec<TrendingTopic>>> + Send;

    /// Save a proposal, replacing any previous row with the same id.
    fn save_proposal(&self, proposal: &MarketProposal) -> impl Future<Output = Result<()>> + Send;

    /// Get a proposal by id.
    fn get_proposal(
        &self,
        id: &ProposalId,
    ) -> impl Future<Output = Result<Option<MarketProposal>>> + Send;

    /// Most recent proposals first.
    fn list_proposals(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<MarketProposal>>> + Send;

    /// Save a session snapshot.
    fn save_session(&self, session: &WorkflowSession) -> impl Future<Output = Result<()>> + Send;

    /// Get a session snapshot by id.
    fn get_session(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<Option<WorkflowSession>>> + Send;

    /// Delete a session snapshot. Returns true if it existed.
    fn delete_session(&self, id: &SessionId) -> impl Future<Output = Result<bool>> + Send;

    /// Delete snapshots last updated before `cutoff`. Returns count deleted.
    fn prune_sessions(&self, cutoff: DateTime<Utc>) -> impl Future<Output = Result<usize>> + Send;
}
