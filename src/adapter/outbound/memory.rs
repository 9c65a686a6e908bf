//! In-memory store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::{MarketProposal, ProposalId, SessionId, TopicId, TrendingTopic, WorkflowSession};
use crate::error::Result;
use crate::port::outbound::store::Store;

/// [`Store`] backed by hash maps. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    topics: RwLock<HashMap<TopicId, TrendingTopic>>,
    proposals: RwLock<HashMap<ProposalId, MarketProposal>>,
    sessions: RwLock<HashMap<SessionId, WorkflowSession>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T: Clone>(
    items: &HashMap<impl std::hash::Hash + Eq, T>,
    created: impl Fn(&T) -> DateTime<Utc>,
    limit: usize,
) -> Vec<T> {
    let mut out: Vec<T> = items.values().cloned().collect();
    out.sort_by_key(|item| std::cmp::Reverse(created(item)));
    out.truncate(limit);
    out
}

impl Store for MemoryStore {
    async fn save_topic(&self, topic: &TrendingTopic) -> Result<()> {
        self.topics.write().insert(topic.id.clone(), topic.clone());
        Ok(())
    }

    async fn get_topic(&self, id: &TopicId) -> Result<Option<TrendingTopic>> {
        Ok(self.topics.read().get(id).cloned())
    }

    async fn list_topics(&self, limit: usize) -> Result<Vec<TrendingTopic>> {
        Ok(newest_first(&self.topics.read(), |t| t.created_at, limit))
    }

    async fn save_proposal(&self, proposal: &MarketProposal) -> Result<()> {
        self.proposals
            .write()
            .insert(proposal.id().clone(), proposal.clone());
        Ok(())
    }

    async fn get_proposal(&self, id: &ProposalId) -> Result<Option<MarketProposal>> {
        Ok(self.proposals.read().get(id).cloned())
    }

    async fn list_proposals(&self, limit: usize) -> Result<Vec<MarketProposal>> {
        Ok(newest_first(&self.proposals.read(), MarketProposal::created_at, limit))
    }

    async fn save_session(&self, session: &WorkflowSession) -> Result<()> {
        self.sessions
            .write()
            .insert(session.id().clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<WorkflowSession>> {
        Ok(self.sessions.read().get(id).cloned())
    }

    async fn delete_session(&self, id: &SessionId) -> Result<bool> {
        Ok(self.sessions.write().remove(id).is_some())
    }

    async fn prune_sessions(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.updated_at() >= cutoff);
        Ok(before - sessions.len())
    }
}
