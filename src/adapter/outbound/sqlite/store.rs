//! SQLite store implementation.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::SqliteConnection;
use serde::de::DeserializeOwned;

use super::database::connection::DbPool;
use super::database::model::{ProposalRow, SessionRow, TopicRow};
use super::database::schema::{market_proposals, trending_topics, workflow_sessions};
use crate::domain::{MarketProposal, ProposalId, SessionId, TopicId, TrendingTopic, WorkflowSession};
use crate::error::{Error, Result};
use crate::port::outbound::store::Store;

/// SQLite-backed [`Store`].
pub struct SqliteStore {
    pool: DbPool,
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode<T: DeserializeOwned>(payload: &str) -> Result<T> {
    serde_json::from_str(payload).map_err(|e| Error::Parse(e.to_string()))
}

fn limit_of(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl SqliteStore {
    /// Create a new store over an already migrated pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }

    fn topic_row(topic: &TrendingTopic) -> Result<TopicRow> {
        Ok(TopicRow {
            id: topic.id.as_str().to_string(),
            title: topic.title.clone(),
            category: topic.category.as_str().to_string(),
            source: topic.source.clone(),
            engagement: topic.engagement,
            created_at: timestamp(topic.created_at),
            payload: serde_json::to_string(topic)?,
        })
    }

    fn proposal_row(proposal: &MarketProposal) -> Result<ProposalRow> {
        Ok(ProposalRow {
            id: proposal.id().as_str().to_string(),
            question: proposal.question().to_string(),
            category: proposal.category().as_str().to_string(),
            status: proposal.status().as_str().to_string(),
            end_date: timestamp(proposal.end_date()),
            topic_id: proposal.topic_id().map(|id| id.as_str().to_string()),
            created_at: timestamp(proposal.created_at()),
            payload: serde_json::to_string(proposal)?,
        })
    }

    fn session_row(session: &WorkflowSession) -> Result<SessionRow> {
        Ok(SessionRow {
            id: session.id().as_str().to_string(),
            status: session.status().as_str().to_string(),
            updated_at: timestamp(session.updated_at()),
            payload: serde_json::to_string(session)?,
        })
    }
}

impl Store for SqliteStore {
    async fn save_topic(&self, topic: &TrendingTopic) -> Result<()> {
        let row = Self::topic_row(topic)?;
        let mut conn = self.conn()?;
        diesel::replace_into(trending_topics::table)
            .values(&row)
            .execute(&mut conn)?;
        Ok(())
    }

    async fn get_topic(&self, id: &TopicId) -> Result<Option<TrendingTopic>> {
        let mut conn = self.conn()?;
        let row: Option<TopicRow> = trending_topics::table
            .find(id.as_str())
            .first(&mut conn)
            .optional()?;
        row.map(|r| decode(&r.payload)).transpose()
    }

    async fn list_topics(&self, limit: usize) -> Result<Vec<TrendingTopic>> {
        let mut conn = self.conn()?;
        let rows: Vec<TopicRow> = trending_topics::table
            .order(trending_topics::created_at.desc())
            .limit(limit_of(limit))
            .load(&mut conn)?;
        rows.iter().map(|r| decode(&r.payload)).collect()
    }

    async fn save_proposal(&self, proposal: &MarketProposal) -> Result<()> {
        let row = Self::proposal_row(proposal)?;
        let mut conn = self.conn()?;
        diesel::replace_into(market_proposals::table)
            .values(&row)
            .execute(&mut conn)?;
        Ok(())
    }

    async fn get_proposal(&self, id: &ProposalId) -> Result<Option<MarketProposal>> {
        let mut conn = self.conn()?;
        let row: Option<ProposalRow> = market_proposals::table
            .find(id.as_str())
            .first(&mut conn)
            .optional()?;
        row.map(|r| decode(&r.payload)).transpose()
    }

    async fn list_proposals(&self, limit: usize) -> Result<Vec<MarketProposal>> {
        let mut conn = self.conn()?;
        let rows: Vec<ProposalRow> = market_proposals::table
            .order(market_proposals::created_at.desc())
            .limit(limit_of(limit))
            .load(&mut conn)?;
        rows.iter().map(|r| decode(&r.payload)).collect()
    }

    async fn save_session(&self, session: &WorkflowSession) -> Result<()> {
        let row = Self::session_row(session)?;
        let mut conn = self.conn()?;
        diesel::replace_into(workflow_sessions::table)
            .values(&row)
            .execute(&mut conn)?;
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<WorkflowSession>> {
        let mut conn = self.conn()?;
        let row: Option<SessionRow> = workflow_sessions::table
            .find(id.as_str())
            .first(&mut conn)
            .optional()?;
        row.map(|r| decode(&r.payload)).transpose()
    }

    async fn delete_session(&self, id: &SessionId) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(workflow_sessions::table.find(id.as_str())).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    async fn prune_sessions(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut conn = self.conn()?;
        let cutoff = timestamp(cutoff);
        let deleted = diesel::delete(
            workflow_sessions::table.filter(workflow_sessions::updated_at.lt(&cutoff)),
        )
        .execute(&mut conn)?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::open;
    use crate::domain::{ProposalDraft, ProposalStatus, RealtimeContext, StepRules};

    fn setup() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("store.db").to_string_lossy().into_owned();
        let store = SqliteStore::new(open(&url).unwrap());
        (dir, store)
    }

    fn proposal(question: &str) -> MarketProposal {
        MarketProposal::new(
            ProposalDraft::new(question, Utc::now() + Duration::days(40)),
            RealtimeContext::empty(),
        )
    }

    #[tokio::test]
    async fn topic_upsert_replaces_by_id() {
        let (_dir, store) = setup();
        let id = TopicId::for_source("reddit", "abc");
        let topic = TrendingTopic::new(id.clone(), "Bitcoin hits new high", "reddit/r/cryptocurrency");
        store.save_topic(&topic).await.unwrap();

        let updated = topic.clone().with_engagement(500.0);
        store.save_topic(&updated).await.unwrap();

        let listed = store.list_topics(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(store.get_topic(&id).await.unwrap().unwrap().engagement, 500.0);
    }

    #[tokio::test]
    async fn proposals_round_trip_with_status() {
        let (_dir, store) = setup();
        let mut p = proposal("Will the Fed cut rates in March?");
        store.save_proposal(&p).await.unwrap();

        p.mark_created().unwrap();
        store.save_proposal(&p).await.unwrap();

        let loaded = store.get_proposal(p.id()).await.unwrap().unwrap();
        assert_eq!(loaded.status(), ProposalStatus::Created);
        assert_eq!(loaded.question(), p.question());
        assert!(store.get_proposal(&ProposalId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_proposals_respects_limit() {
        let (_dir, store) = setup();
        for i in 0..3 {
            store.save_proposal(&proposal(&format!("Question {i}?"))).await.unwrap();
        }
        assert_eq!(store.list_proposals(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn sessions_delete_and_prune() {
        let (_dir, store) = setup();
        let now = Utc::now();
        let session = WorkflowSession::start("Will Bitcoin reach 100k?", now, &StepRules::default());
        store.save_session(&session).await.unwrap();
        assert!(store.get_session(session.id()).await.unwrap().is_some());

        assert_eq!(store.prune_sessions(now - Duration::hours(1)).await.unwrap(), 0);
        assert_eq!(store.prune_sessions(now + Duration::hours(1)).await.unwrap(), 1);
        assert!(!store.delete_session(session.id()).await.unwrap());
    }
}
