//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{market_proposals, trending_topics, workflow_sessions};

/// Database row for a trending topic.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = trending_topics)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TopicRow {
    pub id: String,
    pub title: String,
    pub category: String,
    pub source: String,
    pub engagement: f64,
    pub created_at: String,
    pub payload: String,
}

/// Database row for a market proposal.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = market_proposals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProposalRow {
    pub id: String,
    pub question: String,
    pub category: String,
    pub status: String,
    pub end_date: String,
    pub topic_id: Option<String>,
    pub created_at: String,
    pub payload: String,
}

/// Database row for a workflow session snapshot.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = workflow_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SessionRow {
    pub id: String,
    pub status: String,
    pub updated_at: String,
    pub payload: String,
}
