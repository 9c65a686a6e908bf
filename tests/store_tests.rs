//! SQLite persistence across reopened pools.

use std::sync::Arc;

use trendsmith::adapter::outbound::predictor::HeuristicPredictor;
use trendsmith::adapter::outbound::sqlite::database::connection;
use trendsmith::adapter::outbound::sqlite::SqliteStore;
use trendsmith::application::{StartOutcome, WorkflowConfig, WorkflowService};
use trendsmith::domain::{StepName, TopicId, TrendingTopic};
use trendsmith::port::outbound::store::Store;
use trendsmith::testkit::domain::proposal;

fn open(path: &std::path::Path) -> Arc<SqliteStore> {
    let url = path.to_string_lossy().into_owned();
    Arc::new(SqliteStore::new(connection::open(&url).unwrap()))
}

fn workflow(store: Arc<SqliteStore>) -> WorkflowService<SqliteStore> {
    WorkflowService::new(
        None,
        Arc::new(HeuristicPredictor::new()),
        store,
        WorkflowConfig::default(),
    )
}

#[tokio::test]
async fn records_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.db");

    let saved = proposal("Will the comet be visible without a telescope?", 20);
    {
        let store = open(&path);
        store.save_proposal(&saved).await.unwrap();
        let topic = TrendingTopic::new(TopicId::new("news:comet"), "Comet brightens", "news");
        store.save_topic(&topic).await.unwrap();
    }

    let store = open(&path);
    let loaded = store.get_proposal(saved.id()).await.unwrap().unwrap();
    assert_eq!(loaded.question(), saved.question());
    assert_eq!(loaded.end_date().timestamp(), saved.end_date().timestamp());
    assert_eq!(store.list_topics(5).await.unwrap()[0].title, "Comet brightens");
}

#[tokio::test]
async fn workflow_resumes_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.db");

    let id = {
        let service = workflow(open(&path));
        let StartOutcome::Started(session) = service.start("Will the comet outshine Venus?").await
        else {
            panic!("expected a session");
        };
        service
            .respond(session.id(), "Will the comet outshine Venus in May?")
            .await
            .unwrap();
        session.id().clone()
    };

    let service = workflow(open(&path));
    let reply = service.respond(&id, "4 weeks").await.unwrap();
    assert_eq!(
        reply.session.current_step().unwrap().name,
        StepName::ResolutionCriteria
    );
    assert_eq!(
        reply.session.proposal().question(),
        "Will the comet outshine Venus in May?"
    );
}

#[tokio::test]
async fn missing_records_are_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir.path().join("empty.db"));

    assert!(store.get_topic(&TopicId::new("nope")).await.unwrap().is_none());
    assert!(store.list_proposals(3).await.unwrap().is_empty());
    assert!(!store
        .delete_session(&trendsmith::domain::SessionId::new())
        .await
        .unwrap());
}
