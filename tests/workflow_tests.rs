//! Guided proposal creation across the service boundary.

use std::sync::Arc;

use chrono::{Duration, Utc};
use trendsmith::adapter::outbound::memory::MemoryStore;
use trendsmith::adapter::outbound::predictor::HeuristicPredictor;
use trendsmith::application::{StartOutcome, WorkflowConfig, WorkflowService};
use trendsmith::domain::{
    DomainError, Intent, ProposalStatus, SessionStatus, StepName, Submission, WorkflowSession,
};
use trendsmith::error::Error;
use trendsmith::port::outbound::llm::Llm;
use trendsmith::port::outbound::store::Store;
use trendsmith::testkit::stub::StubLlm;

fn service(store: Arc<MemoryStore>) -> WorkflowService<MemoryStore> {
    WorkflowService::new(
        None,
        Arc::new(HeuristicPredictor::new()),
        store,
        WorkflowConfig::default(),
    )
}

async fn started(service: &WorkflowService<MemoryStore>, message: &str) -> WorkflowSession {
    match service.start(message).await {
        StartOutcome::Started(session) => session,
        StartOutcome::Declined { intent, .. } => panic!("declined as {intent}"),
    }
}

#[tokio::test]
async fn invalid_timeframe_keeps_step_current() {
    let service = service(Arc::new(MemoryStore::new()));
    let session = started(&service, "Will the Fed cut rates in March?").await;
    assert_eq!(session.steps().len(), 1);
    assert_eq!(session.steps()[0].name, StepName::QuestionClarification);
    assert_eq!(session.steps()[0].number, 1);

    let reply = service
        .respond(session.id(), "Will the Fed cut rates by March 2026?")
        .await
        .unwrap();
    assert!(matches!(
        reply.submission,
        Submission::Advanced { next: StepName::Timeframe, .. }
    ));

    let reply = service.respond(session.id(), "banana").await.unwrap();
    match reply.submission {
        Submission::Rejected { step, validation } => {
            assert_eq!(step, StepName::Timeframe);
            assert!(!validation.valid);
            assert!(!validation.message.is_empty());
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(reply.session.steps().len(), 2);
    assert_eq!(reply.session.status(), SessionStatus::InProgress);
    assert_eq!(
        reply.session.proposal().question(),
        "Will the Fed cut rates by March 2026?"
    );
}

#[tokio::test]
async fn confirmed_review_finalizes_and_saves_proposal() {
    let store = Arc::new(MemoryStore::new());
    let service = service(Arc::clone(&store));
    let session = started(&service, "Will Bitcoin close above $150k this year?").await;
    let id = session.id().clone();

    service
        .respond(&id, "Will Bitcoin close above $150k by year end?")
        .await
        .unwrap();
    let reply = service.respond(&id, "3 months").await.unwrap();
    let end = reply.session.proposal().end_date();
    assert!(end > Utc::now() + Duration::days(89));
    assert!(end < Utc::now() + Duration::days(91));

    service
        .respond(&id, "Resolves YES if the CoinGecko daily close exceeds $150,000.")
        .await
        .unwrap();
    let reply = service.respond(&id, "confirm").await.unwrap();

    assert_eq!(reply.submission, Submission::Confirmed);
    let session = reply.session;
    assert_eq!(session.status(), SessionStatus::Finalized);
    assert_eq!(session.steps().len(), 4);
    assert!(session.recommendation().is_some());

    let proposal = session.proposal();
    assert_eq!(proposal.status(), ProposalStatus::Ready);
    assert!((0.05..=0.95).contains(&proposal.ai_probability()));
    assert!((0.3..=0.9).contains(&proposal.ai_confidence()));

    let saved = store.get_proposal(proposal.id()).await.unwrap().unwrap();
    assert_eq!(saved.status(), ProposalStatus::Ready);
    assert_eq!(saved.question(), "Will Bitcoin close above $150k by year end?");
}

#[tokio::test]
async fn declined_review_holds_the_draft() {
    let store = Arc::new(MemoryStore::new());
    let service = service(Arc::clone(&store));
    let session = started(&service, "Will the launch slip to next year?").await;
    let id = session.id().clone();

    service.respond(&id, "Will the launch slip past June?").await.unwrap();
    service.respond(&id, "6 weeks").await.unwrap();
    service
        .respond(&id, "Resolves YES if the agency announces a new launch date.")
        .await
        .unwrap();
    let reply = service.respond(&id, "not yet, let me think").await.unwrap();

    assert_eq!(reply.submission, Submission::Held);
    assert_eq!(reply.session.status(), SessionStatus::Held);
    assert_eq!(reply.session.proposal().status(), ProposalStatus::Draft);
    assert!(store.list_proposals(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn finished_sessions_refuse_input() {
    let service = service(Arc::new(MemoryStore::new()));
    let session = started(&service, "Will the merger close this quarter?").await;
    let id = session.id().clone();

    service.respond(&id, "Will the merger close by Q3?").await.unwrap();
    service.respond(&id, "2 months").await.unwrap();
    service
        .respond(&id, "Resolves YES on a regulator filing confirming completion.")
        .await
        .unwrap();
    service.respond(&id, "yes").await.unwrap();

    let err = service.respond(&id, "one more thing").await.unwrap_err();
    assert!(matches!(err, Error::Domain(DomainError::WorkflowFinished)));
}

#[tokio::test]
async fn greetings_are_declined_with_examples() {
    let service = service(Arc::new(MemoryStore::new()));
    match service.start("hello there").await {
        StartOutcome::Declined { intent, examples } => {
            assert_eq!(intent, Intent::Unclear);
            assert_eq!(examples.len(), 4);
        }
        StartOutcome::Started(_) => panic!("greeting should not open a session"),
    }
    assert!(service.is_empty());
}

#[tokio::test]
async fn classifier_reply_decides_intent() {
    let llm: Arc<dyn Llm> = Arc::new(StubLlm::always("general_inquiry"));
    let service = WorkflowService::new(
        Some(llm),
        Arc::new(HeuristicPredictor::new()),
        Arc::new(MemoryStore::new()),
        WorkflowConfig::default(),
    );

    match service.start("Will it rain tomorrow?").await {
        StartOutcome::Declined { intent, .. } => assert_eq!(intent, Intent::GeneralInquiry),
        StartOutcome::Started(_) => panic!("classifier said general inquiry"),
    }
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let service = service(Arc::new(MemoryStore::new()));
    let err = service
        .respond(&trendsmith::domain::SessionId::new(), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn sessions_survive_a_restart() {
    let store = Arc::new(MemoryStore::new());
    let first = service(Arc::clone(&store));
    let session = started(&first, "Will the strike end this month?").await;
    let id = session.id().clone();
    first.respond(&id, "Will the strike end by Friday?").await.unwrap();
    drop(first);

    let second = service(Arc::clone(&store));
    assert!(second.is_empty());
    let restored = second.snapshot(&id).await.unwrap();
    assert_eq!(restored.current_step().unwrap().name, StepName::Timeframe);

    let reply = second.respond(&id, "2 weeks").await.unwrap();
    assert!(matches!(
        reply.submission,
        Submission::Advanced { next: StepName::ResolutionCriteria, .. }
    ));
    assert_eq!(second.len(), 1);
}

#[tokio::test]
async fn idle_sessions_are_evicted_from_memory_and_store() {
    let store = Arc::new(MemoryStore::new());
    let service = service(Arc::clone(&store));
    let session = started(&service, "Will the bill pass the senate?").await;

    assert_eq!(service.evict_idle(Utc::now()).await, 0);
    assert_eq!(service.evict_idle(Utc::now() + Duration::hours(2)).await, 1);
    assert!(service.is_empty());
    assert!(store.get_session(session.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn close_forgets_the_session() {
    let store = Arc::new(MemoryStore::new());
    let service = service(Arc::clone(&store));
    let session = started(&service, "Will the index hit a record?").await;

    assert!(service.close(session.id()).await);
    assert!(!service.close(session.id()).await);
    assert!(matches!(
        service.snapshot(session.id()).await,
        Err(Error::NotFound(_))
    ));
}
