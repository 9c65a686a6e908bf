//! Guided market creation.
//!
//! Sessions live in a concurrent map of per-session async mutexes, so
//! requests on different sessions never contend. Idle sessions are evicted
//! after `session_ttl_secs`; snapshots are persisted best-effort.

pub mod intent;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use intent::{classify_keywords, EXAMPLE_PROMPTS};

use crate::domain::{
    Intent, Prediction, PredictionRequest, Sentiment, SessionId, SessionStatus, StepRules,
    Submission, WorkflowSession,
};
use crate::error::{Error, Result};
use crate::port::outbound::llm::Llm;
use crate::port::outbound::predictor::Predictor;
use crate::port::outbound::store::Store;

/// Workflow settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Idle time after which a session is evicted.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// How often the janitor looks for idle sessions.
    #[serde(default = "default_janitor_interval_secs")]
    pub janitor_interval_secs: u64,
    /// Minimum time between now and a market's end date, in minutes.
    #[serde(default = "default_min_horizon_minutes")]
    pub min_horizon_minutes: i64,
    /// Minimum length of resolution criteria.
    #[serde(default = "default_min_criteria_chars")]
    pub min_criteria_chars: usize,
}

const fn default_session_ttl_secs() -> u64 {
    1800
}

const fn default_janitor_interval_secs() -> u64 {
    60
}

const fn default_min_horizon_minutes() -> i64 {
    60
}

const fn default_min_criteria_chars() -> usize {
    20
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl_secs(),
            janitor_interval_secs: default_janitor_interval_secs(),
            min_horizon_minutes: default_min_horizon_minutes(),
            min_criteria_chars: default_min_criteria_chars(),
        }
    }
}

impl WorkflowConfig {
    #[must_use]
    pub fn rules(&self) -> StepRules {
        StepRules {
            min_horizon: Duration::minutes(self.min_horizon_minutes.max(0)),
            min_criteria_chars: self.min_criteria_chars,
        }
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(i64::try_from(self.session_ttl_secs).unwrap_or(i64::MAX / 1000))
    }
}

/// Result of an opening message.
#[derive(Debug, Clone)]
pub enum StartOutcome {
    /// A session was opened; step 1 is current.
    Started(WorkflowSession),
    /// Not a market request.
    Declined {
        intent: Intent,
        examples: Vec<String>,
    },
}

/// Result of one step response.
#[derive(Debug, Clone)]
pub struct StepReply {
    pub submission: Submission,
    pub session: WorkflowSession,
}

type SessionCell = Arc<Mutex<WorkflowSession>>;

/// Owns every in-flight workflow session.
pub struct WorkflowService<S: Store> {
    sessions: DashMap<SessionId, SessionCell>,
    llm: Option<Arc<dyn Llm>>,
    predictor: Arc<dyn Predictor>,
    store: Arc<S>,
    config: WorkflowConfig,
}

impl<S: Store + 'static> WorkflowService<S> {
    pub fn new(
        llm: Option<Arc<dyn Llm>>,
        predictor: Arc<dyn Predictor>,
        store: Arc<S>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            llm,
            predictor,
            store,
            config,
        }
    }

    /// Number of sessions held in memory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Classify `message` and open a session when it asks for a market.
    pub async fn start(&self, message: &str) -> StartOutcome {
        let intent = intent::classify(self.llm.as_ref(), message).await;
        if intent != Intent::CreateMarket {
            debug!(%intent, "Workflow declined");
            return StartOutcome::Declined {
                intent,
                examples: EXAMPLE_PROMPTS.iter().map(|s| (*s).to_string()).collect(),
            };
        }

        let session = WorkflowSession::start(message, Utc::now(), &self.config.rules());
        info!(session = %session.id(), "Workflow started");
        self.persist(&session).await;
        self.sessions
            .insert(session.id().clone(), Arc::new(Mutex::new(session.clone())));
        StartOutcome::Started(session)
    }

    /// Find a session in memory, restoring an unfinished one from the store.
    async fn lookup(&self, id: &SessionId) -> Result<SessionCell> {
        if let Some(cell) = self.sessions.get(id) {
            return Ok(Arc::clone(cell.value()));
        }
        let stored = match self.store.get_session(id).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(session = %id, error = %err, "Session lookup in store failed");
                None
            }
        };
        match stored {
            Some(session) if !session.status().is_terminal() => {
                debug!(session = %id, "Session restored from store");
                let cell = self
                    .sessions
                    .entry(id.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(session)))
                    .value()
                    .clone();
                Ok(cell)
            }
            _ => Err(Error::NotFound(format!("session {id}"))),
        }
    }

    /// Submit the user's response to the current step.
    ///
    /// # Errors
    /// [`Error::NotFound`] for unknown sessions, [`Error::Domain`] when the
    /// session no longer accepts input.
    pub async fn respond(&self, id: &SessionId, input: &str) -> Result<StepReply> {
        let cell = self.lookup(id).await?;
        let (submission, snapshot) = {
            let mut session = cell.lock().await;
            let now = Utc::now();
            let submission = session.submit(input, now, &self.config.rules())?;
            if submission == Submission::Confirmed {
                let prediction = self.predict(&session, now).await;
                session.finalize(prediction, now)?;
                info!(
                    session = %id,
                    probability = session.proposal().ai_probability(),
                    confidence = session.proposal().ai_confidence(),
                    "Workflow finalized"
                );
            }
            (submission, session.clone())
        };

        self.persist(&snapshot).await;
        if snapshot.status() == SessionStatus::Finalized {
            if let Err(err) = self.store.save_proposal(snapshot.proposal()).await {
                warn!(session = %id, error = %err, "Failed to persist finalized proposal");
            }
        }
        Ok(StepReply {
            submission,
            session: snapshot,
        })
    }

    async fn predict(&self, session: &WorkflowSession, now: DateTime<Utc>) -> Prediction {
        let proposal = session.proposal();
        let days = (proposal.end_date() - now).num_seconds() as f64 / 86_400.0;
        let request = PredictionRequest::new(proposal.question(), proposal.category())
            .with_feature("sentiment", Sentiment::from_unit(proposal.sentiment()).polarity())
            .with_feature("days_to_close", days);
        match self.predictor.predict(&request).await {
            Ok(prediction) => prediction,
            Err(err) => {
                warn!(predictor = self.predictor.name(), error = %err, "Prediction failed, using neutral estimate");
                Prediction {
                    probability: 0.5,
                    confidence: 0.3,
                    key_factors: Vec::new(),
                    risk_factors: vec!["Probability estimator unavailable".to_string()],
                    data_quality_score: 0.0,
                }
            }
        }
    }

    /// Current snapshot of a session.
    ///
    /// # Errors
    /// [`Error::NotFound`] when the session is neither in memory nor stored.
    pub async fn snapshot(&self, id: &SessionId) -> Result<WorkflowSession> {
        if let Some(cell) = self.sessions.get(id).map(|c| Arc::clone(c.value())) {
            return Ok(cell.lock().await.clone());
        }
        self.store
            .get_session(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("session {id}")))
    }

    /// Close a session. Returns true if it existed in memory or the store.
    pub async fn close(&self, id: &SessionId) -> bool {
        let in_memory = self.sessions.remove(id).is_some();
        let stored = match self.store.delete_session(id).await {
            Ok(deleted) => deleted,
            Err(err) => {
                warn!(session = %id, error = %err, "Failed to delete stored session");
                false
            }
        };
        if in_memory || stored {
            info!(session = %id, "Workflow closed");
        }
        in_memory || stored
    }

    /// Drop sessions idle since before `now - ttl`. Sessions locked by an
    /// in-flight request are left alone.
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.config.session_ttl();
        let expired: Vec<SessionId> = self
            .sessions
            .iter()
            .filter_map(|entry| {
                let session = entry.value().try_lock().ok()?;
                (session.updated_at() < cutoff).then(|| entry.key().clone())
            })
            .collect();
        let mut evicted = 0;
        for id in expired {
            if self.sessions.remove(&id).is_some() {
                evicted += 1;
            }
        }
        if let Err(err) = self.store.prune_sessions(cutoff).await {
            warn!(error = %err, "Failed to prune stored sessions");
        }
        if evicted > 0 {
            info!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Run [`evict_idle`](Self::evict_idle) periodically until `shutdown`
    /// flips to true.
    pub fn spawn_janitor(self: &Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        let period = StdDuration::from_secs(self.config.janitor_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        service.evict_idle(Utc::now()).await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            debug!("Session janitor stopping");
                            break;
                        }
                    }
                }
            }
        })
    }

    async fn persist(&self, session: &WorkflowSession) {
        if let Err(err) = self.store.save_session(session).await {
            warn!(session = %session.id(), error = %err, "Failed to persist session");
        }
    }
}
