//! Port implementations with scripted behavior.
//!
//! - [`StubLlm`] — Queue of replies, then a fixed fallback. Records prompts.
//! - [`StubSource`] — Fixed items, or a fixed failure.
//! - [`StubTrends`] — Fixed interest values.
//! - [`StubSearch`] — Fixed snippets, or a fixed failure.
//! - [`FixedScorer`] — Same polarity for every batch.
//! - [`FailingContract`] — Every call errors.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{FetchParams, Market, MarketId, MarketProposal, RawItem, Sentiment, SourceKind};
use crate::error::{Error, Result};
use crate::port::outbound::contract::MarketContract;
use crate::port::outbound::llm::{GenerationOptions, Llm};
use crate::port::outbound::search::{SearchResult, WebSearch};
use crate::port::outbound::sentiment::SentimentScorer;
use crate::port::outbound::source::{SignalSource, TrendInterestSource};

// ---------------------------------------------------------------------------
// StubLlm
// ---------------------------------------------------------------------------

/// Text generation that pops scripted replies in order.
///
/// `Err` entries become [`Error::Llm`]. Once the queue is empty every call
/// returns the fallback, or fails when none was set.
#[derive(Default)]
pub struct StubLlm {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `reply`.
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            fallback: Some(reply.into()),
            ..Self::default()
        }
    }

    /// Always fail.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        self.replies.lock().push_back(Ok(reply.into()));
        self
    }

    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.replies.lock().push_back(Err(message.into()));
        self
    }

    /// Number of generate calls so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Llm for StubLlm {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        let scripted = self.replies.lock().pop_front();
        match scripted {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(Error::Llm(message)),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| Error::Llm("no scripted reply".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// StubSource
// ---------------------------------------------------------------------------

/// Signal source returning fixed items.
pub struct StubSource {
    name: &'static str,
    kind: SourceKind,
    items: Vec<RawItem>,
    fail: bool,
    fetches: AtomicUsize,
}

impl StubSource {
    pub fn new(name: &'static str, kind: SourceKind, items: Vec<RawItem>) -> Self {
        Self {
            name,
            kind,
            items,
            fail: false,
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails.
    pub fn failing(name: &'static str, kind: SourceKind) -> Self {
        Self {
            fail: true,
            ..Self::new(name, kind, Vec::new())
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalSource for StubSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, params: &FetchParams) -> Result<Vec<RawItem>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Connection(format!("{} unavailable", self.name)));
        }
        let limit = params.limit.unwrap_or(usize::MAX);
        Ok(self.items.iter().take(limit).cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// StubTrends
// ---------------------------------------------------------------------------

/// Search interest with fixed values per keyword.
#[derive(Default)]
pub struct StubTrends {
    values: HashMap<String, f64>,
}

impl StubTrends {
    pub fn new(values: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

#[async_trait]
impl TrendInterestSource for StubTrends {
    fn name(&self) -> &'static str {
        "stub_trends"
    }

    async fn interest(&self, keywords: &[String]) -> Result<HashMap<String, f64>> {
        Ok(keywords
            .iter()
            .filter_map(|k| self.values.get(k).map(|v| (k.clone(), *v)))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// StubSearch
// ---------------------------------------------------------------------------

/// Web search returning the same snippets for every query.
pub struct StubSearch {
    snippets: Vec<String>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl StubSearch {
    pub fn new(snippets: &[&str]) -> Self {
        Self {
            snippets: snippets.iter().map(|s| (*s).to_string()).collect(),
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl WebSearch for StubSearch {
    fn name(&self) -> &'static str {
        "stub_search"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.queries.lock().push(query.to_string());
        if self.fail {
            return Err(Error::Connection("search unavailable".into()));
        }
        Ok(self
            .snippets
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, snippet)| SearchResult {
                title: format!("Result {i}"),
                snippet: snippet.clone(),
                link: format!("https://search.test/{i}"),
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// FixedScorer
// ---------------------------------------------------------------------------

/// Sentiment scorer answering one polarity for every non-empty batch.
pub struct FixedScorer(pub f64);

#[async_trait]
impl SentimentScorer for FixedScorer {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn score(&self, texts: &[String]) -> Sentiment {
        if texts.is_empty() {
            Sentiment::NEUTRAL
        } else {
            Sentiment::new(self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// FailingContract
// ---------------------------------------------------------------------------

/// Contract whose every call returns a connection error.
#[derive(Default)]
pub struct FailingContract;

#[async_trait]
impl MarketContract for FailingContract {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn create_market(&self, _proposal: &MarketProposal) -> Result<bool> {
        Err(Error::Connection("contract unreachable".into()))
    }

    async fn get_open_markets(&self) -> Result<Vec<Market>> {
        Err(Error::Connection("contract unreachable".into()))
    }

    async fn resolve_market(&self, _id: MarketId, _outcome: bool) -> Result<bool> {
        Err(Error::Connection("contract unreachable".into()))
    }
}
