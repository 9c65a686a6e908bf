//! Intent classification for opening messages.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{text, Intent};
use crate::port::outbound::llm::{GenerationOptions, Llm};

/// Shown when a message is not a market request.
pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "Will Bitcoin close above $100,000 by the end of the year?",
    "Will the Fed cut interest rates at its next meeting?",
    "Will the Lakers make the NBA playoffs this season?",
    "Will Apple announce a foldable iPhone before 2027?",
];

const ANALYZE_WORDS: &[&str] = &["analyze", "analyse", "analysis", "evaluate", "assess"];

const CREATE_WORDS: &[&str] = &[
    "will", "bet", "predict", "prediction", "odds", "market", "chance", "chances", "wager",
    "happen", "create",
];

const INQUIRY_WORDS: &[&str] = &["what", "how", "why", "who", "explain", "help", "tell"];

fn prompt(message: &str) -> String {
    format!(
        "Classify the user's message for a prediction market assistant.\n\
         Labels:\n\
         - create_market: they want to create a market or ask whether something will happen\n\
         - analyze_odds: they want an analysis of an existing market or its odds\n\
         - general_inquiry: a general question about prediction markets\n\
         - unclear: none of the above\n\n\
         Message: {message}\n\n\
         Reply with the label only."
    )
}

/// Keyword heuristic used when no model is available.
#[must_use]
pub fn classify_keywords(message: &str) -> Intent {
    let tokens: Vec<String> = text::tokens(message).collect();
    let has = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));
    if has(ANALYZE_WORDS) {
        Intent::AnalyzeOdds
    } else if has(CREATE_WORDS) {
        Intent::CreateMarket
    } else if has(INQUIRY_WORDS) || message.trim_end().ends_with('?') {
        Intent::GeneralInquiry
    } else {
        Intent::Unclear
    }
}

/// Classify through the model, falling back to keywords when it fails or
/// none is configured.
pub async fn classify(llm: Option<&Arc<dyn Llm>>, message: &str) -> Intent {
    let Some(llm) = llm else {
        return classify_keywords(message);
    };
    match llm.generate(&prompt(message), &GenerationOptions::text(0.0, 20)).await {
        Ok(reply) => {
            let intent = Intent::from_reply(&reply);
            debug!(provider = llm.name(), %intent, "Intent classified");
            intent
        }
        Err(err) => {
            warn!(provider = llm.name(), error = %err, "Intent classification failed, using keywords");
            classify_keywords(message)
        }
    }
}
