//! On-chain market mirror.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::MarketId;

/// Outcome of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Unresolved,
    Yes,
    No,
}

impl Outcome {
    /// The boolean written to the contract, if the outcome is decided.
    #[must_use]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Outcome::Unresolved => None,
            Outcome::Yes => Some(true),
            Outcome::No => Some(false),
        }
    }
}

impl From<bool> for Outcome {
    fn from(yes: bool) -> Self {
        if yes {
            Outcome::Yes
        } else {
            Outcome::No
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Unresolved => "unresolved",
            Outcome::Yes => "yes",
            Outcome::No => "no",
        })
    }
}

/// A market as read back from the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub description: String,
    pub end_time: DateTime<Utc>,
    pub resolved: bool,
    pub outcome: Outcome,
}

impl Market {
    /// True when the market has ended and still awaits an outcome.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.resolved && self.end_time <= now
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn due_only_when_expired_and_unresolved() {
        let now = Utc::now();
        let mut market = Market {
            id: MarketId::new(1),
            description: "Will it rain?".into(),
            end_time: now - Duration::minutes(1),
            resolved: false,
            outcome: Outcome::Unresolved,
        };
        assert!(market.is_due(now));

        market.resolved = true;
        assert!(!market.is_due(now));

        market.resolved = false;
        market.end_time = now + Duration::hours(1);
        assert!(!market.is_due(now));
    }

    #[test]
    fn outcome_bool_mapping() {
        assert_eq!(Outcome::from(true), Outcome::Yes);
        assert_eq!(Outcome::No.as_bool(), Some(false));
        assert_eq!(Outcome::Unresolved.as_bool(), None);
    }
}
