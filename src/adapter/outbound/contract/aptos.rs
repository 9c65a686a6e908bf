//! Aptos prediction-market contract.
//!
//! Reads go straight to the fullnode `view` endpoint. Writes are sent as
//! entry-function payloads to a signing relay, which owns the key material
//! and transaction submission.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::settings::ContractSettings;
use crate::domain::{Market, MarketId, MarketProposal, Outcome};
use crate::error::{Error, Result};
use crate::port::outbound::contract::MarketContract;

/// Aptos contract client.
pub struct AptosContract {
    http: Client,
    node_url: String,
    relay_url: String,
    address: String,
    module: String,
    oracle_address: String,
    signer_key: String,
}

impl AptosContract {
    /// Build a client for the contract at `address`.
    #[must_use]
    pub fn new(settings: &ContractSettings, address: impl Into<String>, signer_key: impl Into<String>) -> Self {
        let address = address.into();
        let http = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                Client::new()
            });
        Self {
            http,
            node_url: settings.node_url.trim_end_matches('/').to_string(),
            relay_url: settings.relay_url.clone(),
            oracle_address: settings
                .oracle_address
                .clone()
                .unwrap_or_else(|| address.clone()),
            module: settings.module.clone(),
            address,
            signer_key: signer_key.into(),
        }
    }

    fn function(&self, name: &str) -> String {
        format!("{}::{}::{}", self.address, self.module, name)
    }

    fn create_payload(&self, proposal: &MarketProposal) -> EntryFunctionPayload {
        EntryFunctionPayload {
            function: self.function("create_market"),
            type_arguments: Vec::new(),
            arguments: vec![
                Value::String(proposal.question().to_string()),
                Value::String(proposal.end_date().timestamp().max(0).to_string()),
                Value::String(self.oracle_address.clone()),
                Value::String(proposal.resolution_criteria().to_string()),
            ],
        }
    }

    fn resolve_payload(&self, id: MarketId, outcome: bool) -> EntryFunctionPayload {
        EntryFunctionPayload {
            function: self.function("resolve_market"),
            type_arguments: Vec::new(),
            arguments: vec![Value::String(id.value().to_string()), Value::Bool(outcome)],
        }
    }

    async fn submit(&self, payload: &EntryFunctionPayload) -> Result<bool> {
        let response = self
            .http
            .post(&self.relay_url)
            .bearer_auth(&self.signer_key)
            .json(payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Connection(e.to_string()))?
            .json::<RelayResponse>()
            .await?;
        if let Some(hash) = &response.hash {
            info!(function = %payload.function, hash = %hash, "Relay accepted transaction");
        }
        Ok(response.success)
    }
}

#[derive(Debug, Serialize)]
struct EntryFunctionPayload {
    function: String,
    type_arguments: Vec<String>,
    arguments: Vec<Value>,
}

#[derive(Deserialize)]
struct RelayResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    hash: Option<String>,
}

const fn default_success() -> bool {
    true
}

#[derive(Serialize)]
struct ViewRequest {
    function: String,
    type_arguments: Vec<String>,
    arguments: Vec<Value>,
}

/// Aptos encodes u64 as a JSON string; accept either form.
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_market(item: &Value) -> Option<Market> {
    let id = item.get("market_id").or_else(|| item.get("id")).and_then(as_u64)?;
    let end_time = item.get("end_time").and_then(as_u64)?;
    let resolved = item.get("resolved").and_then(Value::as_bool).unwrap_or(false);
    let outcome = match item.get("outcome") {
        Some(Value::Bool(b)) => Outcome::from(*b),
        Some(Value::Object(opt)) => opt
            .get("vec")
            .and_then(Value::as_array)
            .and_then(|v| v.first())
            .and_then(Value::as_bool)
            .map_or(Outcome::Unresolved, Outcome::from),
        _ => Outcome::Unresolved,
    };
    Some(Market {
        id: MarketId::new(id),
        description: item
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        end_time: to_datetime(end_time)?,
        resolved,
        outcome,
    })
}

fn to_datetime(secs: u64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(i64::try_from(secs).ok()?, 0).single()
}

/// The view endpoint returns a list of return values; the first one is
/// the market vector. A bare market list is accepted too.
fn parse_view_markets(body: Value) -> Vec<Market> {
    let items = match body {
        Value::Array(values) => match values.first() {
            Some(Value::Array(inner)) => inner.clone(),
            _ => values,
        },
        _ => Vec::new(),
    };
    items.iter().filter_map(parse_market).collect()
}

#[async_trait]
impl MarketContract for AptosContract {
    fn name(&self) -> &'static str {
        "aptos"
    }

    async fn create_market(&self, proposal: &MarketProposal) -> Result<bool> {
        let payload = self.create_payload(proposal);
        let ok = self.submit(&payload).await?;
        if ok {
            info!(question = %proposal.question(), "Market created");
        }
        Ok(ok)
    }

    async fn get_open_markets(&self) -> Result<Vec<Market>> {
        let request = ViewRequest {
            function: self.function("get_open_markets"),
            type_arguments: Vec::new(),
            arguments: Vec::new(),
        };
        let body = self
            .http
            .post(format!("{}/view", self.node_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Connection(e.to_string()))?
            .json::<Value>()
            .await?;
        Ok(parse_view_markets(body))
    }

    async fn resolve_market(&self, id: MarketId, outcome: bool) -> Result<bool> {
        let ok = self.submit(&self.resolve_payload(id, outcome)).await?;
        if ok {
            info!(market = %id, outcome, "Market resolved");
        }
        Ok(ok)
    }
}
