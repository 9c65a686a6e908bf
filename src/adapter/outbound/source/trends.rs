//! Google Trends interest via SerpApi.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::adapter::outbound::http::HttpFetcher;
use super::settings::TrendsSettings;
use crate::error::{ConfigError, Error, Result};
use crate::port::outbound::source::TrendInterestSource;

const API_URL: &str = "https://serpapi.com/search.json";

/// Read `SERPAPI_API_KEY`.
///
/// # Errors
///
/// Returns an error if the variable is not set.
pub fn serpapi_key_from_env() -> Result<String> {
    std::env::var("SERPAPI_API_KEY").map_err(|_| {
        Error::Config(ConfigError::MissingField {
            field: "SERPAPI_API_KEY",
        })
    })
}

/// Search-interest source backed by the SerpApi Google Trends engine.
pub struct GoogleTrends {
    fetcher: HttpFetcher,
    api_key: String,
    settings: TrendsSettings,
}

impl GoogleTrends {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, api_key: impl Into<String>, settings: TrendsSettings) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
            settings,
        }
    }

    async fn batch(&self, keywords: &[String]) -> Result<HashMap<String, f64>> {
        let query = keywords.join(",");
        let response: TrendsResponse = self
            .fetcher
            .send_json(|http| {
                http.get(API_URL).query(&[
                    ("engine", "google_trends"),
                    ("q", query.as_str()),
                    ("date", self.settings.timeframe.as_str()),
                    ("data_type", "TIMESERIES"),
                    ("api_key", self.api_key.as_str()),
                ])
            })
            .await?;
        Ok(average_interest(response))
    }
}

#[derive(Deserialize)]
struct TrendsResponse {
    #[serde(default)]
    interest_over_time: Option<InterestOverTime>,
}

#[derive(Deserialize)]
struct InterestOverTime {
    #[serde(default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Deserialize)]
struct TimelinePoint {
    #[serde(default)]
    values: Vec<TimelineValue>,
}

#[derive(Deserialize)]
struct TimelineValue {
    query: String,
    #[serde(default)]
    extracted_value: Option<f64>,
}

/// Mean interest per query across the timeline.
fn average_interest(response: TrendsResponse) -> HashMap<String, f64> {
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
    let points = response
        .interest_over_time
        .map(|i| i.timeline_data)
        .unwrap_or_default();
    for value in points.into_iter().flat_map(|p| p.values) {
        if let Some(v) = value.extracted_value.filter(|v| v.is_finite()) {
            let entry = sums.entry(value.query).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(query, (sum, n))| (query, sum / n as f64))
        .collect()
}

#[async_trait]
impl TrendInterestSource for GoogleTrends {
    fn name(&self) -> &'static str {
        "google_trends"
    }

    async fn interest(&self, keywords: &[String]) -> Result<HashMap<String, f64>> {
        let mut result = HashMap::new();
        for (i, batch) in keywords.chunks(self.settings.batch_size.max(1)).enumerate() {
            if i > 0 {
                self.fetcher.pace().await;
            }
            match self.batch(batch).await {
                Ok(found) => {
                    debug!(keywords = batch.len(), found = found.len(), "Fetched trend batch");
                    result.extend(found);
                }
                Err(e) => warn!(batch = ?batch, error = %e, "Skipping trend batch"),
            }
        }
        Ok(result)
    }
}
