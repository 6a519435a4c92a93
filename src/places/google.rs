//! Google Places text search client

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::{PlaceResult, PlaceSearch};
use crate::config::PlacesConfig;
use crate::{Result, TripPlannerError};

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
    status: String,
    error_message: Option<String>,
}

/// Client for `place/textsearch/json`
pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GooglePlacesClient {
    pub fn new(config: &PlacesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("tripplanner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    #[instrument(skip(self))]
    async fn text_search(&self, query: &str) -> Result<Vec<PlaceResult>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TripPlannerError::config("GOOGLE_MAPS_API_KEY is not set"))?;

        let start_time = Instant::now();
        let url = format!("{}/place/textsearch/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("query", query), ("key", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Places API request failed with HTTP {}", status);
            return Err(TripPlannerError::api(format!(
                "Places API request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let payload: TextSearchResponse = response.json().await?;
        match payload.status.as_str() {
            "OK" | "ZERO_RESULTS" => {}
            other => {
                let detail = payload.error_message.unwrap_or_default();
                warn!("Places API returned status {}: {}", other, detail);
                return Err(TripPlannerError::api(format!(
                    "Places API returned status {other}: {detail}"
                )));
            }
        }

        info!(
            "Places search returned {} results in {:.3}s",
            payload.results.len(),
            start_time.elapsed().as_secs_f64()
        );
        debug!(
            "Places: {:?}",
            payload.results.iter().map(|r| &r.name).collect::<Vec<_>>()
        );

        Ok(payload.results)
    }
}
