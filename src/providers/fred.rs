use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Datelike;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::cpi::{CpiSource, DateWindow};
use crate::core::series::{MonthKey, TimeSeries};

const FRED_SERIES: &str = "CPIAUCNS";

/// US CPI from the FRED observations API. Requires an API key; a
/// missing key is a normal fetch failure, handled by the fallback chain.
pub struct FredProvider {
    base_url: String,
    api_key: Option<String>,
}

impl FredProvider {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        FredProvider {
            base_url: base_url.to_string(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FredResponse {
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

#[async_trait]
impl CpiSource for FredProvider {
    #[instrument(name = "FredCpiFetch", skip(self, window), fields(country = %country))]
    async fn fetch(&self, country: &str, window: DateWindow) -> Result<TimeSeries> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("FRED API key not configured (set FRED_API_KEY)"))?;

        let url = format!("{}/fred/series/observations", self.base_url);
        debug!("Requesting CPI observations from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("realfolio/1.0")
            .build()?;
        let response = client
            .get(&url)
            .query(&[
                ("series_id", FRED_SERIES),
                ("api_key", api_key),
                ("file_type", "json"),
                (
                    "observation_start",
                    &window.start.with_day(1).unwrap_or(window.start).to_string(),
                ),
                ("observation_end", &window.end.to_string()),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for FRED series {}", e, FRED_SERIES))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} from FRED for {}",
                response.status(),
                country
            ));
        }

        let data = response.json::<FredResponse>().await?;

        let mut series = TimeSeries::new();
        for obs in &data.observations {
            // FRED publishes "." for months without a value yet.
            if obs.value == "." {
                continue;
            }
            // Observation dates are first-of-month: "2023-03-01".
            let month: MonthKey = obs.date[..obs.date.len().min(7)]
                .parse()
                .map_err(|e| anyhow!("Unexpected FRED observation date {:?}: {}", obs.date, e))?;
            let value: f64 = obs
                .value
                .parse()
                .map_err(|_| anyhow!("Unexpected FRED observation value {:?}", obs.value))?;
            series.insert(month, value);
        }

        debug!("Fetched {} CPI observations from FRED", series.len());
        Ok(series)
    }
}
