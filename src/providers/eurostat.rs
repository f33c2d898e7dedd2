use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::cpi::{CpiSource, DateWindow};
use crate::core::series::{MonthKey, TimeSeries};

/// HICP index (2015 = 100) from the Eurostat dissemination API, in
/// JSON-stat form. Covers the non-US countries in the registry.
pub struct EurostatProvider {
    base_url: String,
}

impl EurostatProvider {
    pub fn new(base_url: &str) -> Self {
        EurostatProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EurostatResponse {
    #[serde(default)]
    value: HashMap<String, Option<f64>>,
    #[serde(default)]
    dimension: Dimension,
}

#[derive(Debug, Deserialize, Default)]
struct Dimension {
    #[serde(default)]
    time: TimeDimension,
}

#[derive(Debug, Deserialize, Default)]
struct TimeDimension {
    #[serde(default)]
    category: TimeCategory,
}

#[derive(Debug, Deserialize, Default)]
struct TimeCategory {
    /// Maps "YYYY-MM" periods to positions in the flat value array.
    #[serde(default)]
    index: HashMap<String, u64>,
}

#[async_trait]
impl CpiSource for EurostatProvider {
    #[instrument(name = "EurostatCpiFetch", skip(self, window), fields(country = %country))]
    async fn fetch(&self, country: &str, window: DateWindow) -> Result<TimeSeries> {
        let since = MonthKey::from_date(window.start).to_string();
        let until = MonthKey::from_date(window.end).to_string();

        let url = format!(
            "{}/eurostat/api/dissemination/statistics/1.0/data/prc_hicp_midx",
            self.base_url
        );
        debug!("Requesting HICP data from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("realfolio/1.0")
            .build()?;
        let response = client
            .get(&url)
            .query(&[
                ("format", "JSON"),
                ("lang", "EN"),
                ("coicop", "CP00"),
                ("unit", "I15"),
                ("geo", country),
                ("sinceTimePeriod", &since),
                ("untilTimePeriod", &until),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for Eurostat country: {}", e, country))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} from Eurostat for {}",
                response.status(),
                country
            ));
        }

        let data = response.json::<EurostatResponse>().await?;

        // JSON-stat joins values to periods through the time dimension's
        // position index.
        let position_to_period: HashMap<String, &String> = data
            .dimension
            .time
            .category
            .index
            .iter()
            .map(|(period, pos)| (pos.to_string(), period))
            .collect();

        let mut series = TimeSeries::new();
        for (pos, value) in &data.value {
            let (Some(period), Some(value)) = (position_to_period.get(pos), value) else {
                continue;
            };
            if let Ok(month) = period.parse::<MonthKey>() {
                series.insert(month, *value);
            }
        }

        debug!(
            "Fetched {} HICP observations from Eurostat for {}",
            series.len(),
            country
        );
        Ok(series)
    }
}
