use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::fx::{FxQuote, FxSource};

/// FX rates from the Frankfurter API. No key required. Requests for
/// non-trading days are answered with the nearest prior business day's
/// rate, and the response carries the date the rate is actually for.
pub struct FrankfurterProvider {
    base_url: String,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str) -> Self {
        FrankfurterProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    date: NaiveDate,
    rates: HashMap<String, f64>,
}

#[async_trait]
impl FxSource for FrankfurterProvider {
    #[instrument(
        name = "FrankfurterFxFetch",
        skip(self),
        fields(base = %base, symbol = %symbol, date = %date)
    )]
    async fn fetch_rate(&self, base: &str, symbol: &str, date: NaiveDate) -> Result<FxQuote> {
        let url = format!("{}/v1/{}", self.base_url, date);
        debug!("Requesting FX rate from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("realfolio/1.0")
            .build()?;
        let response = client
            .get(&url)
            .query(&[("base", base), ("symbols", symbol)])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for pair {}/{}", e, base, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for pair {}/{}",
                response.status(),
                base,
                symbol
            ));
        }

        let data = response.json::<FrankfurterResponse>().await?;
        let rate = data
            .rates
            .get(symbol)
            .copied()
            .ok_or_else(|| anyhow!("No rate found for pair {}/{} on {}", base, symbol, date))?;

        Ok(FxQuote {
            rate,
            date: data.date,
        })
    }
}
