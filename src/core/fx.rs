//! FX rate source abstraction.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// A rate returned by an FX source. `date` is the date the rate is
/// actually for, which may be an earlier trading day than requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxQuote {
    pub rate: f64,
    pub date: NaiveDate,
}

/// A source of historical FX rates (units of `symbol` per 1 `base`).
#[async_trait]
pub trait FxSource: Send + Sync {
    async fn fetch_rate(&self, base: &str, symbol: &str, date: NaiveDate) -> Result<FxQuote>;
}
