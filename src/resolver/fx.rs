//! FX rate resolution with a permanent cache.
//!
//! Historical rates never change once recorded, so a cached value for
//! an exact requested date is authoritative at any age. No
//! interpolation: non-trading days resolve through the source's
//! nearest-prior-trading-day behavior, with a warning.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::fx::FxSource;
use crate::error::AnalysisError;
use crate::store::{CacheEntry, CacheStore};

/// A resolved FX rate for a requested date.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedRate {
    pub rate: f64,
    /// The trading day the rate is actually for.
    pub rate_date: NaiveDate,
}

pub struct FxResolver {
    store: Arc<CacheStore>,
    source: Arc<dyn FxSource>,
}

impl FxResolver {
    pub fn new(store: Arc<CacheStore>, source: Arc<dyn FxSource>) -> Self {
        FxResolver { store, source }
    }

    fn cache_key(base: &str, symbol: &str, date: NaiveDate) -> String {
        format!("fx/{date}/{base}/{symbol}")
    }

    /// Resolve the rate for `symbol` per 1 `base` on `date`. The base
    /// currency itself is always 1.0 and never fetched.
    pub async fn resolve(
        &self,
        base: &str,
        symbol: &str,
        date: NaiveDate,
    ) -> Result<(ResolvedRate, Vec<String>), AnalysisError> {
        if base == symbol {
            return Ok((
                ResolvedRate {
                    rate: 1.0,
                    rate_date: date,
                },
                Vec::new(),
            ));
        }

        let mut warnings = Vec::new();
        let key = Self::cache_key(base, symbol, date);

        if let Some(entry) = self.store.get::<ResolvedRate>(&key) {
            debug!(key, "FX rate served from cache");
            return Ok((entry.value, warnings));
        }

        match self.source.fetch_rate(base, symbol, date).await {
            Ok(quote) => {
                if quote.date != date {
                    warnings.push(format!(
                        "No {base}/{symbol} rate for {date}; using nearest prior trading day {}",
                        quote.date
                    ));
                }
                let resolved = ResolvedRate {
                    rate: quote.rate,
                    rate_date: quote.date,
                };
                // Keyed under the requested date to avoid repeat lookups.
                self.store.put(&key, &CacheEntry::new("fresh-api", resolved));
                Ok((resolved, warnings))
            }
            Err(e) => {
                warn!(base, symbol, %date, error = %e, "FX fetch failed");
                Err(AnalysisError::DataUnavailable(format!(
                    "no FX rate could be resolved for {base}/{symbol} on {date}: {e}"
                )))
            }
        }
    }
}
