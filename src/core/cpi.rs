//! CPI data source abstraction and resolved-value provenance.

use crate::core::series::{MatchKind, TimeSeries};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Inclusive date window a source should cover when fetching a series.
#[derive(Debug, Clone, Copy)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A source of monthly CPI index values for one or more countries.
#[async_trait]
pub trait CpiSource: Send + Sync {
    async fn fetch(&self, country: &str, window: DateWindow) -> Result<TimeSeries>;
}

/// Which fallback tier ultimately supplied a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTier {
    FreshApi,
    StaleApi,
    Bundled,
}

impl DataTier {
    pub fn tag(self) -> &'static str {
        match self {
            DataTier::FreshApi => "fresh-api",
            DataTier::StaleApi => "stale-api",
            DataTier::Bundled => "bundled",
        }
    }
}

/// A resolved CPI index value with full provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCpi {
    pub value: f64,
    pub tier: DataTier,
    pub match_kind: MatchKind,
}
