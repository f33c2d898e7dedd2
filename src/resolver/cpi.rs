//! CPI resolution: layered cache/API/bundled fallback with month matching.

use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::cpi::{CpiSource, DataTier, DateWindow, ResolvedCpi};
use crate::core::series::{MatchKind, MonthKey, TimeSeries};
use crate::error::AnalysisError;
use crate::providers::bundled::BundledCpi;
use crate::store::{CacheEntry, CacheStore};

const CPI_MAX_AGE_DAYS: i64 = 30;

/// Resolves a (country, month) pair to a trustworthy CPI value.
///
/// Tiers, first success wins: fresh cache (≤30 days), live source,
/// stale cache, bundled dataset. Every degradation is reported as a
/// warning so results stay auditable.
pub struct CpiResolver {
    store: Arc<CacheStore>,
    sources: HashMap<String, Arc<dyn CpiSource>>,
    bundled: BundledCpi,
    force_refresh: bool,
}

impl CpiResolver {
    pub fn new(
        store: Arc<CacheStore>,
        sources: HashMap<String, Arc<dyn CpiSource>>,
        bundled: BundledCpi,
    ) -> Self {
        CpiResolver {
            store,
            sources,
            bundled,
            force_refresh: false,
        }
    }

    /// Skip the fresh-cache tier so the live source is always consulted.
    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    fn cache_key(country: &str) -> String {
        format!("cpi/{country}")
    }

    /// Resolve `month` for `country`. `window` is the range fetched from
    /// the live source when the chain reaches that tier.
    pub async fn resolve(
        &self,
        country: &str,
        month: MonthKey,
        window: DateWindow,
    ) -> Result<(ResolvedCpi, Vec<String>), AnalysisError> {
        let mut warnings = Vec::new();
        let key = Self::cache_key(country);
        let max_age = Duration::days(CPI_MAX_AGE_DAYS);
        let cached: Option<CacheEntry<TimeSeries>> = self.store.get(&key);

        // Tier 1: fresh cache.
        if !self.force_refresh
            && let Some(entry) = &cached
            && entry.is_fresh(Some(max_age))
            && let Some(resolved) = Self::match_month(&entry.value, month, DataTier::FreshApi, &mut warnings)
        {
            return Ok((resolved, warnings));
        }

        // Tier 2: live source, caching the result wholesale on success.
        match self.fetch_live(country, window).await {
            Ok(series) => {
                self.store.put(&key, &CacheEntry::new(DataTier::FreshApi.tag(), &series));
                if let Some(resolved) =
                    Self::match_month(&series, month, DataTier::FreshApi, &mut warnings)
                {
                    return Ok((resolved, warnings));
                }
            }
            Err(e) => {
                warn!(country, error = %e, "Live CPI fetch failed");
                warnings.push(format!("Could not fetch CPI for {country}: {e}"));
            }
        }

        // Tier 3: stale cache, any age.
        if let Some(entry) = &cached
            && let Some(resolved) =
                Self::match_month(&entry.value, month, DataTier::StaleApi, &mut warnings)
        {
            warnings.push(format!(
                "Using cached CPI for {country} older than {CPI_MAX_AGE_DAYS} days (captured {})",
                entry.captured_at.format("%Y-%m-%d")
            ));
            return Ok((resolved, warnings));
        }

        // Tier 4: bundled reference data.
        if let Some(series) = self.bundled.series(country)
            && let Some(resolved) = Self::match_month(series, month, DataTier::Bundled, &mut warnings)
        {
            warnings.push(format!("Using bundled fallback CPI data for {country}"));
            return Ok((resolved, warnings));
        }

        Err(AnalysisError::DataUnavailable(format!(
            "no CPI series could be resolved for {country} ({month})"
        )))
    }

    async fn fetch_live(&self, country: &str, window: DateWindow) -> anyhow::Result<TimeSeries> {
        let source = self
            .sources
            .get(country)
            .ok_or_else(|| anyhow::anyhow!("no CPI source registered for {country}"))?;
        let series = source.fetch(country, window).await?;
        debug!(country, points = series.len(), "Live CPI fetch succeeded");
        Ok(series)
    }

    /// Month-matching policy applied to whichever series survived the
    /// chain. An empty series yields `None` so the chain continues.
    fn match_month(
        series: &TimeSeries,
        month: MonthKey,
        tier: DataTier,
        warnings: &mut Vec<String>,
    ) -> Option<ResolvedCpi> {
        let matched = series.lookup(month)?;
        if let MatchKind::Nearest(used) = matched.kind {
            warnings.push(format!(
                "No CPI for {month}; using nearest-month approximation from {used}"
            ));
        }
        Some(ResolvedCpi {
            value: matched.value,
            tier,
            match_kind: matched.kind,
        })
    }
}
