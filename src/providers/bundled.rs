//! Bundled reference CPI dataset, used as the last fallback tier.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

use crate::core::series::{MonthKey, TimeSeries};

const REFERENCE_CSV: &str = include_str!("data/cpi_reference.csv");

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    country: String,
    date: String,
    index: f64,
}

/// Static per-country CPI series shipped with the binary.
pub struct BundledCpi {
    series: HashMap<String, TimeSeries>,
}

impl BundledCpi {
    pub fn load() -> Result<Self> {
        let mut series: HashMap<String, TimeSeries> = HashMap::new();
        let mut reader = csv::Reader::from_reader(REFERENCE_CSV.as_bytes());
        for row in reader.deserialize() {
            let row: ReferenceRow = row.context("Malformed bundled CPI row")?;
            let month: MonthKey = row.date[..row.date.len().min(7)]
                .parse()
                .map_err(|e| anyhow::anyhow!("Bad date in bundled CPI data: {e}"))?;
            series
                .entry(row.country)
                .or_default()
                .insert(month, row.index);
        }
        Ok(BundledCpi { series })
    }

    pub fn series(&self, country: &str) -> Option<&TimeSeries> {
        self.series.get(country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_all_registry_countries() {
        let bundled = BundledCpi::load().unwrap();
        for country in ["US", "DE", "UK", "CH", "JP"] {
            let series = bundled.series(country).unwrap();
            assert!(!series.is_empty(), "no bundled data for {country}");
        }
    }

    #[test]
    fn test_covers_expected_months() {
        let bundled = BundledCpi::load().unwrap();
        let us = bundled.series("US").unwrap();
        assert!(us.get("2020-01".parse().unwrap()).is_some());
        assert!(us.get("2023-03".parse().unwrap()).is_some());
        assert!(us.get("2025-12".parse().unwrap()).is_some());
    }

    #[test]
    fn test_unknown_country() {
        let bundled = BundledCpi::load().unwrap();
        assert!(bundled.series("XX").is_none());
    }
}
