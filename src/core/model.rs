//! Result models produced by the analysis engine.

use chrono::NaiveDate;
use serde::Serialize;

/// The analyzed period with its fractional-year length.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AnalysisPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub years: f64,
}

/// Per-currency breakdown: resolved inputs plus every derived metric.
/// Return and inflation fields are decimals (0.232 = 23.2%).
#[derive(Debug, Clone, Serialize)]
pub struct CurrencyBreakdown {
    pub currency: String,
    pub country: String,
    pub start_value: f64,
    pub end_value: f64,
    pub fx_rate_start: f64,
    pub fx_rate_end: f64,
    pub cpi_start: f64,
    pub cpi_end: f64,
    pub fx_delta: f64,
    pub nominal_return: f64,
    pub cumulative_inflation: f64,
    pub real_return: f64,
    pub discounted_end_value: f64,
    pub real_cagr: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_cagr: Option<f64>,
    /// Warnings raised while resolving this currency's inputs.
    pub warnings: Vec<String>,
}

/// The complete, immutable outcome of one analysis request.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub period: AnalysisPeriod,
    pub base_currency: String,
    pub start_value: f64,
    pub end_value: f64,
    pub currencies: Vec<CurrencyBreakdown>,
    /// Union of all warnings, in order of first occurrence.
    pub warnings: Vec<String>,
}
