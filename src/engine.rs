//! Orchestrates one analysis request: validate, fetch concurrently,
//! compute per currency, aggregate.

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::calc;
use crate::core::cpi::DateWindow;
use crate::core::model::{Analysis, AnalysisPeriod, CurrencyBreakdown};
use crate::core::registry::{self, CurrencyInfo};
use crate::core::series::MonthKey;
use crate::error::AnalysisError;
use crate::resolver::{CpiResolver, FxResolver};

/// One analysis request. Values are in the base currency.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_value: f64,
    pub end_value: f64,
    pub base_currency: String,
    pub currencies: Vec<String>,
    pub include_nominal_cagr: bool,
}

pub struct AnalysisEngine {
    cpi: CpiResolver,
    fx: FxResolver,
}

struct ResolvedInputs {
    fx_start: crate::resolver::ResolvedRate,
    fx_end: crate::resolver::ResolvedRate,
    cpi_start: f64,
    cpi_end: f64,
    warnings: Vec<String>,
}

impl AnalysisEngine {
    pub fn new(cpi: CpiResolver, fx: FxResolver) -> Self {
        AnalysisEngine { cpi, fx }
    }

    /// Runs the request through validation, fetching and computation.
    ///
    /// Fails only on invalid input or when no currency at all could be
    /// resolved; a single unresolvable currency is dropped with a
    /// top-level warning instead.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<Analysis, AnalysisError> {
        let currencies = Self::validate(request)?;
        info!(
            start = %request.start_date,
            end = %request.end_date,
            base = %request.base_currency,
            "Starting analysis for {} currencies",
            currencies.len()
        );

        let years = calc::years_between(request.start_date, request.end_date);
        let period = AnalysisPeriod {
            start_date: request.start_date,
            end_date: request.end_date,
            years,
        };

        let fetches = currencies
            .iter()
            .map(|info| self.resolve_currency(request, info));
        let resolved = join_all(fetches).await;

        let mut breakdowns = Vec::new();
        let mut warnings = Vec::new();
        for (info, outcome) in currencies.iter().zip(resolved) {
            match outcome {
                Ok(inputs) => {
                    let breakdown = Self::compute(request, info, years, inputs)?;
                    merge_warnings(&mut warnings, &breakdown.warnings);
                    breakdowns.push(breakdown);
                }
                Err(e) => {
                    warn!(currency = info.code, error = %e, "Dropping unresolvable currency");
                    merge_warnings(
                        &mut warnings,
                        &[format!("Dropped {}: {e}", info.code)],
                    );
                }
            }
        }

        if breakdowns.is_empty() {
            return Err(AnalysisError::DataUnavailable(
                "no requested currency could be resolved".to_string(),
            ));
        }

        Ok(Analysis {
            period,
            base_currency: request.base_currency.clone(),
            start_value: request.start_value,
            end_value: request.end_value,
            currencies: breakdowns,
            warnings,
        })
    }

    /// Input checks; violations never reach the fetching phase.
    fn validate(request: &AnalysisRequest) -> Result<Vec<&'static CurrencyInfo>, AnalysisError> {
        if request.start_date >= request.end_date {
            return Err(AnalysisError::Validation(
                "end date must be after start date".to_string(),
            ));
        }
        if request.end_date > Utc::now().date_naive() {
            return Err(AnalysisError::Validation(
                "end date cannot be in the future".to_string(),
            ));
        }
        if request.start_value <= 0.0 {
            return Err(AnalysisError::Validation(
                "start value must be positive".to_string(),
            ));
        }
        if request.end_value <= 0.0 {
            return Err(AnalysisError::Validation(
                "end value must be positive".to_string(),
            ));
        }

        let supported = || registry::supported_codes().join(", ");
        let base = registry::lookup(&request.base_currency).ok_or_else(|| {
            AnalysisError::Validation(format!(
                "base currency {:?} not supported. Supported: {}",
                request.base_currency,
                supported()
            ))
        })?;

        // Base currency always analyzed, first in the result order.
        let mut currencies = vec![base];
        for code in &request.currencies {
            let info = registry::lookup(code).ok_or_else(|| {
                AnalysisError::Validation(format!(
                    "currency {code:?} not supported. Supported: {}",
                    supported()
                ))
            })?;
            if !currencies.iter().any(|c| c.code == info.code) {
                currencies.push(info);
            }
        }
        Ok(currencies)
    }

    /// Resolves one currency's four inputs. FX and CPI run concurrently;
    /// the two CPI months run in sequence so the second lookup reuses
    /// the cache entry written by the first.
    async fn resolve_currency(
        &self,
        request: &AnalysisRequest,
        info: &CurrencyInfo,
    ) -> Result<ResolvedInputs, AnalysisError> {
        let window = DateWindow {
            start: request.start_date,
            end: request.end_date,
        };
        let start_month = MonthKey::from_date(request.start_date);
        let end_month = MonthKey::from_date(request.end_date);

        let fx_pair = async {
            tokio::join!(
                self.fx
                    .resolve(&request.base_currency, info.code, request.start_date),
                self.fx
                    .resolve(&request.base_currency, info.code, request.end_date),
            )
        };
        let cpi_pair = async {
            let start = self.cpi.resolve(info.country, start_month, window).await;
            let end = self.cpi.resolve(info.country, end_month, window).await;
            (start, end)
        };

        let ((fx_start, fx_end), (cpi_start, cpi_end)) = tokio::join!(fx_pair, cpi_pair);
        let (fx_start, mut w1) = fx_start?;
        let (fx_end, mut w2) = fx_end?;
        let (cpi_start, mut w3) = cpi_start?;
        let (cpi_end, mut w4) = cpi_end?;

        let mut warnings = Vec::new();
        warnings.append(&mut w1);
        warnings.append(&mut w2);
        warnings.append(&mut w3);
        warnings.append(&mut w4);

        debug!(
            currency = info.code,
            fx_start = fx_start.rate,
            fx_end = fx_end.rate,
            cpi_start = cpi_start.value,
            cpi_end = cpi_end.value,
            "Resolved inputs"
        );

        Ok(ResolvedInputs {
            fx_start,
            fx_end,
            cpi_start: cpi_start.value,
            cpi_end: cpi_end.value,
            warnings,
        })
    }

    fn compute(
        request: &AnalysisRequest,
        info: &CurrencyInfo,
        years: f64,
        inputs: ResolvedInputs,
    ) -> Result<CurrencyBreakdown, AnalysisError> {
        let local_start = calc::convert_to_currency(request.start_value, inputs.fx_start.rate);
        let local_end = calc::convert_to_currency(request.end_value, inputs.fx_end.rate);

        let nominal = calc::nominal_return(local_start, local_end)?;
        let fx_delta = calc::fx_delta(inputs.fx_start.rate, inputs.fx_end.rate);
        let inflation = calc::cumulative_inflation(inputs.cpi_start, inputs.cpi_end)?;
        let real = calc::real_return(nominal, inflation)?;
        let discounted = calc::discounted_value(local_end, inflation);

        let annualized = calc::annualized_inflation(inputs.cpi_start, inputs.cpi_end, years)?;
        let nominal_cagr = calc::nominal_cagr(local_start, local_end, years)?;
        let real_cagr = calc::real_cagr(nominal_cagr, annualized)?;

        Ok(CurrencyBreakdown {
            currency: info.code.to_string(),
            country: info.country.to_string(),
            start_value: local_start,
            end_value: local_end,
            fx_rate_start: inputs.fx_start.rate,
            fx_rate_end: inputs.fx_end.rate,
            cpi_start: inputs.cpi_start,
            cpi_end: inputs.cpi_end,
            fx_delta,
            nominal_return: nominal,
            cumulative_inflation: inflation,
            real_return: real,
            discounted_end_value: discounted,
            real_cagr,
            nominal_cagr: request.include_nominal_cagr.then_some(nominal_cagr),
            warnings: inputs.warnings,
        })
    }
}

/// Union preserving first-occurrence order.
fn merge_warnings(all: &mut Vec<String>, new: &[String]) {
    for warning in new {
        if !all.iter().any(|w| w == warning) {
            all.push(warning.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            start_date: date(2020, 3, 31),
            end_date: date(2023, 1, 31),
            start_value: 10000.0,
            end_value: 12064.0,
            base_currency: "USD".to_string(),
            currencies: vec!["EUR".to_string()],
            include_nominal_cagr: false,
        }
    }

    #[test]
    fn test_validate_accepts_good_request() {
        let currencies = AnalysisEngine::validate(&request()).unwrap();
        let codes: Vec<_> = currencies.iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["USD", "EUR"]);
    }

    #[test]
    fn test_validate_deduplicates_and_front_loads_base() {
        let mut req = request();
        req.currencies = vec!["EUR".into(), "USD".into(), "EUR".into(), "JPY".into()];
        let codes: Vec<_> = AnalysisEngine::validate(&req)
            .unwrap()
            .iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, vec!["USD", "EUR", "JPY"]);
    }

    #[test]
    fn test_validate_rejects_inverted_dates() {
        let mut req = request();
        req.end_date = date(2020, 1, 1);
        assert!(matches!(
            AnalysisEngine::validate(&req).unwrap_err(),
            AnalysisError::Validation(_)
        ));
    }

    #[test]
    fn test_validate_rejects_future_end_date() {
        let mut req = request();
        req.end_date = Utc::now().date_naive() + chrono::Duration::days(30);
        assert!(matches!(
            AnalysisEngine::validate(&req).unwrap_err(),
            AnalysisError::Validation(_)
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_values() {
        let mut req = request();
        req.start_value = 0.0;
        assert!(AnalysisEngine::validate(&req).is_err());

        let mut req = request();
        req.end_value = -5.0;
        assert!(AnalysisEngine::validate(&req).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_currency() {
        let mut req = request();
        req.currencies = vec!["XYZ".to_string()];
        let err = AnalysisEngine::validate(&req).unwrap_err();
        assert!(err.to_string().contains("XYZ"));

        let mut req = request();
        req.base_currency = "ZAR".to_string();
        assert!(AnalysisEngine::validate(&req).is_err());
    }

    #[test]
    fn test_merge_warnings_keeps_first_occurrence_order() {
        let mut all = Vec::new();
        merge_warnings(&mut all, &["a".into(), "b".into()]);
        merge_warnings(&mut all, &["b".into(), "c".into(), "a".into()]);
        assert_eq!(all, vec!["a", "b", "c"]);
    }
}
