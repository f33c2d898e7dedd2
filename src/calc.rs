//! Pure return and inflation arithmetic.
//!
//! No I/O, no currency conversion: callers pass values already
//! converted into the currency under analysis. Domain violations are
//! internal-consistency faults and surface as [`AnalysisError::Domain`].

use crate::error::AnalysisError;
use chrono::NaiveDate;

/// Fractional years between two dates.
pub fn years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / 365.25
}

/// Convert a base-currency value using an FX rate (units of target per 1 base).
pub fn convert_to_currency(value_base: f64, fx_rate: f64) -> f64 {
    value_base * fx_rate
}

/// Total nominal return as a decimal (0.232 = 23.2%).
pub fn nominal_return(start_value: f64, end_value: f64) -> Result<f64, AnalysisError> {
    if start_value <= 0.0 {
        return Err(AnalysisError::Domain(format!(
            "nominal return requires a positive start value, got {start_value}"
        )));
    }
    Ok(end_value / start_value - 1.0)
}

/// Compound Annual Growth Rate.
pub fn nominal_cagr(start_value: f64, end_value: f64, years: f64) -> Result<f64, AnalysisError> {
    if years <= 0.0 {
        return Err(AnalysisError::Domain(format!(
            "CAGR requires a positive period, got {years} years"
        )));
    }
    if start_value <= 0.0 {
        return Err(AnalysisError::Domain(format!(
            "CAGR requires a positive start value, got {start_value}"
        )));
    }
    Ok((end_value / start_value).powf(1.0 / years) - 1.0)
}

/// Cumulative inflation as a decimal (0.074 = 7.4%).
pub fn cumulative_inflation(cpi_start: f64, cpi_end: f64) -> Result<f64, AnalysisError> {
    if cpi_start <= 0.0 {
        return Err(AnalysisError::Domain(format!(
            "inflation requires a positive starting CPI, got {cpi_start}"
        )));
    }
    Ok(cpi_end / cpi_start - 1.0)
}

/// Annualized inflation rate over a fractional-year period.
pub fn annualized_inflation(
    cpi_start: f64,
    cpi_end: f64,
    years: f64,
) -> Result<f64, AnalysisError> {
    if years <= 0.0 {
        return Err(AnalysisError::Domain(format!(
            "annualized inflation requires a positive period, got {years} years"
        )));
    }
    if cpi_start <= 0.0 {
        return Err(AnalysisError::Domain(format!(
            "annualized inflation requires a positive starting CPI, got {cpi_start}"
        )));
    }
    Ok((cpi_end / cpi_start).powf(1.0 / years) - 1.0)
}

/// Real return via the Fisher equation: (1 + nominal) / (1 + inflation) - 1.
pub fn real_return(nominal: f64, inflation: f64) -> Result<f64, AnalysisError> {
    if inflation <= -1.0 {
        return Err(AnalysisError::Domain(format!(
            "inflation of {inflation} makes the Fisher denominator non-positive"
        )));
    }
    Ok((1.0 + nominal) / (1.0 + inflation) - 1.0)
}

/// Real CAGR: Fisher equation applied to annualized rates.
pub fn real_cagr(nominal_cagr: f64, annualized_inflation: f64) -> Result<f64, AnalysisError> {
    real_return(nominal_cagr, annualized_inflation)
}

/// Discount an end value back to start-date purchasing power.
pub fn discounted_value(end_value: f64, cumulative_inflation: f64) -> f64 {
    end_value / (1.0 + cumulative_inflation)
}

/// Change in the FX rate over the period. Negative means the base
/// currency weakened against the target.
pub fn fx_delta(fx_start: f64, fx_end: f64) -> f64 {
    fx_end / fx_start - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_years_between() {
        assert!(approx(
            years_between(date(2023, 3, 31), date(2026, 1, 31)),
            2.84,
            0.01
        ));
        assert!(approx(
            years_between(date(2023, 1, 1), date(2024, 1, 1)),
            1.0,
            0.01
        ));
        assert_eq!(years_between(date(2023, 1, 1), date(2023, 1, 1)), 0.0);
    }

    #[test]
    fn test_nominal_return() {
        assert!(approx(nominal_return(1000.0, 1200.0).unwrap(), 0.20, 1e-9));
        assert_eq!(nominal_return(100.0, 100.0).unwrap(), 0.0);
        assert!(approx(nominal_return(100.0, 80.0).unwrap(), -0.20, 1e-9));
        assert!(nominal_return(0.0, 100.0).is_err());
        assert!(nominal_return(-5.0, 100.0).is_err());
    }

    #[test]
    fn test_nominal_return_roundtrips() {
        let (start, end) = (10000.0, 12064.0);
        let r = nominal_return(start, end).unwrap();
        assert!(approx(start * (1.0 + r), end, 1e-6));
        assert!(approx(r, 0.2064, 1e-9));
    }

    #[test]
    fn test_nominal_cagr() {
        // 100 to 121 in 2 years = 10% CAGR
        assert!(approx(nominal_cagr(100.0, 121.0, 2.0).unwrap(), 0.10, 1e-9));
        assert!(nominal_cagr(100.0, 110.0, 0.0).is_err());
        assert!(nominal_cagr(0.0, 110.0, 2.0).is_err());
    }

    #[test]
    fn test_cumulative_inflation() {
        assert!(approx(
            cumulative_inflation(100.0, 107.4).unwrap(),
            0.074,
            1e-9
        ));
        assert!(cumulative_inflation(0.0, 107.4).is_err());
    }

    #[test]
    fn test_annualized_inflation() {
        let r = annualized_inflation(100.0, 110.0, 2.0).unwrap();
        assert!(approx(r, (110.0f64 / 100.0).powf(0.5) - 1.0, 1e-12));
        assert!(annualized_inflation(100.0, 110.0, 0.0).is_err());
    }

    #[test]
    fn test_real_return_fisher() {
        // 20.64% nominal with 7.4% inflation → ~12.34% real
        let r = real_return(0.2064, 0.074).unwrap();
        assert!(approx(r, 1.2064 / 1.074 - 1.0, 1e-12));
        assert!(approx(r, 0.1234, 5e-4));

        assert!(approx(real_return(0.10, 0.0).unwrap(), 0.10, 1e-12));
        assert!(approx(real_return(0.05, 0.05).unwrap(), 0.0, 1e-12));
        assert!(real_return(0.10, -1.0).is_err());
        assert!(real_return(0.10, -1.5).is_err());
    }

    #[test]
    fn test_real_cagr_matches_fisher() {
        let r = real_cagr(0.08, 0.03).unwrap();
        assert!(approx(r, 1.08 / 1.03 - 1.0, 1e-12));
    }

    #[test]
    fn test_discounted_value() {
        assert!(approx(discounted_value(1074.0, 0.074), 1000.0, 1e-9));
    }

    #[test]
    fn test_fx_delta() {
        assert!(approx(fx_delta(0.920, 0.833), -0.0946, 1e-3));
        assert_eq!(fx_delta(1.0, 1.0), 0.0);
    }

    #[test]
    fn test_convert_to_currency() {
        assert!(approx(convert_to_currency(100.0, 0.92), 92.0, 1e-12));
        assert_eq!(convert_to_currency(1000.0, 1.0), 1000.0);
    }
}
