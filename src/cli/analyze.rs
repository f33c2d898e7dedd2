//! Rendering of analysis results as table, JSON or CSV.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cli::ui;
use crate::core::model::Analysis;
use crate::core::registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Format a decimal as a percentage with one decimal place.
fn fmt_pct(val: f64, plus_sign: bool) -> String {
    let pct = val * 100.0;
    if plus_sign && pct > 0.0 {
        format!("+{pct:.1}%")
    } else {
        format!("{pct:.1}%")
    }
}

/// Format a number with a K/M/B suffix, max 3 digits left of the decimal.
fn fmt_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{value:.2}")
    }
}

fn fmt_currency_value(value: f64, currency: &str) -> String {
    let prefix = registry::lookup(currency)
        .map(|info| info.symbol.to_string())
        .unwrap_or_else(|| format!("{currency} "));
    format!("{prefix}{}", fmt_number(value))
}

pub fn render_table(analysis: &Analysis, show_cagr: bool) -> String {
    let p = &analysis.period;
    let mut output = format!(
        "{}\nPeriod: {} → {} ({:.2} years)\nBase currency: {}\n\n",
        ui::style_text("Multi-Currency Real Return Analysis", ui::StyleType::Title),
        p.start_date,
        p.end_date,
        p.years,
        analysis.base_currency
    );

    let mut table = ui::new_styled_table();
    let mut header = vec![
        ui::header_cell("Currency"),
        ui::header_cell("Start Value"),
        ui::header_cell("End Value"),
        ui::header_cell("Disc. Value"),
        ui::header_cell("Nominal"),
        ui::header_cell("Real"),
        ui::header_cell("Real CAGR"),
        ui::header_cell("FX Δ"),
        ui::header_cell("Inflation"),
    ];
    if show_cagr {
        header.push(ui::header_cell("Nom CAGR"));
    }
    table.set_header(header);

    for r in &analysis.currencies {
        let fx_cell = if r.currency == analysis.base_currency {
            ui::na_cell()
        } else {
            ui::change_cell(&fmt_pct(r.fx_delta, true), r.fx_delta >= 0.0)
        };
        let mut row = vec![
            comfy_table::Cell::new(&r.currency),
            ui::value_cell(&fmt_currency_value(r.start_value, &r.currency)),
            ui::value_cell(&fmt_currency_value(r.end_value, &r.currency)),
            ui::value_cell(&fmt_currency_value(r.discounted_end_value, &r.currency)),
            ui::change_cell(&fmt_pct(r.nominal_return, true), r.nominal_return >= 0.0),
            ui::change_cell(&fmt_pct(r.real_return, true), r.real_return >= 0.0),
            ui::change_cell(&fmt_pct(r.real_cagr, true), r.real_cagr >= 0.0),
            fx_cell,
            ui::value_cell(&fmt_pct(r.cumulative_inflation, false)),
        ];
        if show_cagr {
            row.push(match r.nominal_cagr {
                Some(cagr) => ui::change_cell(&fmt_pct(cagr, true), cagr >= 0.0),
                None => ui::na_cell(),
            });
        }
        table.add_row(row);
    }

    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{}",
        ui::style_text(
            "Data sources: FX via Frankfurter, CPI via Eurostat/FRED",
            ui::StyleType::Subtle
        )
    ));

    if !analysis.warnings.is_empty() {
        output.push_str("\n\nWarnings:");
        for w in &analysis.warnings {
            output.push_str(&format!(
                "\n  {}",
                ui::style_text(&format!("⚠ {w}"), ui::StyleType::Warning)
            ));
        }
    }
    output.push('\n');
    output
}

pub fn render_json(analysis: &Analysis) -> Result<String> {
    #[derive(Serialize)]
    struct DataSources {
        fx: &'static str,
        cpi: BTreeMap<String, &'static str>,
    }

    #[derive(Serialize)]
    struct JsonOutput<'a> {
        #[serde(flatten)]
        analysis: &'a Analysis,
        data_sources: DataSources,
    }

    let cpi = analysis
        .currencies
        .iter()
        .filter_map(|r| registry::lookup(&r.currency))
        .map(|info| (info.country.to_string(), info.cpi_source.name()))
        .collect();

    Ok(serde_json::to_string_pretty(&JsonOutput {
        analysis,
        data_sources: DataSources {
            fx: "Frankfurter",
            cpi,
        },
    })?)
}

pub fn render_csv(analysis: &Analysis, show_cagr: bool) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![
        "currency",
        "country",
        "start_value",
        "end_value",
        "discounted_end_value",
        "fx_rate_start",
        "fx_rate_end",
        "fx_delta_pct",
        "nominal_return_pct",
        "cumulative_inflation_pct",
        "real_return_pct",
        "real_cagr_pct",
    ];
    if show_cagr {
        header.push("nominal_cagr_pct");
    }
    writer.write_record(&header)?;

    for r in &analysis.currencies {
        let mut record = vec![
            r.currency.clone(),
            r.country.clone(),
            format!("{:.2}", r.start_value),
            format!("{:.2}", r.end_value),
            format!("{:.2}", r.discounted_end_value),
            format!("{:.4}", r.fx_rate_start),
            format!("{:.4}", r.fx_rate_end),
            format!("{:.2}", r.fx_delta * 100.0),
            format!("{:.2}", r.nominal_return * 100.0),
            format!("{:.2}", r.cumulative_inflation * 100.0),
            format!("{:.2}", r.real_return * 100.0),
            format!("{:.2}", r.real_cagr * 100.0),
        ];
        if show_cagr {
            record.push(
                r.nominal_cagr
                    .map(|c| format!("{:.2}", c * 100.0))
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&record)?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{AnalysisPeriod, CurrencyBreakdown};
    use chrono::NaiveDate;

    fn sample_analysis() -> Analysis {
        Analysis {
            period: AnalysisPeriod {
                start_date: NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
                years: 2.84,
            },
            base_currency: "USD".to_string(),
            start_value: 10000.0,
            end_value: 12064.0,
            currencies: vec![
                CurrencyBreakdown {
                    currency: "USD".to_string(),
                    country: "US".to_string(),
                    start_value: 10000.0,
                    end_value: 12064.0,
                    fx_rate_start: 1.0,
                    fx_rate_end: 1.0,
                    cpi_start: 301.8,
                    cpi_end: 324.1,
                    fx_delta: 0.0,
                    nominal_return: 0.2064,
                    cumulative_inflation: 0.074,
                    real_return: 0.1234,
                    discounted_end_value: 11232.8,
                    real_cagr: 0.0418,
                    nominal_cagr: None,
                    warnings: vec![],
                },
                CurrencyBreakdown {
                    currency: "EUR".to_string(),
                    country: "DE".to_string(),
                    start_value: 9201.0,
                    end_value: 10430.0,
                    fx_rate_start: 0.9201,
                    fx_rate_end: 0.8646,
                    cpi_start: 118.9,
                    cpi_end: 126.4,
                    fx_delta: -0.0603,
                    nominal_return: 0.1336,
                    cumulative_inflation: 0.0631,
                    real_return: 0.0663,
                    discounted_end_value: 9811.0,
                    real_cagr: 0.0229,
                    nominal_cagr: Some(0.0452),
                    warnings: vec!["Using bundled fallback CPI data for DE".to_string()],
                },
            ],
            warnings: vec!["Using bundled fallback CPI data for DE".to_string()],
        }
    }

    #[test]
    fn test_fmt_pct() {
        assert_eq!(fmt_pct(0.2064, true), "+20.6%");
        assert_eq!(fmt_pct(-0.0603, true), "-6.0%");
        assert_eq!(fmt_pct(0.074, false), "7.4%");
    }

    #[test]
    fn test_fmt_number_suffixes() {
        assert_eq!(fmt_number(932.5), "932.50");
        assert_eq!(fmt_number(10432.1), "10.43K");
        assert_eq!(fmt_number(2_500_000.0), "2.50M");
        assert_eq!(fmt_number(-1_200_000_000.0), "-1.20B");
    }

    #[test]
    fn test_fmt_currency_value_uses_symbol() {
        assert_eq!(fmt_currency_value(10000.0, "USD"), "$10.00K");
        assert_eq!(fmt_currency_value(500.0, "EUR"), "€500.00");
    }

    #[test]
    fn test_render_table_contains_key_fields() {
        let rendered = render_table(&sample_analysis(), false);
        assert!(rendered.contains("2023-03-31"));
        assert!(rendered.contains("USD"));
        assert!(rendered.contains("EUR"));
        assert!(rendered.contains("+20.6%"));
        assert!(rendered.contains("bundled fallback"));
        assert!(!rendered.contains("Nom CAGR"));
    }

    #[test]
    fn test_render_table_with_cagr_column() {
        let rendered = render_table(&sample_analysis(), true);
        assert!(rendered.contains("Nom CAGR"));
    }

    #[test]
    fn test_render_json_shape() {
        let json = render_json(&sample_analysis()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["base_currency"], "USD");
        assert_eq!(value["currencies"].as_array().unwrap().len(), 2);
        assert_eq!(value["data_sources"]["cpi"]["US"], "FRED");
        assert_eq!(value["data_sources"]["cpi"]["DE"], "Eurostat");
        // nominal_cagr omitted when not requested
        assert!(value["currencies"][0].get("nominal_cagr").is_none());
        assert!(value["currencies"][1].get("nominal_cagr").is_some());
    }

    #[test]
    fn test_render_csv_rows() {
        let csv_out = render_csv(&sample_analysis(), false).unwrap();
        let mut lines = csv_out.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("currency,country,start_value"));
        assert!(!header.contains("nominal_cagr_pct"));
        assert_eq!(lines.count(), 2);

        let with_cagr = render_csv(&sample_analysis(), true).unwrap();
        assert!(with_cagr.lines().next().unwrap().contains("nominal_cagr_pct"));
    }
}
