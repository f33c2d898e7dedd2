//! Supported currency registry.
//!
//! Each currency maps to the country whose CPI series measures its
//! purchasing power, and to the data source authoritative for that
//! country. Adding a currency means adding a row here; the resolvers
//! dispatch through this table and need no changes.

/// Which external source publishes a country's CPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpiSourceKind {
    Fred,
    Eurostat,
}

impl CpiSourceKind {
    pub fn name(self) -> &'static str {
        match self {
            CpiSourceKind::Fred => "FRED",
            CpiSourceKind::Eurostat => "Eurostat",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub country: &'static str,
    pub country_name: &'static str,
    pub cpi_source: CpiSourceKind,
    pub symbol: &'static str,
}

const REGISTRY: &[CurrencyInfo] = &[
    CurrencyInfo {
        code: "USD",
        country: "US",
        country_name: "United States",
        cpi_source: CpiSourceKind::Fred,
        symbol: "$",
    },
    CurrencyInfo {
        code: "EUR",
        country: "DE",
        country_name: "Germany",
        cpi_source: CpiSourceKind::Eurostat,
        symbol: "€",
    },
    CurrencyInfo {
        code: "GBP",
        country: "UK",
        country_name: "United Kingdom",
        cpi_source: CpiSourceKind::Eurostat,
        symbol: "£",
    },
    CurrencyInfo {
        code: "CHF",
        country: "CH",
        country_name: "Switzerland",
        cpi_source: CpiSourceKind::Eurostat,
        symbol: "Fr",
    },
    CurrencyInfo {
        code: "JPY",
        country: "JP",
        country_name: "Japan",
        cpi_source: CpiSourceKind::Eurostat,
        symbol: "¥",
    },
];

pub fn lookup(code: &str) -> Option<&'static CurrencyInfo> {
    REGISTRY.iter().find(|info| info.code == code)
}

pub fn supported_codes() -> Vec<&'static str> {
    REGISTRY.iter().map(|info| info.code).collect()
}

pub fn all() -> &'static [CurrencyInfo] {
    REGISTRY
}
