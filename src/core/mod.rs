//! Core business logic abstractions

pub mod cpi;
pub mod fx;
pub mod log;
pub mod model;
pub mod registry;
pub mod series;

// Re-export main types for cleaner imports
pub use cpi::{CpiSource, DataTier, DateWindow, ResolvedCpi};
pub use fx::{FxQuote, FxSource};
pub use model::{Analysis, AnalysisPeriod, CurrencyBreakdown};
pub use series::{MatchKind, MonthKey, MonthMatch, TimeSeries};
