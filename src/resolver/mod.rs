//! Fallback-chain resolvers for CPI values and FX rates.

pub mod cpi;
pub mod fx;

pub use cpi::CpiResolver;
pub use fx::{FxResolver, ResolvedRate};
