//! Presentation layer: rendering and terminal styling.

pub mod analyze;
pub mod cache;
pub mod ui;
