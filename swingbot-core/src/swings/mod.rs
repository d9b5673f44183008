//! Swing-point extraction and trend-line fitting.

pub mod extractor;
pub mod trendline;

pub use extractor::{ZigZag, ZigZagConfig, ZigZagMode};
pub use trendline::{confirm_trend, fit_kind_line, fit_line, TrendConfig};
