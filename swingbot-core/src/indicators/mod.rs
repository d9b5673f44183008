//! Incrementally maintained indicator buffers.
//!
//! Each indicator consumes one value per closed candle and emits one sample
//! per update, `NaN` until its warmup window has filled. Samples are
//! append-only and keyed by candle index via [`IndicatorSeries`], so
//! divergence detection can look values up at swing-point indices.
//!
//! `reset()` discards all state — used when a data gap marks the stream
//! stale and the buffers must rebuild from fresh history.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::Ema;
pub use macd::{Macd, MacdSample};
pub use rsi::Rsi;
pub use sma::Sma;

/// A scalar indicator updated one value at a time.
pub trait Indicator {
    /// Number of inputs consumed before output becomes non-NaN.
    fn warmup(&self) -> usize;

    /// Feed the next input; returns the indicator value or NaN during warmup.
    fn update(&mut self, value: f64) -> f64;

    /// Discard all state (stream rebuild after a gap).
    fn reset(&mut self);
}

/// Append-only per-candle sample series, keyed by absolute candle index.
///
/// One value is pushed per closed candle, NaN during warmup. Lookup by
/// index returns `None` for NaN or out-of-range samples so callers never
/// compare against warmup garbage.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSeries {
    values: Vec<f64>,
}

impl IndicatorSeries {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Store the sample for candle `index`, NaN-padding any skipped
    /// history. After a stream rebuild the first recorded index picks up
    /// wherever the orchestrator's count is; lookups below it miss, so
    /// pre-gap swing points can never pair with post-gap samples.
    pub fn record(&mut self, index: usize, value: f64) {
        if index >= self.values.len() {
            self.values.resize(index + 1, f64::NAN);
        }
        self.values[index] = value;
    }

    /// Sample at `index`, or `None` if out of range or still NaN.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().filter(|v| !v.is_nan())
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().filter(|v| !v.is_nan())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {expected}, got {actual}"
    );
}
