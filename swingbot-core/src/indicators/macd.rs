//! MACD — fast EMA minus slow EMA, with a signal EMA over the line.
//!
//! Emits a (line, signal, histogram) triple per update. The line is NaN
//! until the slow EMA seeds; the signal needs `signal_period` line values
//! on top of that.

use super::{Ema, Indicator};
use serde::{Deserialize, Serialize};

/// One MACD sample. Fields are NaN during their respective warmups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdSample {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl MacdSample {
    pub fn is_complete(&self) -> bool {
        !self.line.is_nan() && !self.signal.is_nan()
    }
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        assert!(
            fast_period < slow_period,
            "MACD fast period must be < slow period"
        );
        Self {
            fast: Ema::new(fast_period),
            slow: Ema::new(slow_period),
            signal: Ema::new(signal_period),
            slow_period,
            signal_period,
        }
    }

    /// Standard 12/26/9 parameterization.
    pub fn default_params() -> Self {
        Self::new(12, 26, 9)
    }

    pub fn warmup(&self) -> usize {
        self.slow_period + self.signal_period
    }

    pub fn update(&mut self, close: f64) -> MacdSample {
        let fast = self.fast.update(close);
        let slow = self.slow.update(close);

        if fast.is_nan() || slow.is_nan() {
            return MacdSample {
                line: f64::NAN,
                signal: f64::NAN,
                histogram: f64::NAN,
            };
        }

        let line = fast - slow;
        let signal = self.signal.update(line);
        let histogram = if signal.is_nan() {
            f64::NAN
        } else {
            line - signal
        };
        MacdSample {
            line,
            signal,
            histogram,
        }
    }

    pub fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.signal.reset();
    }
}
