//! Exponential moving average.
//!
//! Seeded with the simple average of the first `period` inputs, then
//! smoothed with alpha = 2 / (period + 1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
    seed_sum: f64,
    seen: usize,
    current: f64,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            seed_sum: 0.0,
            seen: 0,
            current: f64::NAN,
        }
    }
}

impl Indicator for Ema {
    fn warmup(&self) -> usize {
        self.period
    }

    fn update(&mut self, value: f64) -> f64 {
        self.seen += 1;
        if self.seen < self.period {
            self.seed_sum += value;
            return f64::NAN;
        }
        if self.seen == self.period {
            self.seed_sum += value;
            self.current = self.seed_sum / self.period as f64;
            return self.current;
        }
        self.current = self.alpha * value + (1.0 - self.alpha) * self.current;
        self.current
    }

    fn reset(&mut self) {
        self.seed_sum = 0.0;
        self.seen = 0;
        self.current = f64::NAN;
    }
}
