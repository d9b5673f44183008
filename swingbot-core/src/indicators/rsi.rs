//! Relative Strength Index with Wilder smoothing, maintained incrementally.
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge cases: avg_loss == 0 → 100; avg_gain == 0 → 0; no movement → 50.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev_close: Option<f64>,
    /// Changes accumulated while seeding the first average.
    seed_changes: Vec<f64>,
    avg_gain: f64,
    avg_loss: f64,
    seeded: bool,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            prev_close: None,
            seed_changes: Vec::with_capacity(period),
            avg_gain: 0.0,
            avg_loss: 0.0,
            seeded: false,
        }
    }

    fn value(&self) -> f64 {
        if self.avg_loss == 0.0 && self.avg_gain == 0.0 {
            50.0 // no movement
        } else if self.avg_loss == 0.0 {
            100.0
        } else if self.avg_gain == 0.0 {
            0.0
        } else {
            100.0 - 100.0 / (1.0 + self.avg_gain / self.avg_loss)
        }
    }
}

impl Indicator for Rsi {
    fn warmup(&self) -> usize {
        self.period + 1
    }

    fn update(&mut self, close: f64) -> f64 {
        let prev = match self.prev_close.replace(close) {
            Some(p) => p,
            None => return f64::NAN,
        };
        let change = close - prev;

        if !self.seeded {
            self.seed_changes.push(change);
            if self.seed_changes.len() < self.period {
                return f64::NAN;
            }
            // Seed: average gain/loss over the first `period` changes
            for &ch in &self.seed_changes {
                if ch > 0.0 {
                    self.avg_gain += ch;
                } else {
                    self.avg_loss -= ch;
                }
            }
            self.avg_gain /= self.period as f64;
            self.avg_loss /= self.period as f64;
            self.seeded = true;
            return self.value();
        }

        // Wilder smoothing
        let alpha = 1.0 / self.period as f64;
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };
        self.avg_gain = alpha * gain + (1.0 - alpha) * self.avg_gain;
        self.avg_loss = alpha * loss + (1.0 - alpha) * self.avg_loss;
        self.value()
    }

    fn reset(&mut self) {
        self.prev_close = None;
        self.seed_changes.clear();
        self.avg_gain = 0.0;
        self.avg_loss = 0.0;
        self.seeded = false;
    }
}
