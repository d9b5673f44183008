//! Simple moving average over a fixed rolling window.

use super::Indicator;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period + 1),
            sum: 0.0,
        }
    }
}

impl Indicator for Sma {
    fn warmup(&self) -> usize {
        self.period
    }

    fn update(&mut self, value: f64) -> f64 {
        self.window.push_back(value);
        self.sum += value;
        if self.window.len() > self.period {
            // Safe: len > period >= 1
            self.sum -= self.window.pop_front().unwrap();
        }
        if self.window.len() < self.period {
            f64::NAN
        } else {
            self.sum / self.period as f64
        }
    }

    fn reset(&mut self) {
        self.window.clear();
        self.sum = 0.0;
    }
}
