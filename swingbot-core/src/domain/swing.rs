//! Swing points and trend lines — the market-structure vocabulary.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Whether a swing point is a local maximum or minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwingKind {
    Peak,
    Trough,
}

impl SwingKind {
    pub fn opposite(&self) -> SwingKind {
        match self {
            SwingKind::Peak => SwingKind::Trough,
            SwingKind::Trough => SwingKind::Peak,
        }
    }
}

/// A confirmed price extreme.
///
/// `index` is the absolute candle index within the stream; confirmed
/// sequences strictly alternate kind and are never retroactively mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
    pub kind: SwingKind,
    pub time: NaiveDateTime,
}

/// A line fitted through a window of swing points.
///
/// `fit_ratio` is the fraction of window points lying within a tolerance
/// band of the line (not raw R², to keep it directly comparable against
/// `min_updown_ratio`). Derived state: recomputed whenever the underlying
/// window changes, never persisted independently of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    pub fit_ratio: f64,
    pub first: SwingPoint,
    pub last: SwingPoint,
}

impl TrendLine {
    /// Projected price at an arbitrary candle index.
    pub fn value_at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    pub fn is_rising(&self) -> bool {
        self.slope > 0.0
    }
}
