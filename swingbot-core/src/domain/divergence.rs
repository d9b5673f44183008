//! Divergence events — price/indicator disagreement at matching swing points.

use super::swing::SwingPoint;
use serde::{Deserialize, Serialize};

/// The four divergence classes.
///
/// Regular divergences anticipate reversal; hidden divergences confirm
/// continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivergenceKind {
    /// Price lower-low, indicator higher-low (troughs).
    RegularBull,
    /// Price higher-high, indicator lower-high (peaks).
    RegularBear,
    /// Price higher-low, indicator lower-low (troughs).
    HiddenBull,
    /// Price lower-high, indicator higher-high (peaks).
    HiddenBear,
}

impl DivergenceKind {
    pub fn is_bullish(&self) -> bool {
        matches!(self, DivergenceKind::RegularBull | DivergenceKind::HiddenBull)
    }
}

/// A detected divergence between a same-kind swing pair and the indicator
/// samples at those points' candle indices.
///
/// Produced and consumed within one candle by the orchestrator; not retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceEvent {
    pub kind: DivergenceKind,
    /// (older, newer) price swing pair.
    pub price_pair: (SwingPoint, SwingPoint),
    /// Indicator samples at (older, newer) swing indices.
    pub indicator_pair: (f64, f64),
    /// |newer − older| / older × 100 on the price leg.
    pub delta_price_pct: f64,
    /// |newer − older| on the indicator leg.
    pub delta_indicator: f64,
}
