//! Strategy families and the per-stream orchestrator.
//!
//! A strategy looks at closed candles and produces at most one candidate
//! signal per qualifying candle. It never creates or mutates orders; the
//! orchestrator (`instance`) validates candidates through the risk manager
//! and drives the order lifecycle.

pub mod breakout;
pub mod crossover;
pub mod divergence;
pub mod instance;

pub use breakout::BreakoutStrategy;
pub use crossover::CrossoverStrategy;
pub use divergence::DivergenceStrategy;
pub use instance::StrategyInstance;

use crate::config::{FamilyConfig, StrategyConfig};
use crate::domain::{Candle, Order, OrderKind, OrderSide};

/// A candidate trade produced by a strategy. Levels are proposals; the
/// risk manager has the final word.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub side: OrderSide,
    pub kind: OrderKind,
    pub entry: f64,
    pub sl: Option<f64>,
    pub tp: Option<f64>,
}

/// One strategy family instance bound to a single stream.
///
/// `update_indicators` runs on every closed candle, before any signal
/// evaluation, so buffers stay warm even while signals are suppressed.
pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    /// Bars of history needed before signals are meaningful.
    fn warmup_bars(&self) -> usize;

    fn update_indicators(&mut self, candle: &Candle, index: usize);

    /// Entry evaluation for the current candle.
    fn check_signal(&mut self, candle: &Candle, index: usize) -> Option<Signal>;

    /// Should this open position be closed, independent of sl/tp?
    fn check_close_signal(&mut self, order: &Order, candle: &Candle, index: usize) -> bool;

    /// Trailing-stop proposal for a filled order. The lifecycle ratchet
    /// clamps any loosening proposal, so implementations may be naive.
    fn trail_sl(&self, _order: &Order, _candle: &Candle, _index: usize) -> Option<f64> {
        None
    }

    /// Drop all accumulated state (stream rebuild).
    fn reset(&mut self);
}

/// Instantiate the family selected by the configuration.
pub fn build_strategy(cfg: &StrategyConfig) -> Box<dyn Strategy + Send> {
    match &cfg.family {
        FamilyConfig::Breakout { .. } => Box::new(BreakoutStrategy::new(cfg)),
        FamilyConfig::Divergence { .. } => Box::new(DivergenceStrategy::new(cfg)),
        FamilyConfig::Crossover { .. } => Box::new(CrossoverStrategy::new(cfg)),
    }
}
