//! Swingbot Core — signal detection and risk-managed order engine.
//!
//! This crate contains the per-stream trading engine:
//! - Domain types (candles, swing points, trend lines, divergences, orders)
//! - Streaming zigzag swing-point extraction and trend-line fitting
//! - Incremental indicator buffers (SMA/EMA/RSI/MACD)
//! - Divergence detection over same-kind swing pairs
//! - Breakout candle validation
//! - Risk manager (stop-loss cap, reward floors, fix modes)
//! - Order lifecycle state machine with audit trail and archive
//! - Three strategy families behind one trait, orchestrated per stream

pub mod breakout;
pub mod config;
pub mod divergence;
pub mod domain;
pub mod indicators;
pub mod orders;
pub mod risk;
pub mod strategy;
pub mod swings;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a runner fans out across threads is
    /// Send + Sync. If any type regresses, the build breaks immediately.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::Timeframe>();
        require_sync::<domain::Timeframe>();
        require_send::<domain::SwingPoint>();
        require_sync::<domain::SwingPoint>();
        require_send::<domain::TrendLine>();
        require_sync::<domain::TrendLine>();
        require_send::<domain::DivergenceEvent>();
        require_sync::<domain::DivergenceEvent>();
        require_send::<domain::Order>();
        require_sync::<domain::Order>();
        require_send::<domain::OrderId>();
        require_sync::<domain::OrderId>();

        // Engine state
        require_send::<swings::ZigZag>();
        require_sync::<swings::ZigZag>();
        require_send::<indicators::IndicatorSeries>();
        require_sync::<indicators::IndicatorSeries>();
        require_send::<orders::OrderLifecycle>();
        require_sync::<orders::OrderLifecycle>();
        require_send::<orders::OrderEvent>();
        require_sync::<orders::OrderEvent>();

        // Configuration
        require_send::<config::StrategyConfig>();
        require_sync::<config::StrategyConfig>();
        require_send::<risk::RiskProfile>();
        require_sync::<risk::RiskProfile>();

        // The orchestrator itself moves between rayon workers.
        require_send::<strategy::StrategyInstance>();
    }

    /// Architecture contract: strategies cannot touch the lifecycle.
    ///
    /// `check_signal` takes only the candle and index — no lifecycle, no
    /// order collection. Order creation and mutation happen exclusively in
    /// the orchestrator through lifecycle operations. If the trait ever
    /// grows a lifecycle parameter, this stops compiling.
    #[test]
    fn strategies_have_no_lifecycle_access() {
        fn _check_trait_object_builds(
            s: &mut dyn strategy::Strategy,
            candle: &domain::Candle,
        ) -> Option<strategy::Signal> {
            s.check_signal(candle, 0)
        }
    }
}
