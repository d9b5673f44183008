//! Per-stream strategy orchestrator.
//!
//! One instance per (symbol, timeframe, configuration). Each closed candle
//! flows through a fixed sequence: stream-health check, indicator/swing
//! update, lifecycle advance, trailing stops, close signals, entry signal.
//! The instance never mutates orders directly; every change goes through
//! the lifecycle's operations, and the resulting events are returned to
//! the caller in occurrence order.
//!
//! A non-monotonic or missing candle marks the stream stale: strategy
//! state resets and signal evaluation stays suppressed until a fresh
//! warmup window of candles has been absorbed. Order management continues
//! through the stale window; open positions still need their exits.

use super::{build_strategy, Strategy};
use crate::config::StrategyConfig;
use crate::domain::{Candle, Order, OrderId, OrderKind, OrderStatus};
use crate::orders::{LifecycleConfig, OrderEvent, OrderLifecycle};
use crate::risk::{self, RiskProfile, RiskReject};
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

pub struct StrategyInstance {
    symbol: String,
    cfg: StrategyConfig,
    tag: String,
    strategy: Box<dyn Strategy + Send>,
    lifecycle: OrderLifecycle,
    risk: RiskProfile,
    next_index: usize,
    last_time: Option<NaiveDateTime>,
    /// Signals are suppressed below this index (warmup or rebuild).
    quiet_until: usize,
}

impl StrategyInstance {
    pub fn new(symbol: impl Into<String>, cfg: StrategyConfig) -> Self {
        let tag = cfg.strategy_tag();
        let strategy = build_strategy(&cfg);
        let quiet_until = strategy.warmup_bars();
        let lifecycle = OrderLifecycle::new(LifecycleConfig {
            max_pending_bars: cfg.max_pending_bars,
        });
        let risk = cfg.risk_profile();
        Self {
            symbol: symbol.into(),
            cfg,
            tag,
            strategy,
            lifecycle,
            risk,
            next_index: 0,
            last_time: None,
            quiet_until,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn strategy_tag(&self) -> &str {
        &self.tag
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.cfg
    }

    pub fn lifecycle(&self) -> &OrderLifecycle {
        &self.lifecycle
    }

    /// Process one closed candle; returns lifecycle events in order.
    pub fn on_candle(&mut self, candle: &Candle) -> Vec<OrderEvent> {
        if !candle.is_sane() {
            warn!(
                symbol = %self.symbol,
                tag = %self.tag,
                time = %candle.time,
                "dropping malformed candle"
            );
            return Vec::new();
        }

        let index = self.next_index;
        self.next_index += 1;

        if let Some(last) = self.last_time {
            let expected = last + self.cfg.tf.duration();
            if candle.time != expected {
                if candle.time <= last {
                    warn!(
                        symbol = %self.symbol,
                        tag = %self.tag,
                        last = %last,
                        got = %candle.time,
                        "non-monotonic candle"
                    );
                }
                info!(
                    symbol = %self.symbol,
                    tag = %self.tag,
                    expected = %expected,
                    got = %candle.time,
                    "stream stale, rebuilding strategy state"
                );
                self.strategy.reset();
                self.quiet_until = index + self.strategy.warmup_bars();
            }
        }
        self.last_time = Some(candle.time);

        self.strategy.update_indicators(candle, index);
        let mut events = self.lifecycle.on_candle(candle, index);

        let filled: Vec<Order> = self.lifecycle.filled_orders().cloned().collect();

        for order in &filled {
            if self.lifecycle.order(order.id).is_none() {
                continue;
            }
            if let Some(proposal) = self.strategy.trail_sl(order, candle, index) {
                match self.lifecycle.adjust_sl(order.id, proposal) {
                    Ok(OrderEvent::SlAdjusted { from, to, id }) if (to - from).abs() > f64::EPSILON => {
                        events.push(OrderEvent::SlAdjusted { from, to, id });
                    }
                    Ok(_) => {}
                    Err(err) => warn!(%err, "trailing adjustment refused"),
                }
            }
        }

        for order in &filled {
            if self.lifecycle.order(order.id).is_none() {
                continue;
            }
            if self.strategy.check_close_signal(order, candle, index) {
                match self.lifecycle.stop(order.id, candle.close, "strategy close", index) {
                    Ok(ev) => events.push(ev),
                    Err(err) => warn!(%err, "close signal refused"),
                }
            }
        }

        if index >= self.quiet_until {
            if let Some(signal) = self.strategy.check_signal(candle, index) {
                let candidate = Order {
                    id: OrderId(0),
                    side: signal.side,
                    kind: signal.kind,
                    entry: signal.entry,
                    sl: signal.sl,
                    tp: signal.tp,
                    volume: self.cfg.volume,
                    status: match signal.kind {
                        OrderKind::Market => OrderStatus::Filled,
                        OrderKind::Limit => OrderStatus::Pending,
                    },
                    strategy_tag: self.tag.clone(),
                    created_index: index,
                    created_time: candle.time,
                };
                match risk::fix(candidate, &self.risk) {
                    Ok(order) => {
                        let (_, submit_events) = self.lifecycle.submit(order, index);
                        events.extend(submit_events);
                    }
                    // Already logged as an invariant violation by the
                    // risk manager.
                    Err(RiskReject::InvalidLevels(_)) => {}
                    Err(reject) => {
                        debug!(tag = %self.tag, %reject, "candidate rejected");
                    }
                }
            }
        }

        events
    }
}
