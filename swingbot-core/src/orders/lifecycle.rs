//! The order lifecycle state machine.
//!
//! Owns every order after creation. Strategies and the orchestrator never
//! mutate an order directly; they call `submit`, `on_candle`, `adjust_sl`,
//! `stop` and `cancel`, and each resulting transition is appended to an
//! audit trail. Terminal orders move to the closed archive with their exit
//! price and realized PnL and are never touched again.
//!
//! Status graph: `Pending → Filled → { HitSl, HitTp, Stopped }`, with
//! `Cancelled` reachable only from `Pending`. Market orders enter `Filled`
//! directly. When one candle's range touches both sl and tp, the stop loss
//! wins.

use crate::domain::{Candle, Order, OrderId, OrderKind, OrderSide, OrderStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Bars a limit order may sit unfilled before auto-cancel; 0 disables.
    pub max_pending_bars: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_pending_bars: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("unknown or already archived order {0}")]
    UnknownOrder(OrderId),

    #[error("order {id} is {status:?}; operation requires {expected}")]
    InvalidState {
        id: OrderId,
        status: OrderStatus,
        expected: &'static str,
    },
}

/// One recorded state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub index: usize,
    pub reason: String,
}

/// A terminally closed order with its realized outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedOrder {
    pub order: Order,
    pub exit_price: f64,
    pub pnl: f64,
    pub closed_index: usize,
}

/// What happened to orders during one lifecycle operation. Consumed by the
/// runner to drive OMS calls and stats.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    Created { id: OrderId },
    Filled { id: OrderId, index: usize },
    SlAdjusted { id: OrderId, from: f64, to: f64 },
    Closed {
        id: OrderId,
        status: OrderStatus,
        exit_price: f64,
        pnl: f64,
    },
    Cancelled { id: OrderId, reason: String },
}

#[derive(Debug)]
pub struct OrderLifecycle {
    cfg: LifecycleConfig,
    next_id: u64,
    open: Vec<Order>,
    closed: Vec<ClosedOrder>,
    audit: Vec<TransitionRecord>,
}

impl OrderLifecycle {
    pub fn new(cfg: LifecycleConfig) -> Self {
        Self {
            cfg,
            next_id: 1,
            open: Vec::new(),
            closed: Vec::new(),
            audit: Vec::new(),
        }
    }

    fn record(&mut self, id: OrderId, from: OrderStatus, to: OrderStatus, index: usize, reason: &str) {
        debug!(%id, ?from, ?to, index, reason, "order transition");
        self.audit.push(TransitionRecord {
            id,
            from,
            to,
            index,
            reason: reason.to_string(),
        });
    }

    fn position(&self, id: OrderId) -> Option<usize> {
        self.open.iter().position(|o| o.id == id)
    }

    fn archive(&mut self, pos: usize, exit_price: f64, index: usize) -> ClosedOrder {
        let order = self.open.remove(pos);
        let pnl = match order.status {
            // A cancelled order never held a position.
            OrderStatus::Cancelled { .. } => 0.0,
            _ => order.pnl(exit_price),
        };
        let closed = ClosedOrder {
            order,
            exit_price,
            pnl,
            closed_index: index,
        };
        self.closed.push(closed.clone());
        closed
    }

    /// Register a risk-accepted order. Market orders enter `Filled`, limit
    /// orders `Pending`. The lifecycle assigns the final id.
    pub fn submit(&mut self, mut order: Order, index: usize) -> (OrderId, Vec<OrderEvent>) {
        let id = OrderId(self.next_id);
        self.next_id += 1;
        order.id = id;

        let mut events = vec![OrderEvent::Created { id }];
        match order.kind {
            OrderKind::Market => {
                // Created directly in Filled; it was never pending.
                order.status = OrderStatus::Filled;
                self.record(id, OrderStatus::Filled, OrderStatus::Filled, index, "market fill");
                events.push(OrderEvent::Filled { id, index });
            }
            OrderKind::Limit => {
                order.status = OrderStatus::Pending;
                self.record(id, OrderStatus::Pending, OrderStatus::Pending, index, "submitted");
            }
        }
        self.open.push(order);
        (id, events)
    }

    /// Advance every open order by one closed candle: limit fills, pending
    /// timeouts, and sl/tp exits. The stop loss wins when both levels are
    /// touched by the same candle.
    pub fn on_candle(&mut self, candle: &Candle, index: usize) -> Vec<OrderEvent> {
        let mut events = Vec::new();
        let mut i = 0;
        while i < self.open.len() {
            let id = self.open[i].id;

            if self.open[i].status == OrderStatus::Pending {
                let entry = self.open[i].entry;
                if candle.touches(entry) {
                    self.open[i].status = OrderStatus::Filled;
                    self.record(id, OrderStatus::Pending, OrderStatus::Filled, index, "limit fill");
                    events.push(OrderEvent::Filled { id, index });
                } else {
                    let age = index.saturating_sub(self.open[i].created_index);
                    if self.cfg.max_pending_bars > 0 && age >= self.cfg.max_pending_bars {
                        let reason = format!("unfilled for {age} bars");
                        self.open[i].status = OrderStatus::Cancelled {
                            reason: reason.clone(),
                        };
                        self.record(
                            id,
                            OrderStatus::Pending,
                            self.open[i].status.clone(),
                            index,
                            &reason,
                        );
                        events.push(OrderEvent::Cancelled { id, reason });
                        self.archive(i, entry, index);
                        continue;
                    }
                    i += 1;
                    continue;
                }
            }

            // Filled (possibly just now): check exits, sl before tp.
            let order = &self.open[i];
            let sl_hit = order.sl.map(|sl| candle.touches(sl)).unwrap_or(false);
            let tp_hit = order.tp.map(|tp| candle.touches(tp)).unwrap_or(false);
            let exit = if sl_hit {
                Some((OrderStatus::HitSl, order.sl.unwrap_or_default()))
            } else if tp_hit {
                Some((OrderStatus::HitTp, order.tp.unwrap_or_default()))
            } else {
                None
            };

            match exit {
                Some((status, price)) => {
                    self.open[i].status = status.clone();
                    let reason = match status {
                        OrderStatus::HitSl => "stop loss touched",
                        _ => "take profit touched",
                    };
                    self.record(id, OrderStatus::Filled, status.clone(), index, reason);
                    let closed = self.archive(i, price, index);
                    events.push(OrderEvent::Closed {
                        id,
                        status,
                        exit_price: price,
                        pnl: closed.pnl,
                    });
                }
                None => i += 1,
            }
        }
        events
    }

    /// Move a filled order's stop loss, tightening only. A proposal that
    /// would loosen the stop is clamped to the current level.
    pub fn adjust_sl(&mut self, id: OrderId, new_sl: f64) -> Result<OrderEvent, LifecycleError> {
        let pos = self.position(id).ok_or(LifecycleError::UnknownOrder(id))?;
        let order = &mut self.open[pos];
        if order.status != OrderStatus::Filled {
            return Err(LifecycleError::InvalidState {
                id,
                status: order.status.clone(),
                expected: "Filled",
            });
        }
        let from = order.sl.unwrap_or(new_sl);
        let to = match order.side {
            OrderSide::Buy => new_sl.max(from),
            OrderSide::Sell => new_sl.min(from),
        };
        order.sl = Some(to);
        if (to - from).abs() > f64::EPSILON {
            debug!(%id, from, to, "stop loss ratcheted");
        }
        Ok(OrderEvent::SlAdjusted { id, from, to })
    }

    /// Close a filled order at `price` on an explicit strategy signal.
    pub fn stop(
        &mut self,
        id: OrderId,
        price: f64,
        reason: &str,
        index: usize,
    ) -> Result<OrderEvent, LifecycleError> {
        let pos = self.position(id).ok_or(LifecycleError::UnknownOrder(id))?;
        if self.open[pos].status != OrderStatus::Filled {
            return Err(LifecycleError::InvalidState {
                id,
                status: self.open[pos].status.clone(),
                expected: "Filled",
            });
        }
        self.open[pos].status = OrderStatus::Stopped;
        self.record(id, OrderStatus::Filled, OrderStatus::Stopped, index, reason);
        let closed = self.archive(pos, price, index);
        Ok(OrderEvent::Closed {
            id,
            status: OrderStatus::Stopped,
            exit_price: price,
            pnl: closed.pnl,
        })
    }

    /// Retract a pending order before it fills.
    pub fn cancel(
        &mut self,
        id: OrderId,
        reason: &str,
        index: usize,
    ) -> Result<OrderEvent, LifecycleError> {
        let pos = self.position(id).ok_or(LifecycleError::UnknownOrder(id))?;
        if self.open[pos].status != OrderStatus::Pending {
            return Err(LifecycleError::InvalidState {
                id,
                status: self.open[pos].status.clone(),
                expected: "Pending",
            });
        }
        let entry = self.open[pos].entry;
        self.open[pos].status = OrderStatus::Cancelled {
            reason: reason.to_string(),
        };
        self.record(
            id,
            OrderStatus::Pending,
            self.open[pos].status.clone(),
            index,
            reason,
        );
        self.archive(pos, entry, index);
        Ok(OrderEvent::Cancelled {
            id,
            reason: reason.to_string(),
        })
    }

    pub fn open_orders(&self) -> &[Order] {
        &self.open
    }

    /// Filled orders only (excludes pending limits).
    pub fn filled_orders(&self) -> impl Iterator<Item = &Order> {
        self.open.iter().filter(|o| o.status == OrderStatus::Filled)
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.open.iter().find(|o| o.id == id)
    }

    pub fn closed(&self) -> &[ClosedOrder] {
        &self.closed
    }

    pub fn audit(&self) -> &[TransitionRecord] {
        &self.audit
    }
}
