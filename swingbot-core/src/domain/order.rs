//! Order types and the order status machine's vocabulary.

use super::ids::OrderId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(&self) -> OrderSide {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// Execution kind. Market orders fill on creation; limit orders wait for
/// price to reach the entry level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Market,
    Limit,
}

/// Order lifecycle states.
///
/// `Pending → Filled → { HitSl, HitTp, Stopped }`; all three are terminal.
/// `Cancelled` is reachable only from `Pending`. A market order is created
/// directly in `Filled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Limit order waiting for price to reach the entry.
    Pending,
    /// Position is open; sl/tp are being tracked.
    Filled,
    /// Stop-loss level was touched.
    HitSl,
    /// Take-profit level was touched.
    HitTp,
    /// Closed by an explicit strategy signal, independent of sl/tp.
    Stopped,
    /// Pending order retracted before ever filling.
    Cancelled { reason: String },
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::HitSl
                | OrderStatus::HitTp
                | OrderStatus::Stopped
                | OrderStatus::Cancelled { .. }
        )
    }

    /// Pending or Filled — still tracked by the lifecycle.
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Filled)
    }
}

/// Violation of the side/level invariant, caught before the risk manager.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LevelError {
    #[error("stop-loss {sl} on wrong side of entry {entry} for {side:?}")]
    SlWrongSide { side: OrderSide, entry: f64, sl: f64 },

    #[error("take-profit {tp} on wrong side of entry {entry} for {side:?}")]
    TpWrongSide { side: OrderSide, entry: f64, tp: f64 },
}

/// A risk-managed trade order.
///
/// Owned exclusively by the order lifecycle once created; strategies request
/// creation/adjustment/closure through the lifecycle interface only.
///
/// Level invariant at creation: BUY ⇒ sl < entry < tp (when both set);
/// SELL ⇒ tp < entry < sl. A trailing stop may later cross the entry —
/// the invariant binds candidates, not profit-locked stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub entry: f64,
    pub sl: Option<f64>,
    pub tp: Option<f64>,
    pub volume: f64,
    pub status: OrderStatus,
    /// Content hash of the owning strategy instance's configuration.
    pub strategy_tag: String,
    pub created_index: usize,
    pub created_time: NaiveDateTime,
}

impl Order {
    /// Check the side/level invariant for a candidate order.
    pub fn validate_levels(&self) -> Result<(), LevelError> {
        match self.side {
            OrderSide::Buy => {
                if let Some(sl) = self.sl {
                    if sl >= self.entry {
                        return Err(LevelError::SlWrongSide {
                            side: self.side,
                            entry: self.entry,
                            sl,
                        });
                    }
                }
                if let Some(tp) = self.tp {
                    if tp <= self.entry {
                        return Err(LevelError::TpWrongSide {
                            side: self.side,
                            entry: self.entry,
                            tp,
                        });
                    }
                }
            }
            OrderSide::Sell => {
                if let Some(sl) = self.sl {
                    if sl <= self.entry {
                        return Err(LevelError::SlWrongSide {
                            side: self.side,
                            entry: self.entry,
                            sl,
                        });
                    }
                }
                if let Some(tp) = self.tp {
                    if tp >= self.entry {
                        return Err(LevelError::TpWrongSide {
                            side: self.side,
                            entry: self.entry,
                            tp,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Realized PnL for an exit at `exit_price`.
    pub fn pnl(&self, exit_price: f64) -> f64 {
        match self.side {
            OrderSide::Buy => (exit_price - self.entry) * self.volume,
            OrderSide::Sell => (self.entry - exit_price) * self.volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_order(side: OrderSide, entry: f64, sl: Option<f64>, tp: Option<f64>) -> Order {
        Order {
            id: OrderId(1),
            side,
            kind: OrderKind::Market,
            entry,
            sl,
            tp,
            volume: 1.0,
            status: OrderStatus::Pending,
            strategy_tag: "test".into(),
            created_index: 0,
            created_time: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn buy_levels_valid() {
        let o = make_order(OrderSide::Buy, 1.085, Some(1.082), Some(1.090));
        assert!(o.validate_levels().is_ok());
    }

    #[test]
    fn sell_levels_valid() {
        let o = make_order(OrderSide::Sell, 1.085, Some(1.088), Some(1.080));
        assert!(o.validate_levels().is_ok());
    }

    #[test]
    fn buy_sl_above_entry_rejected() {
        let o = make_order(OrderSide::Buy, 1.085, Some(1.086), None);
        assert!(matches!(
            o.validate_levels(),
            Err(LevelError::SlWrongSide { .. })
        ));
    }

    #[test]
    fn buy_tp_below_entry_rejected() {
        let o = make_order(OrderSide::Buy, 1.085, Some(1.082), Some(1.084));
        assert!(matches!(
            o.validate_levels(),
            Err(LevelError::TpWrongSide { .. })
        ));
    }

    #[test]
    fn sell_sl_below_entry_rejected() {
        let o = make_order(OrderSide::Sell, 1.085, Some(1.084), None);
        assert!(matches!(
            o.validate_levels(),
            Err(LevelError::SlWrongSide { .. })
        ));
    }

    #[test]
    fn missing_levels_are_valid() {
        let o = make_order(OrderSide::Buy, 1.085, None, None);
        assert!(o.validate_levels().is_ok());
    }

    #[test]
    fn pnl_signs() {
        let buy = make_order(OrderSide::Buy, 100.0, None, None);
        assert!((buy.pnl(105.0) - 5.0).abs() < 1e-12);
        assert!((buy.pnl(95.0) + 5.0).abs() < 1e-12);

        let sell = make_order(OrderSide::Sell, 100.0, None, None);
        assert!((sell.pnl(95.0) - 5.0).abs() < 1e-12);
        assert!((sell.pnl(105.0) + 5.0).abs() < 1e-12);
    }

    #[test]
    fn status_terminality() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::HitSl.is_terminal());
        assert!(OrderStatus::HitTp.is_terminal());
        assert!(OrderStatus::Stopped.is_terminal());
        assert!(OrderStatus::Cancelled {
            reason: "timeout".into()
        }
        .is_terminal());

        assert!(OrderStatus::Pending.is_open());
        assert!(OrderStatus::Filled.is_open());
        assert!(!OrderStatus::HitTp.is_open());
    }

    #[test]
    fn side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }

    #[test]
    fn order_serialization_roundtrip() {
        let o = make_order(OrderSide::Sell, 1.085, Some(1.088), Some(1.080));
        let json = serde_json::to_string(&o).unwrap();
        let deser: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(o.id, deser.id);
        assert_eq!(o.side, deser.side);
        assert_eq!(o.sl, deser.sl);
        assert_eq!(o.status, deser.status);
    }
}
