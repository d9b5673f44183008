//! Per-strategy trade statistics.
//!
//! Summaries are recomputed from the lifecycle archives rather than
//! accumulated incrementally, so they can never drift from the orders
//! that actually closed. Cancelled orders never held a position and are
//! counted separately from trades.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use swingbot_core::domain::OrderStatus;
use swingbot_core::orders::ClosedOrder;

/// Realized outcome of one strategy's archive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySummary {
    pub strategy_tag: String,
    /// Closed positions (fills that reached a terminal state).
    pub trades: usize,
    /// Pending orders that timed out or were cancelled before filling.
    pub cancelled: usize,
    pub wins: usize,
    pub losses: usize,
    /// wins / trades, 0 when there are no trades.
    pub win_rate: f64,
    /// Sum of positive trade pnl.
    pub gross_win: f64,
    /// Sum of negative trade pnl, as a positive magnitude.
    pub gross_loss: f64,
    pub net_pnl: f64,
}

/// Aggregate closed orders into one summary per strategy tag, sorted by
/// tag for deterministic output.
pub fn summarize(closed: &[ClosedOrder]) -> Vec<StrategySummary> {
    let mut groups: BTreeMap<&str, Vec<&ClosedOrder>> = BTreeMap::new();
    for c in closed {
        groups.entry(&c.order.strategy_tag).or_default().push(c);
    }

    groups
        .into_iter()
        .map(|(tag, orders)| {
            let mut summary = StrategySummary {
                strategy_tag: tag.to_string(),
                trades: 0,
                cancelled: 0,
                wins: 0,
                losses: 0,
                win_rate: 0.0,
                gross_win: 0.0,
                gross_loss: 0.0,
                net_pnl: 0.0,
            };
            for c in orders {
                if matches!(c.order.status, OrderStatus::Cancelled { .. }) {
                    summary.cancelled += 1;
                    continue;
                }
                summary.trades += 1;
                summary.net_pnl += c.pnl;
                if c.pnl > 0.0 {
                    summary.wins += 1;
                    summary.gross_win += c.pnl;
                } else if c.pnl < 0.0 {
                    summary.losses += 1;
                    summary.gross_loss += -c.pnl;
                }
            }
            if summary.trades > 0 {
                summary.win_rate = summary.wins as f64 / summary.trades as f64;
            }
            summary
        })
        .collect()
}

/// Render summaries as CSV, one row per strategy.
pub fn export_csv(summaries: &[StrategySummary]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for summary in summaries {
        wtr.serialize(summary)
            .context("failed to serialize strategy summary")?;
    }
    let bytes = wtr
        .into_inner()
        .context("failed to flush summary CSV writer")?;
    String::from_utf8(bytes).context("summary CSV was not valid UTF-8")
}
