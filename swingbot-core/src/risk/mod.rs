//! Risk manager: caps stop-loss distance and enforces reward floors
//! before a candidate order may enter the lifecycle.
//!
//! All `_pct` fields are percent units (0.10 means 0.10%).

use crate::domain::{LevelError, Order, OrderKind, OrderSide, OrderStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// What to do with a candidate whose stop-loss distance exceeds the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlFixMode {
    /// Clamp the stop loss to exactly the cap distance from entry.
    AdjSl,
    /// Keep the stop loss, move entry toward it; order becomes a
    /// pending limit at the adjusted price.
    AdjEntry,
    /// Reject the candidate outright.
    Ignore,
}

/// Read-only risk configuration for one strategy instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Maximum stop-loss distance, percent of entry.
    pub max_sl_pct: f64,
    /// Minimum reward/risk ratio (0 disables the check).
    pub min_rr: f64,
    /// Minimum reward distance, percent of entry (0 disables).
    pub min_reward_pct: f64,
    pub fix_mode: SlFixMode,
}

/// Why a candidate was refused. These are expected filtering outcomes,
/// not failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskReject {
    #[error("candidate levels are malformed: {0}")]
    InvalidLevels(#[from] LevelError),
    #[error("candidate entry {entry} is not a positive price")]
    NonPositiveEntry { entry: f64 },
    #[error("candidate carries no stop loss")]
    NoStopLoss,
    #[error("risk {risk_pct:.4}% exceeds cap {max_sl_pct:.4}%")]
    RiskTooHigh { risk_pct: f64, max_sl_pct: f64 },
    #[error("reward/risk {rr:.3} below minimum {min_rr:.3}")]
    RewardRatioTooSmall { rr: f64, min_rr: f64 },
    #[error("reward {reward_pct:.4}% below minimum {min_reward_pct:.4}%")]
    RewardTooSmall {
        reward_pct: f64,
        min_reward_pct: f64,
    },
}

fn risk_pct(entry: f64, sl: f64) -> f64 {
    (entry - sl).abs() / entry * 100.0
}

/// Apply the risk profile to a candidate order.
///
/// On success the returned order satisfies `risk_pct <= max_sl_pct` and
/// every enabled reward floor; an `AdjEntry` fix converts the order into
/// a pending limit. Malformed candidates are rejected before any fixing
/// and logged as invariant violations.
pub fn fix(mut candidate: Order, profile: &RiskProfile) -> Result<Order, RiskReject> {
    if !(candidate.entry > 0.0) {
        warn!(
            entry = candidate.entry,
            tag = %candidate.strategy_tag,
            "rejecting candidate with non-positive entry"
        );
        return Err(RiskReject::NonPositiveEntry {
            entry: candidate.entry,
        });
    }
    if let Err(err) = candidate.validate_levels() {
        warn!(tag = %candidate.strategy_tag, %err, "rejecting malformed candidate");
        return Err(err.into());
    }
    let sl = candidate.sl.ok_or(RiskReject::NoStopLoss)?;

    let mut risk = risk_pct(candidate.entry, sl);
    if risk > profile.max_sl_pct {
        match profile.fix_mode {
            SlFixMode::AdjSl => {
                let factor = profile.max_sl_pct / 100.0;
                let clamped = match candidate.side {
                    OrderSide::Buy => candidate.entry * (1.0 - factor),
                    OrderSide::Sell => candidate.entry * (1.0 + factor),
                };
                candidate.sl = Some(clamped);
                risk = risk_pct(candidate.entry, clamped);
            }
            SlFixMode::AdjEntry => {
                let factor = profile.max_sl_pct / 100.0;
                let entry = match candidate.side {
                    OrderSide::Buy => sl / (1.0 - factor),
                    OrderSide::Sell => sl / (1.0 + factor),
                };
                candidate.entry = entry;
                candidate.kind = OrderKind::Limit;
                candidate.status = OrderStatus::Pending;
                risk = risk_pct(entry, sl);
            }
            SlFixMode::Ignore => {
                return Err(RiskReject::RiskTooHigh {
                    risk_pct: risk,
                    max_sl_pct: profile.max_sl_pct,
                });
            }
        }
        debug_assert!(risk <= profile.max_sl_pct + 1e-9);
    }

    if let Some(tp) = candidate.tp {
        let reward = (tp - candidate.entry).abs() / candidate.entry * 100.0;
        if profile.min_rr > 0.0 && reward / risk < profile.min_rr {
            return Err(RiskReject::RewardRatioTooSmall {
                rr: reward / risk,
                min_rr: profile.min_rr,
            });
        }
        if reward < profile.min_reward_pct {
            return Err(RiskReject::RewardTooSmall {
                reward_pct: reward,
                min_reward_pct: profile.min_reward_pct,
            });
        }
    }

    Ok(candidate)
}
