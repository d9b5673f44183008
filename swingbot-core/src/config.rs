//! Strategy instance configuration.
//!
//! One `StrategyConfig` fully determines a strategy instance's behavior on
//! a stream; its `strategy_tag()` is a content hash of the serialized
//! configuration, so identical configurations are identically tagged
//! across runs and processes.

use crate::domain::Timeframe;
use crate::risk::{RiskProfile, SlFixMode};
use crate::swings::{ZigZagConfig, ZigZagMode};
use serde::{Deserialize, Serialize};

/// Moving-average flavor for the crossover family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaType {
    Sma,
    Ema,
}

/// Family-specific parameters, tag-selected in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum FamilyConfig {
    Breakout {
        /// Minimum candle span of the consolidation.
        min_num_cuml: usize,
        /// Breakout volume multiple of the volume MA.
        vol_ratio_ma: f64,
        /// Breakout body multiple of the recent average body.
        kline_body_ratio: f64,
    },
    Divergence {
        rsi_len: usize,
        /// Minimum RSI delta between the swing pair.
        delta_rsi: f64,
        /// Minimum price delta between the swing pair, percent.
        delta_price_pct: f64,
        /// Minimum reward/risk ratio for the target.
        min_rr: f64,
        /// Minimum reward distance, percent of entry.
        min_rw_pct: f64,
        /// Prior same-kind swings examined per detection.
        n_last_point: usize,
        /// Swing points fitted for the trend context line.
        n_trend_point: usize,
        /// Overbought band floor for bearish setups.
        ob_rsi: f64,
        /// Oversold band ceiling for bullish setups.
        os_rsi: f64,
    },
    Crossover {
        fast_ma: usize,
        slow_ma: usize,
        #[serde(rename = "type")]
        ma_type: MaType,
    },
}

impl FamilyConfig {
    pub fn family_name(&self) -> &'static str {
        match self {
            FamilyConfig::Breakout { .. } => "breakout",
            FamilyConfig::Divergence { .. } => "divergence",
            FamilyConfig::Crossover { .. } => "crossover",
        }
    }
}

/// Complete configuration of one strategy instance on one
/// (symbol, timeframe) stream. All `_pct` fields are percent units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub tf: Timeframe,
    /// Order volume in lots.
    pub volume: f64,
    /// Maximum stop-loss distance, percent of entry.
    pub max_sl_pct: f64,
    pub sl_fix_mode: SlFixMode,
    /// Minimum zigzag reversal, percent.
    pub min_zz_pct: f64,
    /// Zigzag deviation multiplier.
    pub zz_dev: f64,
    pub zz_type: ZigZagMode,
    /// Kernel-regression smoothing window for swing extraction.
    #[serde(default = "default_zz_kernel")]
    pub zz_kernel: usize,
    /// Bars a pending limit may wait before auto-cancel; 0 disables.
    #[serde(default)]
    pub max_pending_bars: usize,
    #[serde(flatten)]
    pub family: FamilyConfig,
}

fn default_zz_kernel() -> usize {
    5
}

impl StrategyConfig {
    /// Content hash identifying this configuration. Stable across runs:
    /// the hash covers the canonical JSON form of every field.
    pub fn strategy_tag(&self) -> String {
        let canonical = serde_json::json!({
            "tf": self.tf.as_str(),
            "volume": self.volume,
            "max_sl_pct": self.max_sl_pct,
            "sl_fix_mode": self.sl_fix_mode,
            "min_zz_pct": self.min_zz_pct,
            "zz_dev": self.zz_dev,
            "zz_type": self.zz_type,
            "zz_kernel": self.zz_kernel,
            "max_pending_bars": self.max_pending_bars,
            "family": self.family,
        });
        let hash = blake3::hash(canonical.to_string().as_bytes());
        let hex = hash.to_hex().to_string();
        format!("{}-{}", self.family.family_name(), &hex[..12])
    }

    pub fn zigzag(&self) -> ZigZagConfig {
        ZigZagConfig {
            min_zz_pct: self.min_zz_pct,
            zz_dev: self.zz_dev,
            mode: self.zz_type,
            kernel: self.zz_kernel,
            retain: 64,
        }
    }

    /// Risk profile derived from the common and family fields.
    pub fn risk_profile(&self) -> RiskProfile {
        let (min_rr, min_reward_pct) = match self.family {
            FamilyConfig::Divergence { min_rr, min_rw_pct, .. } => (min_rr, min_rw_pct),
            _ => (0.0, 0.0),
        };
        RiskProfile {
            max_sl_pct: self.max_sl_pct,
            min_rr,
            min_reward_pct,
            fix_mode: self.sl_fix_mode,
        }
    }
}
