//! Consolidation-breakout family.
//!
//! The zigzag's latest peak/trough pair bounds the consolidation. A close
//! beyond either bound is a candidate, filtered through the breakout
//! validator (volume, body, trend filter, trend line, wick). The stop loss
//! sits at the opposing consolidation bound. Positions close when price
//! breaks the trend line that carried them.

use super::{Signal, Strategy};
use crate::breakout::{validate, BreakoutConfig, BreakoutContext};
use crate::config::{FamilyConfig, StrategyConfig};
use crate::domain::{Candle, Order, OrderKind, OrderSide, SwingKind};
use crate::indicators::{Indicator, Sma};
use crate::swings::{fit_kind_line, ZigZag};
use tracing::debug;

/// Long-term trend filter length.
const TREND_MA_LEN: usize = 50;
/// Window for the volume and body averages.
const AVG_LEN: usize = 20;
/// Points fitted per trend line and the band half-width (percent).
const LINE_POINTS: usize = 3;
const LINE_TOL_PCT: f64 = 0.5;

pub struct BreakoutStrategy {
    cfg: BreakoutConfig,
    zz: ZigZag,
    trend_ma: Sma,
    volume_ma: Sma,
    body_ma: Sma,
    trend: f64,
    volume: f64,
    body: f64,
}

impl BreakoutStrategy {
    pub fn new(cfg: &StrategyConfig) -> Self {
        let FamilyConfig::Breakout {
            min_num_cuml,
            vol_ratio_ma,
            kline_body_ratio,
        } = cfg.family
        else {
            panic!("breakout strategy built from a non-breakout config");
        };
        Self {
            cfg: BreakoutConfig {
                min_num_cuml,
                vol_ratio_ma,
                kline_body_ratio,
            },
            zz: ZigZag::new(cfg.zigzag()),
            trend_ma: Sma::new(TREND_MA_LEN),
            volume_ma: Sma::new(AVG_LEN),
            body_ma: Sma::new(AVG_LEN),
            trend: f64::NAN,
            volume: f64::NAN,
            body: f64::NAN,
        }
    }

    /// Line the close must break for an exit: support under a long,
    /// resistance over a short.
    fn exit_line_kind(side: OrderSide) -> SwingKind {
        match side {
            OrderSide::Buy => SwingKind::Trough,
            OrderSide::Sell => SwingKind::Peak,
        }
    }
}

impl Strategy for BreakoutStrategy {
    fn name(&self) -> &'static str {
        "breakout"
    }

    fn warmup_bars(&self) -> usize {
        TREND_MA_LEN
    }

    fn update_indicators(&mut self, candle: &Candle, index: usize) {
        self.trend = self.trend_ma.update(candle.close);
        self.volume = self.volume_ma.update(candle.volume);
        self.body = self.body_ma.update(candle.body());
        self.zz.update(index, candle);
    }

    fn check_signal(&mut self, candle: &Candle, index: usize) -> Option<Signal> {
        let upper = *self.zz.last_of(SwingKind::Peak)?;
        let lower = *self.zz.last_of(SwingKind::Trough)?;

        let side = if candle.close > upper.price {
            OrderSide::Buy
        } else if candle.close < lower.price {
            OrderSide::Sell
        } else {
            return None;
        };

        // Resistance line for longs, support line for shorts: the close
        // must clear the line it is breaking.
        let line_kind = match side {
            OrderSide::Buy => SwingKind::Peak,
            OrderSide::Sell => SwingKind::Trough,
        };
        let line = fit_kind_line(self.zz.points(), line_kind, LINE_POINTS, LINE_TOL_PCT);

        let ctx = BreakoutContext {
            upper: &upper,
            lower: &lower,
            trend_ma: self.trend,
            trend_line: line.as_ref(),
            volume_ma: self.volume,
            avg_body: self.body,
        };
        if let Err(veto) = validate(candle, index, side, &ctx, &self.cfg) {
            debug!(%veto, "breakout candidate vetoed");
            return None;
        }

        let sl = match side {
            OrderSide::Buy => lower.price,
            OrderSide::Sell => upper.price,
        };
        Some(Signal {
            side,
            kind: OrderKind::Market,
            entry: candle.close,
            sl: Some(sl),
            tp: None,
        })
    }

    fn check_close_signal(&mut self, order: &Order, candle: &Candle, index: usize) -> bool {
        let kind = Self::exit_line_kind(order.side);
        let Some(line) = fit_kind_line(self.zz.points(), kind, LINE_POINTS, LINE_TOL_PCT) else {
            return false;
        };
        let level = line.value_at(index);
        match order.side {
            OrderSide::Buy => candle.close < level,
            OrderSide::Sell => candle.close > level,
        }
    }

    fn reset(&mut self) {
        self.zz.reset();
        self.trend_ma.reset();
        self.volume_ma.reset();
        self.body_ma.reset();
        self.trend = f64::NAN;
        self.volume = f64::NAN;
        self.body = f64::NAN;
    }
}
