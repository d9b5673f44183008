//! RSI-divergence family.
//!
//! Evaluates only on candles that confirm a new swing point. A divergence
//! between the swing pair's prices and their RSI samples, landing inside
//! the overbought/oversold band and not fighting a confirmed trend,
//! produces a market candidate: stop at the latest swing extreme, target
//! from the configured reward/risk ratio. Positions close on a divergence
//! against them.
//!
//! RSI samples are recorded at the stream's absolute candle index, so
//! swing points keep addressing their samples across a gap rebuild.

use super::{Signal, Strategy};
use crate::config::{FamilyConfig, StrategyConfig};
use crate::divergence::{detect, DivergenceConfig};
use crate::domain::{Candle, DivergenceEvent, Order, OrderKind, OrderSide};
use crate::indicators::{Indicator, IndicatorSeries, Rsi};
use crate::swings::{confirm_trend, TrendConfig, ZigZag};
use tracing::debug;

/// Band half-width for the trend context line (percent). Swing points
/// alternate around the line, so the band is wider than the breakout
/// family's per-line tolerance.
const TREND_TOL_PCT: f64 = 3.0;
/// Minimum move across the trend window (percent).
const MIN_TREND_PCT: f64 = 2.0;
/// Minimum fit_ratio for the context line.
const MIN_FIT_RATIO: f64 = 0.75;

pub struct DivergenceStrategy {
    det: DivergenceConfig,
    trend: TrendConfig,
    rsi: Rsi,
    rsi_len: usize,
    series: IndicatorSeries,
    zz: ZigZag,
    min_rr: f64,
    ob_rsi: f64,
    os_rsi: f64,
    /// Did the last candle confirm a swing point?
    new_point: bool,
}

impl DivergenceStrategy {
    pub fn new(cfg: &StrategyConfig) -> Self {
        let FamilyConfig::Divergence {
            rsi_len,
            delta_rsi,
            delta_price_pct,
            min_rr,
            n_last_point,
            n_trend_point,
            ob_rsi,
            os_rsi,
            ..
        } = cfg.family
        else {
            panic!("divergence strategy built from a non-divergence config");
        };
        Self {
            det: DivergenceConfig {
                delta_price_pct,
                delta_indicator: delta_rsi,
                n_last_point,
            },
            trend: TrendConfig {
                n_trend_point,
                tolerance_pct: TREND_TOL_PCT,
                min_trend_pct: MIN_TREND_PCT,
                min_updown_ratio: MIN_FIT_RATIO,
            },
            rsi: Rsi::new(rsi_len),
            rsi_len,
            series: IndicatorSeries::new(),
            zz: ZigZag::new(cfg.zigzag()),
            min_rr,
            ob_rsi,
            os_rsi,
            new_point: false,
        }
    }

    fn latest_divergence(&self) -> Option<DivergenceEvent> {
        detect(self.zz.points(), &self.series, &self.det)
    }

    /// Band gate: bullish setups need an oversold reading at the swing,
    /// bearish setups an overbought one.
    fn in_band(&self, event: &DivergenceEvent) -> bool {
        let at_swing = event.indicator_pair.1;
        if event.kind.is_bullish() {
            at_swing <= self.os_rsi
        } else {
            at_swing >= self.ob_rsi
        }
    }

    /// Trend gate: a signal fighting a confirmed trend over the last
    /// `n_trend_point` swings is vetoed. With no confirmed line the gate
    /// stays open.
    fn against_trend(&self, event: &DivergenceEvent) -> bool {
        match confirm_trend(self.zz.points(), &self.trend) {
            Some(line) => line.is_rising() != event.kind.is_bullish(),
            None => false,
        }
    }
}

impl Strategy for DivergenceStrategy {
    fn name(&self) -> &'static str {
        "divergence"
    }

    fn warmup_bars(&self) -> usize {
        self.rsi_len + 1
    }

    fn update_indicators(&mut self, candle: &Candle, index: usize) {
        self.series.record(index, self.rsi.update(candle.close));
        self.new_point = self.zz.update(index, candle).is_some();
    }

    fn check_signal(&mut self, candle: &Candle, _index: usize) -> Option<Signal> {
        if !self.new_point {
            return None;
        }
        let event = self.latest_divergence()?;
        if !self.in_band(&event) {
            debug!(kind = ?event.kind, rsi = event.indicator_pair.1, "divergence outside band");
            return None;
        }
        if self.against_trend(&event) {
            debug!(kind = ?event.kind, "divergence fights the confirmed trend");
            return None;
        }

        let swing = event.price_pair.1;
        let entry = candle.close;
        if event.kind.is_bullish() {
            let sl = swing.price;
            if sl >= entry {
                return None;
            }
            let tp = entry + self.min_rr * (entry - sl);
            Some(Signal {
                side: OrderSide::Buy,
                kind: OrderKind::Market,
                entry,
                sl: Some(sl),
                tp: Some(tp),
            })
        } else {
            let sl = swing.price;
            if sl <= entry {
                return None;
            }
            let tp = entry - self.min_rr * (sl - entry);
            Some(Signal {
                side: OrderSide::Sell,
                kind: OrderKind::Market,
                entry,
                sl: Some(sl),
                tp: Some(tp),
            })
        }
    }

    fn check_close_signal(&mut self, order: &Order, _candle: &Candle, _index: usize) -> bool {
        if !self.new_point {
            return false;
        }
        let Some(event) = self.latest_divergence() else {
            return false;
        };
        match order.side {
            OrderSide::Buy => !event.kind.is_bullish(),
            OrderSide::Sell => event.kind.is_bullish(),
        }
    }

    fn reset(&mut self) {
        self.rsi.reset();
        self.series.clear();
        self.zz.reset();
        self.new_point = false;
    }
}
