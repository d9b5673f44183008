//! Moving-average crossover family.
//!
//! A golden cross (fast MA crossing above slow) opens a long, a death
//! cross a short. The stop loss sits at the latest opposing swing point,
//! and trails swing by swing as new points confirm; the lifecycle ratchet
//! guarantees the trail only ever tightens. Positions close on the
//! opposite cross.

use super::{Signal, Strategy};
use crate::config::{FamilyConfig, MaType, StrategyConfig};
use crate::domain::{Candle, Order, OrderKind, OrderSide, SwingKind};
use crate::indicators::{Ema, Indicator, Sma};
use crate::swings::ZigZag;

/// Either MA flavor behind one interface.
enum Ma {
    Sma(Sma),
    Ema(Ema),
}

impl Ma {
    fn new(ma_type: MaType, period: usize) -> Self {
        match ma_type {
            MaType::Sma => Ma::Sma(Sma::new(period)),
            MaType::Ema => Ma::Ema(Ema::new(period)),
        }
    }

    fn update(&mut self, value: f64) -> f64 {
        match self {
            Ma::Sma(m) => m.update(value),
            Ma::Ema(m) => m.update(value),
        }
    }

    fn reset(&mut self) {
        match self {
            Ma::Sma(m) => m.reset(),
            Ma::Ema(m) => m.reset(),
        }
    }
}

pub struct CrossoverStrategy {
    fast: Ma,
    slow: Ma,
    slow_len: usize,
    zz: ZigZag,
    prev: Option<(f64, f64)>,
    /// Cross detected on the current candle, if any.
    cross: Option<OrderSide>,
}

impl CrossoverStrategy {
    pub fn new(cfg: &StrategyConfig) -> Self {
        let FamilyConfig::Crossover {
            fast_ma,
            slow_ma,
            ma_type,
        } = cfg.family
        else {
            panic!("crossover strategy built from a non-crossover config");
        };
        assert!(fast_ma < slow_ma, "fast MA must be shorter than slow MA");
        Self {
            fast: Ma::new(ma_type, fast_ma),
            slow: Ma::new(ma_type, slow_ma),
            slow_len: slow_ma,
            zz: ZigZag::new(cfg.zigzag()),
            prev: None,
            cross: None,
        }
    }

    fn opposing_swing_price(&self, side: OrderSide) -> Option<f64> {
        let kind = match side {
            OrderSide::Buy => SwingKind::Trough,
            OrderSide::Sell => SwingKind::Peak,
        };
        self.zz.last_of(kind).map(|p| p.price)
    }
}

impl Strategy for CrossoverStrategy {
    fn name(&self) -> &'static str {
        "crossover"
    }

    fn warmup_bars(&self) -> usize {
        self.slow_len + 1
    }

    fn update_indicators(&mut self, candle: &Candle, index: usize) {
        self.zz.update(index, candle);

        let fast = self.fast.update(candle.close);
        let slow = self.slow.update(candle.close);
        self.cross = None;
        if fast.is_nan() || slow.is_nan() {
            return;
        }
        if let Some((pf, ps)) = self.prev {
            if pf <= ps && fast > slow {
                self.cross = Some(OrderSide::Buy);
            } else if pf >= ps && fast < slow {
                self.cross = Some(OrderSide::Sell);
            }
        }
        self.prev = Some((fast, slow));
    }

    fn check_signal(&mut self, candle: &Candle, _index: usize) -> Option<Signal> {
        let side = self.cross?;
        let sl = self.opposing_swing_price(side)?;
        // The swing must actually be on the stop side of the entry.
        let valid = match side {
            OrderSide::Buy => sl < candle.close,
            OrderSide::Sell => sl > candle.close,
        };
        if !valid {
            return None;
        }
        Some(Signal {
            side,
            kind: OrderKind::Market,
            entry: candle.close,
            sl: Some(sl),
            tp: None,
        })
    }

    fn check_close_signal(&mut self, order: &Order, _candle: &Candle, _index: usize) -> bool {
        self.cross == Some(order.side.opposite())
    }

    fn trail_sl(&self, order: &Order, _candle: &Candle, _index: usize) -> Option<f64> {
        self.opposing_swing_price(order.side)
    }

    fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.zz.reset();
        self.prev = None;
        self.cross = None;
    }
}
