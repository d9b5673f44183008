//! Streaming zigzag — turns a candle stream into alternating swing points.
//!
//! Per closed candle the extractor either extends the current developing
//! extreme, confirms a reversal as a new swing point, or discards noise.
//! A reversal confirms only once price has moved against the developing
//! extreme by the noise threshold: `min_zz_pct * zz_dev` percent of the
//! extreme's price.
//!
//! Two modes:
//! - `Direct` tracks candle highs/lows and confirms every qualifying
//!   alternation (more points).
//! - `Convergent` smooths closes with a trailing triangular kernel first
//!   and runs the same reversal logic on the smoothed series (fewer,
//!   smoother points; swing prices are smoothed values).
//!
//! Confirmed points strictly alternate kind by construction and are never
//! retroactively mutated. The sequence is a rolling buffer capped at
//! `retain` points; `index` stays absolute within the stream.

use crate::domain::{Candle, SwingKind, SwingPoint};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Extraction mode, selected by strategy configuration (`zz_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZigZagMode {
    Direct,
    Convergent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZigZagConfig {
    /// Minimum reversal move, percent of the reference price.
    pub min_zz_pct: f64,
    /// Deviation multiplier widening or narrowing the noise band.
    pub zz_dev: f64,
    pub mode: ZigZagMode,
    /// Smoothing window for convergent mode (ignored in direct mode).
    pub kernel: usize,
    /// Maximum confirmed points retained in the rolling buffer.
    pub retain: usize,
}

impl ZigZagConfig {
    pub fn direct(min_zz_pct: f64, zz_dev: f64) -> Self {
        Self {
            min_zz_pct,
            zz_dev,
            mode: ZigZagMode::Direct,
            kernel: 5,
            retain: 64,
        }
    }

    pub fn convergent(min_zz_pct: f64, zz_dev: f64, kernel: usize) -> Self {
        Self {
            min_zz_pct,
            zz_dev,
            mode: ZigZagMode::Convergent,
            kernel,
            retain: 64,
        }
    }

    /// Effective reversal threshold as a fraction (not percent).
    fn threshold(&self) -> f64 {
        self.min_zz_pct * self.zz_dev / 100.0
    }
}

/// Trailing triangular smoother: weights 1..=k over the last k closes,
/// most recent heaviest. Causal by design — no future candles are read.
#[derive(Debug, Clone)]
struct KernelSmoother {
    size: usize,
    window: VecDeque<f64>,
}

impl KernelSmoother {
    fn new(size: usize) -> Self {
        assert!(size >= 1, "kernel size must be >= 1");
        Self {
            size,
            window: VecDeque::with_capacity(size + 1),
        }
    }

    fn update(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        if self.window.len() > self.size {
            self.window.pop_front();
        }
        if self.window.len() < self.size {
            return None;
        }
        let mut num = 0.0;
        let mut den = 0.0;
        for (i, v) in self.window.iter().enumerate() {
            let w = (i + 1) as f64;
            num += w * v;
            den += w;
        }
        Some(num / den)
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}

#[derive(Debug, Clone, Copy)]
struct Extreme {
    index: usize,
    price: f64,
    time: NaiveDateTime,
}

impl Extreme {
    fn to_point(self, kind: SwingKind) -> SwingPoint {
        SwingPoint {
            index: self.index,
            price: self.price,
            kind,
            time: self.time,
        }
    }
}

#[derive(Debug, Clone)]
enum LegState {
    /// No candles seen yet.
    Empty,
    /// No confirmed point yet; tracking both running extremes.
    Seeding { hi: Extreme, lo: Extreme },
    /// One leg in progress; `kind` is the developing extreme's kind.
    Leg { kind: SwingKind, extreme: Extreme },
}

/// The swing-point extractor. One instance per (symbol, timeframe, config)
/// stream; updates must arrive strictly in candle order.
#[derive(Debug, Clone)]
pub struct ZigZag {
    cfg: ZigZagConfig,
    points: Vec<SwingPoint>,
    state: LegState,
    smoother: KernelSmoother,
}

impl ZigZag {
    pub fn new(cfg: ZigZagConfig) -> Self {
        assert!(cfg.min_zz_pct > 0.0, "min_zz_pct must be positive");
        assert!(cfg.zz_dev > 0.0, "zz_dev must be positive");
        assert!(cfg.retain >= 2, "retain must hold at least 2 points");
        let kernel = KernelSmoother::new(cfg.kernel.max(1));
        Self {
            cfg,
            points: Vec::new(),
            state: LegState::Empty,
            smoother: kernel,
        }
    }

    /// Feed the next closed candle. Returns the newly confirmed swing point,
    /// if this candle confirmed one.
    pub fn update(&mut self, index: usize, candle: &Candle) -> Option<SwingPoint> {
        let (hi_price, lo_price) = match self.cfg.mode {
            ZigZagMode::Direct => (candle.high, candle.low),
            ZigZagMode::Convergent => {
                let s = self.smoother.update(candle.close)?;
                (s, s)
            }
        };
        let thr = self.cfg.threshold();
        let now_hi = Extreme {
            index,
            price: hi_price,
            time: candle.time,
        };
        let now_lo = Extreme {
            index,
            price: lo_price,
            time: candle.time,
        };

        let confirmed = match &mut self.state {
            LegState::Empty => {
                self.state = LegState::Seeding {
                    hi: now_hi,
                    lo: now_lo,
                };
                None
            }
            LegState::Seeding { hi, lo } => {
                if hi_price > hi.price {
                    *hi = now_hi;
                }
                if lo_price < lo.price {
                    *lo = now_lo;
                }
                if hi_price >= lo.price * (1.0 + thr) {
                    let point = lo.to_point(SwingKind::Trough);
                    self.state = LegState::Leg {
                        kind: SwingKind::Peak,
                        extreme: now_hi,
                    };
                    Some(point)
                } else if lo_price <= hi.price * (1.0 - thr) {
                    let point = hi.to_point(SwingKind::Peak);
                    self.state = LegState::Leg {
                        kind: SwingKind::Trough,
                        extreme: now_lo,
                    };
                    Some(point)
                } else {
                    None
                }
            }
            LegState::Leg { kind, extreme } => match kind {
                SwingKind::Peak => {
                    // Extension takes precedence over same-candle reversal.
                    if hi_price > extreme.price {
                        *extreme = now_hi;
                        None
                    } else if lo_price <= extreme.price * (1.0 - thr) {
                        let point = extreme.to_point(SwingKind::Peak);
                        self.state = LegState::Leg {
                            kind: SwingKind::Trough,
                            extreme: now_lo,
                        };
                        Some(point)
                    } else {
                        None
                    }
                }
                SwingKind::Trough => {
                    if lo_price < extreme.price {
                        *extreme = now_lo;
                        None
                    } else if hi_price >= extreme.price * (1.0 + thr) {
                        let point = extreme.to_point(SwingKind::Trough);
                        self.state = LegState::Leg {
                            kind: SwingKind::Peak,
                            extreme: now_hi,
                        };
                        Some(point)
                    } else {
                        None
                    }
                }
            },
        };

        if let Some(point) = confirmed {
            self.points.push(point);
            if self.points.len() > self.cfg.retain {
                self.points.remove(0);
            }
            return Some(point);
        }
        None
    }

    /// Confirmed swing points, oldest first.
    pub fn points(&self) -> &[SwingPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&SwingPoint> {
        self.points.last()
    }

    /// Most recent confirmed point of the given kind.
    pub fn last_of(&self, kind: SwingKind) -> Option<&SwingPoint> {
        self.points.iter().rev().find(|p| p.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Discard all state (stream rebuild after a gap).
    pub fn reset(&mut self) {
        self.points.clear();
        self.state = LegState::Empty;
        self.smoother.reset();
    }
}
