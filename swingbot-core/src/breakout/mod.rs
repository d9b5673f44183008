//! Breakout candle validation.
//!
//! A breakout candidate is a candle leaving a consolidation bounded by two
//! swing points. Four checks must all pass; the first failure vetoes and
//! names why, so strategies can log the rejection.

use crate::domain::{Candle, OrderSide, SwingPoint, TrendLine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakoutConfig {
    /// Minimum candle span between the consolidation's bounding points.
    pub min_num_cuml: usize,
    /// Volume must reach this multiple of the volume moving average.
    pub vol_ratio_ma: f64,
    /// Body must reach this multiple of the recent average body.
    pub kline_body_ratio: f64,
}

/// Why a candidate candle was vetoed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BreakoutVeto {
    #[error("consolidation spans {span} candles, need at least {min}")]
    SpanTooShort { span: usize, min: usize },
    #[error("volume {volume} below {required} ({ratio}x of MA)")]
    LowVolume {
        volume: f64,
        required: f64,
        ratio: f64,
    },
    #[error("body {body} below {required} ({ratio}x of average)")]
    SmallBody {
        body: f64,
        required: f64,
        ratio: f64,
    },
    #[error("close {close} on the wrong side of the trend filter {filter}")]
    TrendFilter { close: f64, filter: f64 },
    #[error("close {close} has not cleared the trend line at {line}")]
    TrendLineNotCleared { close: f64, line: f64 },
    #[error("opposing wick {wick} is {pct:.0}% of the range")]
    WickTooLarge { wick: f64, pct: f64 },
}

/// Market context the validator samples at the breakout candle.
#[derive(Debug, Clone, Copy)]
pub struct BreakoutContext<'a> {
    /// Upper bound of the consolidation.
    pub upper: &'a SwingPoint,
    /// Lower bound of the consolidation.
    pub lower: &'a SwingPoint,
    /// Long-term moving average at the current candle.
    pub trend_ma: f64,
    /// Trend line the close must clear, if one is confirmed.
    pub trend_line: Option<&'a TrendLine>,
    /// Volume moving average at the current candle.
    pub volume_ma: f64,
    /// Average body length over the recent window.
    pub avg_body: f64,
}

/// Validate a breakout candidate. `Ok(())` means all four checks passed.
pub fn validate(
    candle: &Candle,
    index: usize,
    side: OrderSide,
    ctx: &BreakoutContext<'_>,
    cfg: &BreakoutConfig,
) -> Result<(), BreakoutVeto> {
    let span = ctx.upper.index.abs_diff(ctx.lower.index);
    if span < cfg.min_num_cuml {
        return Err(BreakoutVeto::SpanTooShort {
            span,
            min: cfg.min_num_cuml,
        });
    }

    let required_volume = cfg.vol_ratio_ma * ctx.volume_ma;
    if ctx.volume_ma.is_nan() || candle.volume < required_volume {
        return Err(BreakoutVeto::LowVolume {
            volume: candle.volume,
            required: required_volume,
            ratio: cfg.vol_ratio_ma,
        });
    }

    let required_body = cfg.kline_body_ratio * ctx.avg_body;
    if ctx.avg_body.is_nan() || candle.body() < required_body {
        return Err(BreakoutVeto::SmallBody {
            body: candle.body(),
            required: required_body,
            ratio: cfg.kline_body_ratio,
        });
    }

    let close = candle.close;
    let filter_ok = match side {
        OrderSide::Buy => close > ctx.trend_ma,
        OrderSide::Sell => close < ctx.trend_ma,
    };
    if ctx.trend_ma.is_nan() || !filter_ok {
        return Err(BreakoutVeto::TrendFilter {
            close,
            filter: ctx.trend_ma,
        });
    }
    if let Some(line) = ctx.trend_line {
        let level = line.value_at(index);
        let cleared = match side {
            OrderSide::Buy => close > level,
            OrderSide::Sell => close < level,
        };
        if !cleared {
            return Err(BreakoutVeto::TrendLineNotCleared { close, line: level });
        }
    }

    // A long wick against the breakout means the move was rejected
    // intra-candle.
    let opposing_wick = match side {
        OrderSide::Buy => candle.upper_wick(),
        OrderSide::Sell => candle.lower_wick(),
    };
    if opposing_wick >= 0.5 * candle.range() {
        let pct = if candle.range() > 0.0 {
            opposing_wick / candle.range() * 100.0
        } else {
            100.0
        };
        return Err(BreakoutVeto::WickTooLarge {
            wick: opposing_wick,
            pct,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SwingKind;
    use chrono::NaiveDate;

    fn point(index: usize, price: f64, kind: SwingKind) -> SwingPoint {
        SwingPoint {
            index,
            price,
            kind,
            time: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    fn candle(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
        Candle {
            open,
            high,
            low,
            close,
            volume,
            time: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(12, 0, 0).unwrap(),
        }
    }

    fn cfg() -> BreakoutConfig {
        BreakoutConfig {
            min_num_cuml: 10,
            vol_ratio_ma: 1.5,
            kline_body_ratio: 1.2,
        }
    }

    struct Fixture {
        upper: SwingPoint,
        lower: SwingPoint,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                upper: point(20, 105.0, SwingKind::Peak),
                lower: point(40, 100.0, SwingKind::Trough),
            }
        }

        fn ctx(&self) -> BreakoutContext<'_> {
            BreakoutContext {
                upper: &self.upper,
                lower: &self.lower,
                trend_ma: 101.0,
                trend_line: None,
                volume_ma: 1000.0,
                avg_body: 1.0,
            }
        }
    }

    /// Strong bullish breakout candle: big body, high volume, tiny upper
    /// wick, close above everything.
    fn strong_buy_candle() -> Candle {
        candle(104.0, 107.2, 103.8, 107.0, 2000.0)
    }

    #[test]
    fn clean_breakout_passes_all_checks() {
        let fx = Fixture::new();
        let c = strong_buy_candle();
        assert_eq!(validate(&c, 50, OrderSide::Buy, &fx.ctx(), &cfg()), Ok(()));
    }

    #[test]
    fn short_consolidation_is_vetoed() {
        let mut fx = Fixture::new();
        fx.lower = point(25, 100.0, SwingKind::Trough); // span 5 < 10
        let c = strong_buy_candle();
        let err = validate(&c, 50, OrderSide::Buy, &fx.ctx(), &cfg()).unwrap_err();
        assert!(matches!(err, BreakoutVeto::SpanTooShort { span: 5, min: 10 }));
    }

    #[test]
    fn thin_volume_is_vetoed() {
        let fx = Fixture::new();
        let c = candle(104.0, 107.2, 103.8, 107.0, 1200.0); // needs 1500
        let err = validate(&c, 50, OrderSide::Buy, &fx.ctx(), &cfg()).unwrap_err();
        assert!(matches!(err, BreakoutVeto::LowVolume { .. }));
    }

    #[test]
    fn small_body_is_vetoed() {
        let fx = Fixture::new();
        // Body 0.5 but 1.2x of avg_body 1.0 is required.
        let c = candle(106.5, 107.2, 103.8, 107.0, 2000.0);
        let err = validate(&c, 50, OrderSide::Buy, &fx.ctx(), &cfg()).unwrap_err();
        assert!(matches!(err, BreakoutVeto::SmallBody { .. }));
    }

    #[test]
    fn buy_close_below_trend_ma_is_vetoed() {
        let fx = Fixture::new();
        let mut ctx = fx.ctx();
        ctx.trend_ma = 110.0; // close 107 is below the filter
        let c = strong_buy_candle();
        let err = validate(&c, 50, OrderSide::Buy, &ctx, &cfg()).unwrap_err();
        assert!(matches!(err, BreakoutVeto::TrendFilter { .. }));
    }

    #[test]
    fn buy_must_clear_projected_trend_line() {
        let fx = Fixture::new();
        // Falling line projecting to 110 at index 50; close 107 fails.
        let line = TrendLine {
            slope: -0.5,
            intercept: 135.0,
            fit_ratio: 1.0,
            first: point(20, 125.0, SwingKind::Peak),
            last: point(40, 115.0, SwingKind::Peak),
        };
        let mut ctx = fx.ctx();
        ctx.trend_line = Some(&line);
        let c = strong_buy_candle();
        let err = validate(&c, 50, OrderSide::Buy, &ctx, &cfg()).unwrap_err();
        assert!(matches!(err, BreakoutVeto::TrendLineNotCleared { .. }));

        // Projecting to 105 at index 60; close 107 clears it.
        assert_eq!(validate(&c, 60, OrderSide::Buy, &ctx, &cfg()), Ok(()));
    }

    #[test]
    fn long_upper_wick_vetoes_a_buy() {
        let fx = Fixture::new();
        // Range 103.8..110, close 106: upper wick 4 of range 6.2 (> 50%).
        let c = candle(104.0, 110.0, 103.8, 106.0, 2000.0);
        let err = validate(&c, 50, OrderSide::Buy, &fx.ctx(), &cfg()).unwrap_err();
        assert!(matches!(err, BreakoutVeto::WickTooLarge { .. }));
    }

    #[test]
    fn sell_breakout_mirrors_the_checks() {
        let fx = Fixture::new();
        let mut ctx = fx.ctx();
        ctx.trend_ma = 101.0;
        // Strong bearish candle closing near its low, below the filter.
        let c = candle(99.5, 99.7, 96.0, 96.2, 2000.0);
        assert_eq!(validate(&c, 50, OrderSide::Sell, &ctx, &cfg()), Ok(()));

        // A long lower wick vetoes the sell.
        let rejected = candle(99.5, 99.7, 92.0, 96.2, 2000.0);
        let err = validate(&rejected, 50, OrderSide::Sell, &ctx, &cfg()).unwrap_err();
        assert!(matches!(err, BreakoutVeto::WickTooLarge { .. }));
    }

    #[test]
    fn nan_context_vetoes_instead_of_passing() {
        let fx = Fixture::new();
        let mut ctx = fx.ctx();
        ctx.volume_ma = f64::NAN;
        let c = strong_buy_candle();
        assert!(validate(&c, 50, OrderSide::Buy, &ctx, &cfg()).is_err());
    }
}
