//! Candle — the fundamental market data unit — and the timeframe grid.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OHLCV candle for a single (symbol, timeframe) stream.
///
/// Immutable once closed. A stream's candles are strictly increasing in
/// `time` with no gaps; a gap invalidates dependent indicator state until
/// enough history rebuilds (handled by the strategy instance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub time: NaiveDateTime,
}

impl Candle {
    /// Basic OHLC sanity check: high is the maximum, low the minimum,
    /// prices positive.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }

    /// Absolute body length (|close − open|).
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Full high-to-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Wick above the body.
    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// Wick below the body.
    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Whether `level` lies within this candle's high-low range.
    pub fn touches(&self, level: f64) -> bool {
        self.low <= level && level <= self.high
    }
}

/// The timeframe grid a candle stream is sampled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
}

impl Timeframe {
    /// Spacing between consecutive closed candles on this grid.
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::M1 => Duration::minutes(1),
            Timeframe::M5 => Duration::minutes(5),
            Timeframe::M15 => Duration::minutes(15),
            Timeframe::M30 => Duration::minutes(30),
            Timeframe::H1 => Duration::hours(1),
            Timeframe::H4 => Duration::hours(4),
            Timeframe::D1 => Duration::days(1),
            Timeframe::W1 => Duration::weeks(1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Timeframe::M1),
            "5m" => Ok(Timeframe::M5),
            "15m" => Ok(Timeframe::M15),
            "30m" => Ok(Timeframe::M30),
            "1h" => Ok(Timeframe::H1),
            "4h" => Ok(Timeframe::H4),
            "1d" => Ok(Timeframe::D1),
            "1w" => Ok(Timeframe::W1),
            other => Err(format!("unknown timeframe: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_candle() -> Candle {
        Candle {
            open: 1.0850,
            high: 1.0875,
            low: 1.0840,
            close: 1.0870,
            volume: 1250.0,
            time: NaiveDate::from_ymd_opt(2024, 3, 4)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle().is_sane());
    }

    #[test]
    fn candle_detects_inverted_high_low() {
        let mut c = sample_candle();
        c.high = 1.0830; // below low
        assert!(!c.is_sane());
    }

    #[test]
    fn candle_geometry() {
        let c = sample_candle();
        assert!((c.body() - 0.0020).abs() < 1e-12);
        assert!((c.range() - 0.0035).abs() < 1e-12);
        assert!((c.upper_wick() - 0.0005).abs() < 1e-12);
        assert!((c.lower_wick() - 0.0010).abs() < 1e-12);
        assert!(c.is_bullish());
    }

    #[test]
    fn candle_touches_level_in_range() {
        let c = sample_candle();
        assert!(c.touches(1.0850));
        assert!(c.touches(1.0840));
        assert!(c.touches(1.0875));
        assert!(!c.touches(1.0900));
        assert!(!c.touches(1.0820));
    }

    #[test]
    fn timeframe_roundtrip_str() {
        for tf in [
            Timeframe::M1,
            Timeframe::M5,
            Timeframe::M15,
            Timeframe::M30,
            Timeframe::H1,
            Timeframe::H4,
            Timeframe::D1,
            Timeframe::W1,
        ] {
            assert_eq!(tf.as_str().parse::<Timeframe>().unwrap(), tf);
        }
    }

    #[test]
    fn timeframe_duration() {
        assert_eq!(Timeframe::H4.duration(), Duration::hours(4));
        assert_eq!(Timeframe::M15.duration(), Duration::minutes(15));
    }

    #[test]
    fn timeframe_serde_uses_config_names() {
        let json = serde_json::to_string(&Timeframe::H4).unwrap();
        assert_eq!(json, "\"4h\"");
        let tf: Timeframe = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(tf, Timeframe::M15);
    }

    #[test]
    fn unknown_timeframe_rejected() {
        assert!("3h".parse::<Timeframe>().is_err());
    }
}
