//! Trend-line fitting over confirmed swing points.
//!
//! A line is a least-squares fit of `price` against absolute candle
//! `index`. `fit_ratio` reports how many of the fitted points sit within
//! a percent band around the line, so callers can reject sloppy fits.

use crate::domain::{SwingKind, SwingPoint, TrendLine};
use serde::{Deserialize, Serialize};

/// Trend confirmation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Number of most-recent swing points to fit over.
    pub n_trend_point: usize,
    /// Band half-width, percent of each point's price.
    pub tolerance_pct: f64,
    /// Minimum total move from first to last fitted point, percent.
    pub min_trend_pct: f64,
    /// Minimum acceptable fit_ratio in [0, 1].
    pub min_updown_ratio: f64,
}

/// Least-squares line through the given swing points.
///
/// Returns `None` for fewer than two points or a degenerate x-spread.
pub fn fit_line(points: &[SwingPoint], tolerance_pct: f64) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_xy = 0.0;
    for p in points {
        let x = p.index as f64;
        sum_x += x;
        sum_y += p.price;
        sum_xx += x * x;
        sum_xy += x * p.price;
    }
    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let band = tolerance_pct / 100.0;
    let within = points
        .iter()
        .filter(|p| {
            let fitted = slope * p.index as f64 + intercept;
            (p.price - fitted).abs() <= band * p.price
        })
        .count();
    let fit_ratio = within as f64 / n;

    let first = *points.first()?;
    let last = *points.last()?;
    Some(TrendLine {
        slope,
        intercept,
        fit_ratio,
        first,
        last,
    })
}

/// Fit over the last `n` points of one kind (peak line or trough line).
pub fn fit_kind_line(
    points: &[SwingPoint],
    kind: SwingKind,
    n: usize,
    tolerance_pct: f64,
) -> Option<TrendLine> {
    let mut selected: Vec<SwingPoint> = points
        .iter()
        .rev()
        .filter(|p| p.kind == kind)
        .take(n)
        .copied()
        .collect();
    selected.reverse();
    fit_line(&selected, tolerance_pct)
}

/// Fit the last `n_trend_point` swing points and accept the line only if
/// the move is large enough and the points actually track it.
pub fn confirm_trend(points: &[SwingPoint], cfg: &TrendConfig) -> Option<TrendLine> {
    if cfg.n_trend_point < 2 || points.len() < cfg.n_trend_point {
        return None;
    }
    let window = &points[points.len() - cfg.n_trend_point..];
    let line = fit_line(window, cfg.tolerance_pct)?;

    let first = window.first()?;
    let last = window.last()?;
    let move_pct = ((last.price - first.price) / first.price).abs() * 100.0;
    if move_pct < cfg.min_trend_pct {
        return None;
    }
    if line.fit_ratio < cfg.min_updown_ratio {
        return None;
    }
    Some(line)
}
