//! Price/indicator divergence over same-kind swing pairs.
//!
//! Each confirmed swing point is paired with the indicator sample at its
//! candle index. The newest point is compared against up to `n_last_point`
//! prior points of the same kind, most recent first, and the first
//! qualifying pair is reported. Both the price delta and the indicator
//! delta must clear their thresholds; a pair failing either produces no
//! event at all.

use crate::domain::{DivergenceEvent, DivergenceKind, SwingKind, SwingPoint};
use crate::indicators::IndicatorSeries;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DivergenceConfig {
    /// Minimum price move between the pair, percent of the older price.
    pub delta_price_pct: f64,
    /// Minimum indicator move between the pair, indicator units.
    pub delta_indicator: f64,
    /// How many prior same-kind points to examine against the newest.
    pub n_last_point: usize,
}

/// Classify one (older, newer) same-kind pair. `None` when price and
/// indicator agree in direction or either leg is flat.
fn classify(
    kind: SwingKind,
    older_price: f64,
    newer_price: f64,
    older_ind: f64,
    newer_ind: f64,
) -> Option<DivergenceKind> {
    let price_up = newer_price > older_price;
    let price_down = newer_price < older_price;
    let ind_up = newer_ind > older_ind;
    let ind_down = newer_ind < older_ind;

    match kind {
        SwingKind::Peak => {
            if price_up && ind_down {
                Some(DivergenceKind::RegularBear)
            } else if price_down && ind_up {
                Some(DivergenceKind::HiddenBear)
            } else {
                None
            }
        }
        SwingKind::Trough => {
            if price_down && ind_up {
                Some(DivergenceKind::RegularBull)
            } else if price_up && ind_down {
                Some(DivergenceKind::HiddenBull)
            } else {
                None
            }
        }
    }
}

/// Look for a divergence ending at the newest confirmed swing point.
///
/// Returns the most recent qualifying pair, not the strongest. Points
/// whose candle index has no indicator sample (warmup, gap rebuild) are
/// skipped.
pub fn detect(
    points: &[SwingPoint],
    indicator: &IndicatorSeries,
    cfg: &DivergenceConfig,
) -> Option<DivergenceEvent> {
    let newest = points.last()?;
    let newest_ind = indicator.value_at(newest.index)?;

    let mut examined = 0usize;
    for older in points.iter().rev().skip(1) {
        if older.kind != newest.kind {
            continue;
        }
        if examined >= cfg.n_last_point {
            break;
        }
        examined += 1;

        let older_ind = match indicator.value_at(older.index) {
            Some(v) => v,
            None => continue,
        };

        let kind = match classify(newest.kind, older.price, newest.price, older_ind, newest_ind) {
            Some(k) => k,
            None => continue,
        };

        let delta_price_pct = (newest.price - older.price) / older.price * 100.0;
        let delta_indicator = newest_ind - older_ind;
        if delta_price_pct.abs() < cfg.delta_price_pct
            || delta_indicator.abs() < cfg.delta_indicator
        {
            continue;
        }

        return Some(DivergenceEvent {
            kind,
            price_pair: (*older, *newest),
            indicator_pair: (older_ind, newest_ind),
            delta_price_pct,
            delta_indicator,
        });
    }
    None
}
