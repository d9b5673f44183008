//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Swing alternation — confirmed points strictly alternate kind and
//!    neighbors are separated by at least the reversal threshold
//! 2. Risk bounds — accepted orders always satisfy the side/level
//!    invariant and the stop-loss cap, whatever the fix mode
//! 3. SL-over-TP precedence — a candle covering both levels always exits
//!    at the stop
//! 4. Ratchet monotonicity — trailing stops only tighten, never loosen
//! 5. Pending timeout — unfilled limits cancel exactly at the configured
//!    bar count

use chrono::NaiveDate;
use proptest::prelude::*;
use swingbot_core::domain::{
    Candle, Order, OrderId, OrderKind, OrderSide, OrderStatus, SwingKind,
};
use swingbot_core::orders::{LifecycleConfig, OrderEvent, OrderLifecycle};
use swingbot_core::risk::{fix, RiskProfile, SlFixMode};
use swingbot_core::swings::{ZigZag, ZigZagConfig};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (10.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_walk(len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-0.03..0.03_f64, len).prop_map(|steps| {
        let mut price = 100.0;
        steps
            .iter()
            .map(|s| {
                price *= 1.0 + s;
                price
            })
            .collect()
    })
}

fn arb_fix_mode() -> impl Strategy<Value = SlFixMode> {
    prop_oneof![
        Just(SlFixMode::AdjSl),
        Just(SlFixMode::AdjEntry),
        Just(SlFixMode::Ignore),
    ]
}

fn candle(i: usize, price: f64) -> Candle {
    Candle {
        open: price,
        high: price * 1.001,
        low: price * 0.999,
        close: price,
        volume: 1000.0,
        time: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
            + chrono::Duration::hours(i as i64),
    }
}

fn candidate(side: OrderSide, entry: f64, sl: f64, tp: Option<f64>) -> Order {
    Order {
        id: OrderId(1),
        side,
        kind: OrderKind::Market,
        entry,
        sl: Some(sl),
        tp,
        volume: 1.0,
        status: OrderStatus::Filled,
        strategy_tag: "prop".into(),
        created_index: 0,
        created_time: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    }
}

// ── 1. Swing alternation ─────────────────────────────────────────────

proptest! {
    /// Confirmed swing kinds strictly alternate on any random walk, and
    /// each peak/trough pair is separated by at least the threshold.
    #[test]
    fn swings_alternate_and_clear_threshold(walk in arb_walk(200)) {
        let cfg = ZigZagConfig::direct(1.0, 1.0);
        let thr = 0.01; // min_zz_pct * zz_dev percent as a fraction
        let mut zz = ZigZag::new(cfg);
        for (i, &p) in walk.iter().enumerate() {
            zz.update(i, &candle(i, p));
        }
        let points = zz.points();
        for pair in points.windows(2) {
            prop_assert_ne!(pair[0].kind, pair[1].kind, "kinds must alternate");
            let (peak, trough) = match pair[0].kind {
                SwingKind::Peak => (&pair[0], &pair[1]),
                SwingKind::Trough => (&pair[1], &pair[0]),
            };
            prop_assert!(
                peak.price >= trough.price * (1.0 + thr) - 1e-9,
                "neighbors too close: peak {} trough {}",
                peak.price,
                trough.price
            );
        }
        for pair in points.windows(2) {
            prop_assert!(pair[0].index < pair[1].index, "indices must increase");
        }
    }

    /// Identical input produces identical output.
    #[test]
    fn extraction_is_deterministic(walk in arb_walk(120)) {
        let mut a = ZigZag::new(ZigZagConfig::direct(0.8, 1.5));
        let mut b = ZigZag::new(ZigZagConfig::direct(0.8, 1.5));
        for (i, &p) in walk.iter().enumerate() {
            a.update(i, &candle(i, p));
            b.update(i, &candle(i, p));
        }
        prop_assert_eq!(a.points(), b.points());
    }
}

// ── 2. Risk bounds ───────────────────────────────────────────────────

proptest! {
    /// Whatever the fix mode, an accepted order satisfies the level
    /// invariant and the stop-loss cap.
    #[test]
    fn accepted_orders_respect_cap_and_levels(
        entry in arb_price(),
        sl_gap in 0.001..0.2_f64,
        max_sl_pct in 0.05..5.0_f64,
        mode in arb_fix_mode(),
        buy in prop::bool::ANY,
    ) {
        let side = if buy { OrderSide::Buy } else { OrderSide::Sell };
        let sl = match side {
            OrderSide::Buy => entry * (1.0 - sl_gap),
            OrderSide::Sell => entry * (1.0 + sl_gap),
        };
        let profile = RiskProfile {
            max_sl_pct,
            min_rr: 0.0,
            min_reward_pct: 0.0,
            fix_mode: mode,
        };
        if let Ok(order) = fix(candidate(side, entry, sl, None), &profile) {
            prop_assert!(order.validate_levels().is_ok());
            let sl = order.sl.unwrap();
            let risk_pct = (order.entry - sl).abs() / order.entry * 100.0;
            prop_assert!(risk_pct <= max_sl_pct + 1e-9,
                "risk {risk_pct} exceeds cap {max_sl_pct}");
        }
    }

    /// `Ignore` either accepts an already-compliant candidate unchanged or
    /// produces no order at all.
    #[test]
    fn ignore_never_modifies(
        entry in arb_price(),
        sl_gap in 0.001..0.2_f64,
        max_sl_pct in 0.05..5.0_f64,
    ) {
        let sl = entry * (1.0 - sl_gap);
        let profile = RiskProfile {
            max_sl_pct,
            min_rr: 0.0,
            min_reward_pct: 0.0,
            fix_mode: SlFixMode::Ignore,
        };
        match fix(candidate(OrderSide::Buy, entry, sl, None), &profile) {
            Ok(order) => {
                prop_assert_eq!(order.entry, entry);
                prop_assert_eq!(order.sl, Some(sl));
            }
            Err(_) => {
                let risk_pct = sl_gap * 100.0;
                prop_assert!(risk_pct > max_sl_pct - 1e-6);
            }
        }
    }

    /// After an `AdjEntry` fix the order is a pending limit with the risk
    /// distance exactly at the cap.
    #[test]
    fn adj_entry_lands_exactly_on_cap(
        entry in arb_price(),
        sl_gap in 0.02..0.2_f64,
        buy in prop::bool::ANY,
    ) {
        let side = if buy { OrderSide::Buy } else { OrderSide::Sell };
        let sl = match side {
            OrderSide::Buy => entry * (1.0 - sl_gap),
            OrderSide::Sell => entry * (1.0 + sl_gap),
        };
        let max_sl_pct = 1.0; // below every generated gap
        let profile = RiskProfile {
            max_sl_pct,
            min_rr: 0.0,
            min_reward_pct: 0.0,
            fix_mode: SlFixMode::AdjEntry,
        };
        let order = fix(candidate(side, entry, sl, None), &profile).unwrap();
        prop_assert_eq!(order.kind, OrderKind::Limit);
        prop_assert_eq!(order.status, OrderStatus::Pending);
        prop_assert_eq!(order.sl, Some(sl));
        let risk_pct = (order.entry - sl).abs() / order.entry * 100.0;
        prop_assert!((risk_pct - max_sl_pct).abs() < 1e-9);
    }
}

// ── 3. SL-over-TP precedence ─────────────────────────────────────────

proptest! {
    /// A candle whose range covers both levels always exits at the stop.
    #[test]
    fn sl_beats_tp_when_both_touched(
        entry in arb_price(),
        sl_gap in 0.005..0.05_f64,
        tp_gap in 0.005..0.05_f64,
        buy in prop::bool::ANY,
    ) {
        let side = if buy { OrderSide::Buy } else { OrderSide::Sell };
        let (sl, tp) = match side {
            OrderSide::Buy => (entry * (1.0 - sl_gap), entry * (1.0 + tp_gap)),
            OrderSide::Sell => (entry * (1.0 + sl_gap), entry * (1.0 - tp_gap)),
        };
        let mut lc = OrderLifecycle::new(LifecycleConfig { max_pending_bars: 0 });
        lc.submit(candidate(side, entry, sl, Some(tp)), 0);

        let lo = sl.min(tp) * 0.999;
        let hi = sl.max(tp) * 1.001;
        let wide = Candle {
            open: entry,
            high: hi,
            low: lo,
            close: entry,
            volume: 1.0,
            time: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap(),
        };
        let events = lc.on_candle(&wide, 1);
        let stopped_out = matches!(
            events[0],
            OrderEvent::Closed { status: OrderStatus::HitSl, .. }
        );
        prop_assert!(stopped_out, "expected a stop exit, got {:?}", events[0]);
    }
}

// ── 4. Ratchet monotonicity ──────────────────────────────────────────

proptest! {
    /// A BUY stop never decreases across arbitrary adjustment proposals;
    /// a SELL stop never increases.
    #[test]
    fn trailing_stop_only_tightens(
        proposals in proptest::collection::vec(50.0..150.0_f64, 1..30),
        buy in prop::bool::ANY,
    ) {
        let side = if buy { OrderSide::Buy } else { OrderSide::Sell };
        let (entry, sl) = match side {
            OrderSide::Buy => (100.0, 90.0),
            OrderSide::Sell => (100.0, 110.0),
        };
        let mut lc = OrderLifecycle::new(LifecycleConfig { max_pending_bars: 0 });
        let (id, _) = lc.submit(candidate(side, entry, sl, None), 0);

        let mut last = sl;
        for p in proposals {
            lc.adjust_sl(id, p).unwrap();
            let current = lc.order(id).unwrap().sl.unwrap();
            match side {
                OrderSide::Buy => prop_assert!(current >= last - 1e-12),
                OrderSide::Sell => prop_assert!(current <= last + 1e-12),
            }
            last = current;
        }
    }
}

// ── 5. Pending timeout ───────────────────────────────────────────────

proptest! {
    /// An unfilled limit cancels exactly when its age reaches the
    /// configured bar count, never earlier.
    #[test]
    fn pending_cancels_exactly_at_limit(max_bars in 1usize..20) {
        let mut lc = OrderLifecycle::new(LifecycleConfig { max_pending_bars: max_bars });
        // Entry far below the tape: never fills.
        let (id, _) = lc.submit(candidate(OrderSide::Buy, 50.0, 49.0, None), 0);

        for i in 1..=max_bars + 1 {
            let events = lc.on_candle(&candle(i, 100.0), i);
            if i < max_bars {
                prop_assert!(events.is_empty(), "cancelled early at bar {i}");
            } else if i == max_bars {
                let cancelled = matches!(events[0], OrderEvent::Cancelled { .. });
                prop_assert!(cancelled, "expected a cancel at bar {i}, got {:?}", events[0]);
            } else {
                prop_assert!(events.is_empty(), "events after archive");
            }
        }
        prop_assert!(lc.order(id).is_none());
    }
}
