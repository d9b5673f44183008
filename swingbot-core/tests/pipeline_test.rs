//! End-to-end fixtures through the public API: risk fixing into the
//! lifecycle, divergence classification on planted series, and a full
//! strategy instance run from candles to archived trades.

use chrono::{NaiveDate, NaiveDateTime};
use swingbot_core::config::{FamilyConfig, MaType, StrategyConfig};
use swingbot_core::divergence::{detect, DivergenceConfig};
use swingbot_core::domain::{
    Candle, DivergenceKind, Order, OrderId, OrderKind, OrderSide, OrderStatus, SwingKind,
    SwingPoint, Timeframe,
};
use swingbot_core::indicators::IndicatorSeries;
use swingbot_core::orders::{LifecycleConfig, OrderEvent, OrderLifecycle};
use swingbot_core::risk::{fix, RiskProfile, SlFixMode};
use swingbot_core::strategy::StrategyInstance;
use swingbot_core::swings::ZigZagMode;

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

fn hourly(i: i64, low: f64, high: f64, close: f64) -> Candle {
    Candle {
        open: close,
        high,
        low,
        close,
        volume: 1000.0,
        time: t0() + chrono::Duration::hours(i),
    }
}

fn flat(i: i64, price: f64) -> Candle {
    hourly(i, price - 0.01, price + 0.01, price)
}

fn eurusd_candidate() -> Order {
    Order {
        id: OrderId(0),
        side: OrderSide::Buy,
        kind: OrderKind::Market,
        entry: 1.08500,
        sl: Some(1.08200),
        tp: None,
        volume: 0.01,
        status: OrderStatus::Filled,
        strategy_tag: "fixture".into(),
        created_index: 0,
        created_time: t0(),
    }
}

fn profile(max_sl_pct: f64) -> RiskProfile {
    RiskProfile {
        max_sl_pct,
        min_rr: 0.0,
        min_reward_pct: 0.0,
        fix_mode: SlFixMode::AdjSl,
    }
}

// ── Risk fixture: 1.08500 entry, 1.08200 stop ────────────────────────

#[test]
fn loose_cap_accepts_the_eurusd_candidate_unchanged() {
    let order = fix(eurusd_candidate(), &profile(0.75)).unwrap();
    assert_eq!(order.entry, 1.08500);
    assert_eq!(order.sl, Some(1.08200));
}

#[test]
fn tight_cap_adjusts_the_stop_and_the_lifecycle_exits_there() {
    let order = fix(eurusd_candidate(), &profile(0.10)).unwrap();
    let sl = order.sl.unwrap();
    assert!((sl - 1.08392).abs() < 5e-6, "expected ~1.08392, got {sl}");

    // Run the fixed order through the lifecycle: a candle reaching the
    // adjusted stop closes the position there, not at the original stop.
    let mut lc = OrderLifecycle::new(LifecycleConfig { max_pending_bars: 0 });
    let (_, _) = lc.submit(order, 0);
    let events = lc.on_candle(&hourly(1, 1.08350, 1.08520, 1.08400), 1);
    match &events[0] {
        OrderEvent::Closed { status, exit_price, .. } => {
            assert_eq!(*status, OrderStatus::HitSl);
            assert!((exit_price - sl).abs() < 1e-12);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

// ── Divergence fixture: hidden bull at the lows ──────────────────────

#[test]
fn hidden_bull_on_the_planted_low_pair() {
    let point = |index: usize, price: f64, kind: SwingKind| SwingPoint {
        index,
        price,
        kind,
        time: t0() + chrono::Duration::hours(index as i64),
    };
    let points = vec![
        point(10, 1.0800, SwingKind::Trough),
        point(15, 1.0860, SwingKind::Peak),
        point(20, 1.0820, SwingKind::Trough),
    ];

    let mut series = IndicatorSeries::new();
    for i in 0..=20 {
        let v = match i {
            10 => -0.0010,
            20 => -0.0015,
            _ => f64::NAN,
        };
        series.push(v);
    }

    let cfg = DivergenceConfig {
        delta_price_pct: 0.1,
        delta_indicator: 0.0004,
        n_last_point: 3,
    };
    let event = detect(&points, &series, &cfg).expect("pair should diverge");
    assert_eq!(event.kind, DivergenceKind::HiddenBull);
    assert_eq!(event.indicator_pair, (-0.0010, -0.0015));
    assert!((event.delta_price_pct - 0.1852).abs() < 1e-3);
}

// ── Full instance run ────────────────────────────────────────────────

fn crossover_config() -> StrategyConfig {
    StrategyConfig {
        tf: Timeframe::H1,
        volume: 0.01,
        max_sl_pct: 10.0,
        sl_fix_mode: SlFixMode::AdjSl,
        min_zz_pct: 1.0,
        zz_dev: 1.0,
        zz_type: ZigZagMode::Direct,
        zz_kernel: 5,
        max_pending_bars: 0,
        family: FamilyConfig::Crossover {
            fast_ma: 2,
            slow_ma: 4,
            ma_type: MaType::Sma,
        },
    }
}

#[test]
fn crossover_instance_opens_and_archives_a_trade() {
    let mut inst = StrategyInstance::new("EURUSD", crossover_config());

    // Downtrend into a trough, rally into a golden cross.
    let tape = [106.0, 105.0, 104.0, 103.0, 100.0, 102.0, 105.0];
    let mut all_events = Vec::new();
    for (i, &p) in tape.iter().enumerate() {
        all_events.extend(inst.on_candle(&flat(i as i64, p)));
    }
    assert!(all_events
        .iter()
        .any(|e| matches!(e, OrderEvent::Created { .. })));
    assert_eq!(inst.lifecycle().open_orders().len(), 1);
    let order = &inst.lifecycle().open_orders()[0];
    assert_eq!(order.side, OrderSide::Buy);
    assert_eq!(order.status, OrderStatus::Filled);
    assert!(order.strategy_tag.starts_with("crossover-"));

    // Collapse through the stop.
    let sl = order.sl.unwrap();
    let events = inst.on_candle(&hourly(7, sl - 1.0, sl + 0.5, sl - 0.8));
    assert!(events.iter().any(|e| matches!(
        e,
        OrderEvent::Closed {
            status: OrderStatus::HitSl,
            ..
        }
    )));

    // The archive holds one losing trade; the audit trail saw exactly one
    // terminal transition.
    let closed = inst.lifecycle().closed();
    assert_eq!(closed.len(), 1);
    assert!(closed[0].pnl < 0.0);
    assert_eq!(closed[0].order.status, OrderStatus::HitSl);
    let terminal = inst
        .lifecycle()
        .audit()
        .iter()
        .filter(|t| t.to.is_terminal())
        .count();
    assert_eq!(terminal, 1);
}

#[test]
fn identical_tapes_produce_identical_archives() {
    let run = || {
        let mut inst = StrategyInstance::new("EURUSD", crossover_config());
        let tape = [106.0, 105.0, 104.0, 103.0, 100.0, 102.0, 105.0];
        for (i, &p) in tape.iter().enumerate() {
            inst.on_candle(&flat(i as i64, p));
        }
        inst.on_candle(&hourly(7, 98.0, 101.0, 99.0));
        inst.lifecycle()
            .closed()
            .iter()
            .map(|c| (c.order.id, c.exit_price.to_bits(), c.pnl.to_bits()))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
