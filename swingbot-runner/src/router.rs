//! Stream routing — fan candles out across strategy instances.
//!
//! Instances are grouped per (symbol, timeframe) stream. Within one
//! stream every candle is applied strictly in arrival order by a single
//! logical writer; distinct streams replay concurrently on the rayon
//! pool. OMS dispatch runs after each candle's engine processing, once
//! the engine borrow has ended, so a slow or failing client never
//! corrupts order state and never blocks other streams.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use swingbot_core::config::StrategyConfig;
use swingbot_core::domain::{Candle, Timeframe};
use swingbot_core::orders::{ClosedOrder, OrderEvent};
use swingbot_core::strategy::StrategyInstance;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::data;
use crate::oms::OmsClient;
use crate::stats::{self, StrategySummary};

/// Identity of one candle stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamKey {
    pub symbol: String,
    pub tf: Timeframe,
}

impl StreamKey {
    pub fn new(symbol: impl Into<String>, tf: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            tf,
        }
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.symbol, self.tf)
    }
}

/// Per-stream replay outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamReport {
    pub key: StreamKey,
    pub candles: usize,
    pub events: usize,
}

/// Owns every strategy instance, grouped by stream.
#[derive(Default)]
pub struct Router {
    streams: HashMap<StreamKey, Vec<StrategyInstance>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a strategy to its (symbol, timeframe) stream, creating the
    /// stream on first use.
    pub fn register(&mut self, symbol: &str, cfg: StrategyConfig) -> StreamKey {
        let key = StreamKey::new(symbol, cfg.tf);
        self.streams
            .entry(key.clone())
            .or_default()
            .push(StrategyInstance::new(symbol, cfg));
        key
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    pub fn instance_count(&self) -> usize {
        self.streams.values().map(Vec::len).sum()
    }

    /// Replay candle tapes through their streams, in parallel across
    /// streams. Streams without a tape are reported with zero candles.
    /// Reports come back sorted by stream for deterministic output.
    pub fn run_replay(
        &mut self,
        tapes: &HashMap<StreamKey, Vec<Candle>>,
        oms: &dyn OmsClient,
    ) -> Vec<StreamReport> {
        let mut reports: Vec<StreamReport> = self
            .streams
            .par_iter_mut()
            .map(|(key, instances)| {
                let Some(tape) = tapes.get(key) else {
                    warn!(stream = %key, "no candle data for stream");
                    return StreamReport {
                        key: key.clone(),
                        candles: 0,
                        events: 0,
                    };
                };
                let mut events = 0;
                for candle in tape {
                    for inst in instances.iter_mut() {
                        let evs = inst.on_candle(candle);
                        events += evs.len();
                        dispatch(inst, &evs, oms);
                    }
                }
                StreamReport {
                    key: key.clone(),
                    candles: tape.len(),
                    events,
                }
            })
            .collect();
        reports.sort_by(|a, b| {
            (a.key.symbol.as_str(), a.key.tf.as_str())
                .cmp(&(b.key.symbol.as_str(), b.key.tf.as_str()))
        });
        reports
    }

    /// All archived orders across every instance.
    pub fn closed_orders(&self) -> Vec<ClosedOrder> {
        self.streams
            .values()
            .flatten()
            .flat_map(|inst| inst.lifecycle().closed().iter().cloned())
            .collect()
    }

    /// Per-strategy aggregates over the combined archives.
    pub fn summaries(&self) -> Vec<StrategySummary> {
        stats::summarize(&self.closed_orders())
    }

    /// Build a router holding every strategy a bot configuration names.
    pub fn from_config(cfg: &BotConfig) -> Self {
        let mut router = Self::new();
        for sym in &cfg.symbols {
            for strategy in &sym.strategies {
                router.register(&sym.symbol, strategy.clone());
            }
        }
        router
    }
}

/// Outcome of one full configured replay.
#[derive(Debug)]
pub struct BotRun {
    pub run_id: String,
    pub reports: Vec<StreamReport>,
    pub summaries: Vec<StrategySummary>,
}

/// Load every configured stream's candle tape and replay it end to end.
pub fn run_bot(cfg: &BotConfig, oms: &dyn OmsClient) -> Result<BotRun> {
    let mut router = Router::from_config(cfg);

    let mut tapes: HashMap<StreamKey, Vec<Candle>> = HashMap::new();
    for sym in &cfg.symbols {
        for strategy in &sym.strategies {
            let key = StreamKey::new(&sym.symbol, strategy.tf);
            if tapes.contains_key(&key) {
                continue;
            }
            let candles =
                data::load_months(&cfg.data_dir, &sym.symbol, strategy.tf, sym.year, &sym.months)
                    .with_context(|| format!("loading candles for {key}"))?;
            tapes.insert(key, candles);
        }
    }

    let run_id = cfg.run_id();
    info!(
        run_id = %run_id,
        streams = router.stream_count(),
        instances = router.instance_count(),
        "starting replay"
    );
    let reports = router.run_replay(&tapes, oms);
    let summaries = router.summaries();
    Ok(BotRun {
        run_id,
        reports,
        summaries,
    })
}

/// Mirror one candle's lifecycle events to the OMS.
///
/// Fills need no call; the venue observes its own fills. A submit for an
/// order that already left the book same-candle is looked up in the
/// archive so the venue still sees it.
fn dispatch(inst: &StrategyInstance, events: &[OrderEvent], oms: &dyn OmsClient) {
    for ev in events {
        let result = match ev {
            OrderEvent::Created { id } => {
                let order = inst.lifecycle().order(*id).cloned().or_else(|| {
                    inst.lifecycle()
                        .closed()
                        .iter()
                        .rev()
                        .find(|c| c.order.id == *id)
                        .map(|c| c.order.clone())
                });
                match order {
                    Some(order) => oms.submit(&order),
                    None => {
                        warn!(%id, "created order vanished before dispatch");
                        continue;
                    }
                }
            }
            OrderEvent::Filled { .. } => continue,
            OrderEvent::SlAdjusted { id, to, .. } => oms.adjust_sl(*id, *to),
            OrderEvent::Closed { id, .. } => oms.close(*id),
            OrderEvent::Cancelled { id, .. } => oms.close(*id),
        };
        if let Err(err) = result {
            warn!(
                tag = inst.strategy_tag(),
                %err,
                retryable = err.is_retryable(),
                "oms call failed"
            );
        }
    }
}
