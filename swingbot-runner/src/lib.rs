//! Swingbot Runner — multi-stream driver around `swingbot-core`.
//!
//! This crate builds on the per-stream engine to provide:
//! - Monthly candle CSV loading with explicit missing/empty-file errors
//! - TOML bot configuration (symbols, data windows, strategy tables)
//! - The `OmsClient` boundary that mirrors order decisions outward
//! - Stream routing: in-order candles per stream, rayon across streams
//! - Per-strategy statistics recomputed from the closed-order archives

pub mod config;
pub mod data;
pub mod oms;
pub mod router;
pub mod stats;

pub use config::{BotConfig, ConfigError, SymbolConfig};
pub use data::{load_month, load_months, monthly_file_name, DataError};
pub use oms::{NullOms, OmsAck, OmsClient, OmsError};
pub use router::{run_bot, BotRun, Router, StreamKey, StreamReport};
pub use stats::{export_csv, summarize, StrategySummary};

/// Install the process-wide tracing subscriber, honoring `RUST_LOG`.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
