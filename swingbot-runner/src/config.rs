//! Bot configuration — which symbols to run, over which months, with
//! which strategies.
//!
//! The TOML layout mirrors the runtime shape: one `[[symbols]]` block per
//! symbol with its data window, containing one `[[symbols.strategies]]`
//! table per strategy attached to that symbol. Strategy tables use the
//! flat per-family layout defined in `swingbot_core::config`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use swingbot_core::config::StrategyConfig;
use thiserror::Error;

/// Errors from loading or validating a bot configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config has no symbols")]
    NoSymbols,

    #[error("symbol {symbol}: {reason}")]
    Invalid { symbol: String, reason: String },
}

/// One symbol's data window and its attached strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolConfig {
    pub symbol: String,
    pub year: i32,
    pub months: Vec<u32>,
    pub strategies: Vec<StrategyConfig>,
}

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Directory holding the monthly candle CSV files.
    pub data_dir: PathBuf,
    pub symbols: Vec<SymbolConfig>,
}

impl BotConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: BotConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Structural validation beyond what serde enforces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        for sym in &self.symbols {
            let invalid = |reason: String| ConfigError::Invalid {
                symbol: sym.symbol.clone(),
                reason,
            };
            if sym.symbol.trim().is_empty() {
                return Err(invalid("empty symbol name".into()));
            }
            if sym.months.is_empty() {
                return Err(invalid("no months configured".into()));
            }
            if let Some(&m) = sym.months.iter().find(|&&m| !(1..=12).contains(&m)) {
                return Err(invalid(format!("month {m} out of range 1..=12")));
            }
            if sym.strategies.is_empty() {
                return Err(invalid("no strategies configured".into()));
            }
            for s in &sym.strategies {
                if s.volume <= 0.0 {
                    return Err(invalid(format!("volume {} must be positive", s.volume)));
                }
                if s.max_sl_pct <= 0.0 {
                    return Err(invalid(format!(
                        "max_sl_pct {} must be positive",
                        s.max_sl_pct
                    )));
                }
                if s.min_zz_pct <= 0.0 || s.zz_dev <= 0.0 {
                    return Err(invalid("zigzag parameters must be positive".into()));
                }
            }
            let mut tags: Vec<String> =
                sym.strategies.iter().map(|s| s.strategy_tag()).collect();
            tags.sort();
            tags.dedup();
            if tags.len() != sym.strategies.len() {
                return Err(invalid("duplicate strategy configuration".into()));
            }
        }
        Ok(())
    }

    /// Deterministic fingerprint of the whole configuration, used to name
    /// runs and their exported artifacts.
    pub fn run_id(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }
}
