//! Domain types — candles, swing points, trend lines, divergence events, orders.

pub mod candle;
pub mod divergence;
pub mod ids;
pub mod order;
pub mod swing;

pub use candle::{Candle, Timeframe};
pub use divergence::{DivergenceEvent, DivergenceKind};
pub use ids::OrderId;
pub use order::{LevelError, Order, OrderKind, OrderSide, OrderStatus};
pub use swing::{SwingKind, SwingPoint, TrendLine};
