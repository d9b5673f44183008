//! Order-management-system boundary.
//!
//! The engine owns order state; the OMS client only mirrors decisions
//! outward (submit, stop adjustment, close). Calls are fire-and-confirm:
//! an acknowledgement is logged, a failure is logged with its retry
//! class, and neither blocks candle processing. Implementations must be
//! `Send + Sync` so streams on different rayon workers can share one
//! client.

use swingbot_core::domain::{Order, OrderId};
use thiserror::Error;

/// Errors an OMS client can surface.
#[derive(Debug, Error)]
pub enum OmsError {
    /// The venue understood the request and said no. Retrying the same
    /// request will not help.
    #[error("rejected by venue: {reason}")]
    Rejected { reason: String },

    /// The request may never have reached the venue.
    #[error("transport failure: {reason}")]
    Transport { reason: String },
}

impl OmsError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, OmsError::Transport { .. })
    }
}

/// Acknowledgement of a single OMS request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmsAck {
    pub id: OrderId,
}

/// Outbound order interface.
///
/// One method per externally visible decision. The engine never reads
/// state back through this trait; candle data is the single source of
/// truth for fills and exits.
pub trait OmsClient: Send + Sync {
    fn submit(&self, order: &Order) -> Result<OmsAck, OmsError>;
    fn adjust_sl(&self, id: OrderId, new_sl: f64) -> Result<OmsAck, OmsError>;
    fn close(&self, id: OrderId) -> Result<OmsAck, OmsError>;
}

/// Client that acknowledges everything. Used for backtests and dry runs.
#[derive(Debug, Default)]
pub struct NullOms;

impl OmsClient for NullOms {
    fn submit(&self, order: &Order) -> Result<OmsAck, OmsError> {
        Ok(OmsAck { id: order.id })
    }

    fn adjust_sl(&self, id: OrderId, _new_sl: f64) -> Result<OmsAck, OmsError> {
        Ok(OmsAck { id })
    }

    fn close(&self, id: OrderId) -> Result<OmsAck, OmsError> {
        Ok(OmsAck { id })
    }
}
