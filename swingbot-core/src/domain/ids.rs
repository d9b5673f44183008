//! Typed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for an order, unique within one strategy instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_display() {
        assert_eq!(OrderId(42).to_string(), "#42");
    }

    #[test]
    fn order_id_serialization_roundtrip() {
        let id = OrderId(7);
        let json = serde_json::to_string(&id).unwrap();
        let deser: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deser);
    }
}
