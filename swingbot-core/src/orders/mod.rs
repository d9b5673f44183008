//! Order lifecycle ownership: state machine, archive, audit trail.

pub mod lifecycle;

pub use lifecycle::{
    ClosedOrder, LifecycleConfig, LifecycleError, OrderEvent, OrderLifecycle, TransitionRecord,
};
