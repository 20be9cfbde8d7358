//! Crate-level error taxonomy.
//!
//! Validation errors are reported synchronously at admission and never
//! enter the queue. Capability failures during execution are recovered
//! at the orchestration level and do not surface here; only
//! contract violations that indicate a bug escape as [`RobotError`].

use thiserror::Error;

use crate::battery::BatteryError;
use crate::inventory::InventoryError;
use crate::robot::TransitionError;

/// Reasons an order is rejected at admission time.
#[derive(Debug, Error, PartialEq)]
pub enum AdmissionError {
    #[error("Order contains no lines")]
    EmptyOrder,

    #[error("Unknown item {0}")]
    UnknownItem(String),

    #[error("Quantity for item {item} must be positive, got {quantity}")]
    InvalidQuantity { item: String, quantity: u32 },

    #[error("Order requests {count} units, maximum is {max}")]
    TooManyItems { count: u32, max: u32 },
}

/// Orchestration-fatal conditions.
///
/// Every variant indicates a broken internal contract, not a bad
/// environment: the battery gate was consumed without a prior
/// capability check, the dual index diverged, or the state machine was
/// driven through an illegal transition.
#[derive(Debug, Error)]
pub enum RobotError {
    #[error("Battery contract violated: {0}")]
    Battery(#[from] BatteryError),

    #[error("Inventory fault: {0}")]
    Inventory(#[from] InventoryError),

    #[error("State machine fault: {0}")]
    Transition(#[from] TransitionError),
}
