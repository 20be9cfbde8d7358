//! Capability-provider contract.
//!
//! Navigation, sensing, and gripping are black boxes to the
//! orchestrator: each attempt either succeeds with a
//! [`CapabilityOutcome`] (cost consumed, optional detail) or fails with
//! a typed [`CapabilityError`]. The core never looks inside a
//! provider; it only consumes this contract.

pub mod simulated;

use async_trait::async_trait;
use thiserror::Error;

use crate::inventory::Item;

pub use simulated::{SimulatedGripper, SimulatedNavigator, SimulatedSensor};

/// Error type for capability attempts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CapabilityError {
    #[error("Destination {0} unreachable")]
    Unreachable(String),

    #[error("Scan failed at {0}")]
    ScanFailed(String),

    #[error("Verification mismatch at {location}: expected {expected}, observed {observed}")]
    VerificationMismatch {
        location: String,
        expected: String,
        observed: String,
    },

    #[error("Gripper fault: {0}")]
    GripFault(String),
}

/// Result of a successful capability attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityOutcome {
    /// Cost the provider reports for the attempt.
    pub cost_consumed: f64,
    /// Human-readable detail for the operation log.
    pub detail: Option<String>,
}

impl CapabilityOutcome {
    pub fn new(cost_consumed: f64) -> Self {
        Self {
            cost_consumed,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Moves the robot between locations.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Where the robot currently is.
    fn location(&self) -> String;

    /// Attempt to reach a destination.
    async fn travel_to(&self, destination: &str) -> Result<CapabilityOutcome, CapabilityError>;
}

/// Verifies that a location holds the expected item.
#[async_trait]
pub trait Sensor: Send + Sync {
    async fn verify_item(
        &self,
        location: &str,
        expected_id: &str,
    ) -> Result<CapabilityOutcome, CapabilityError>;
}

/// Picks up and releases items.
#[async_trait]
pub trait Gripper: Send + Sync {
    async fn pick(&self, item: &Item) -> Result<CapabilityOutcome, CapabilityError>;

    /// Release whatever is held. Must succeed when nothing is held so
    /// error recovery can call it unconditionally.
    async fn release(&self) -> Result<CapabilityOutcome, CapabilityError>;
}
