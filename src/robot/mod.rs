//! The robot orchestrator.
//!
//! - explicit state machine (status enum + pure transition function)
//! - battery-gated task drive loop with proactive charging
//! - order admission and lifecycle bookkeeping
//! - read-only telemetry snapshots and a bounded operation log

mod agent_loop;
mod state;
mod telemetry;

pub use agent_loop::{Approval, AutoApprove, CycleOutcome, OrderReceipt, Robot, RobotDeps};
pub use state::{RobotEvent, RobotStatus, TransitionError, transition};
pub use telemetry::{LogEntry, OperationLog, RobotSnapshot};
