//! Autonomous warehouse fulfilment robot.
//!
//! The crate models a single robot that:
//! - admits customer orders against a dual-indexed inventory,
//! - decomposes them into per-line retrieval tasks on a strict FIFO queue,
//! - drives each task through navigate → verify → grip → stage → pack,
//! - gates every physical step on a depleting battery, charging
//!   proactively so no operation is ever attempted that cannot finish,
//! - packs retrieved items heaviest-first via a LIFO staging discipline.
//!
//! Capability providers (navigation, sensing, gripping) are black boxes
//! behind async traits; simulated implementations with configurable
//! failure rates live in [`capability::simulated`].

pub mod battery;
pub mod capability;
pub mod config;
pub mod error;
pub mod inventory;
pub mod order;
pub mod packing;
pub mod queue;
pub mod robot;
pub mod station;

pub use battery::{Battery, BatteryError};
pub use capability::{
    CapabilityError, CapabilityOutcome, Gripper, Navigator, Sensor, SimulatedGripper,
    SimulatedNavigator, SimulatedSensor,
};
pub use config::{AutomationMode, ConfigError, RobotConfig, SimulationProfile};
pub use error::{AdmissionError, RobotError};
pub use inventory::{Inventory, InventoryError, Item, ItemSpec, SharedInventory};
pub use order::{Order, OrderBook, OrderLine, OrderStatus, Task, TaskStatus};
pub use packing::{PackingOptimizer, pack_sequence};
pub use queue::{QueueError, TaskQueue};
pub use robot::{
    Approval, AutoApprove, CycleOutcome, LogEntry, OrderReceipt, Robot, RobotDeps, RobotEvent,
    RobotSnapshot, RobotStatus, transition,
};
pub use station::PackingStation;
