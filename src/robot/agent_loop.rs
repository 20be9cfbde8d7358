//! The robot orchestrator.
//!
//! One robot per process. [`Robot::submit_order`] is the admission
//! surface: it validates an order against the inventory, decomposes it
//! into per-line tasks, and queues them. [`Robot::run_cycle`] drains
//! one task through navigate → verify → grip → stage → pack, consulting
//! the battery gate before every physical step and charging proactively
//! so a step is never attempted that cannot finish. Capability failures
//! are recovered here (task failed, cleanup, back to idle); only broken
//! internal contracts escape as [`RobotError`].

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::battery::Battery;
use crate::capability::{Gripper, Navigator, Sensor};
use crate::config::{AutomationMode, ConfigError, RobotConfig};
use crate::error::{AdmissionError, RobotError};
use crate::inventory::{InventoryError, Item, SharedInventory};
use crate::order::{Order, OrderBook, OrderStatus, Task, TaskStatus};
use crate::packing::PackingOptimizer;
use crate::queue::{QueueError, TaskQueue};
use crate::station::PackingStation;

use super::state::{RobotEvent, RobotStatus, transition};
use super::telemetry::{LogEntry, OperationLog, RobotSnapshot};

/// Where retrieved items are staged and packed.
const STATION_LOCATION: &str = "PACK-1";

/// Confirmation seam consulted before guarded transitions in
/// semi-automatic mode.
#[async_trait]
pub trait Approval: Send + Sync {
    /// Return false to veto the described action.
    async fn confirm(&self, action: &str) -> bool;
}

/// Approves everything; the full-automatic default.
pub struct AutoApprove;

#[async_trait]
impl Approval for AutoApprove {
    async fn confirm(&self, _action: &str) -> bool {
        true
    }
}

/// Collaborators injected into the robot.
pub struct RobotDeps {
    pub inventory: SharedInventory,
    pub navigator: Arc<dyn Navigator>,
    pub sensor: Arc<dyn Sensor>,
    pub gripper: Arc<dyn Gripper>,
    pub approval: Arc<dyn Approval>,
}

/// Answer returned by [`Robot::submit_order`] on admission.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub reference: String,
    pub tasks_queued: usize,
}

/// What one call to [`Robot::run_cycle`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Nothing queued; an empty queue is a valid steady state.
    QueueEmpty,
    TaskCompleted {
        task_id: Uuid,
        order_id: Uuid,
        order_status: OrderStatus,
    },
    TaskFailed {
        task_id: Uuid,
        order_id: Uuid,
        reason: String,
    },
}

/// Outcome of a single step inside a task.
///
/// `Failed` is the recoverable path (task fails, robot cleans up);
/// `Fatal` is a broken internal contract that must surface.
enum StepError {
    Failed(String),
    Fatal(RobotError),
}

impl From<RobotError> for StepError {
    fn from(error: RobotError) -> Self {
        Self::Fatal(error)
    }
}

/// The single orchestrator instance.
pub struct Robot {
    config: RobotConfig,
    deps: RobotDeps,
    status: RobotStatus,
    battery: Battery,
    queue: TaskQueue,
    orders: OrderBook,
    station: PackingStation,
    optimizer: PackingOptimizer,
    held: Option<Item>,
    log: OperationLog,
}

impl Robot {
    pub fn new(config: RobotConfig, deps: RobotDeps) -> Result<Self, ConfigError> {
        config.validate()?;
        let battery = Battery::with_level(config.max_capacity, config.initial_capacity);
        let log = OperationLog::new(config.operation_log_capacity);
        Ok(Self {
            deps,
            status: RobotStatus::Idle,
            battery,
            queue: TaskQueue::new(),
            orders: OrderBook::new(),
            station: PackingStation::new(STATION_LOCATION),
            optimizer: PackingOptimizer::new(),
            held: None,
            log,
            config,
        })
    }

    /// Admit an order: validate every line against the inventory,
    /// decompose into one task per line, and queue them FIFO.
    ///
    /// Rejections are synchronous and nothing is queued; runtime
    /// capability failures never propagate back to this caller.
    pub fn submit_order(&mut self, order: Order) -> Result<OrderReceipt, AdmissionError> {
        if order.lines.is_empty() {
            return Err(AdmissionError::EmptyOrder);
        }
        let units = order.unit_count();
        if units > self.config.max_items_per_order {
            return Err(AdmissionError::TooManyItems {
                count: units,
                max: self.config.max_items_per_order,
            });
        }
        for line in &order.lines {
            if line.quantity == 0 {
                return Err(AdmissionError::InvalidQuantity {
                    item: line.item_id.clone(),
                    quantity: line.quantity,
                });
            }
            if !self.deps.inventory.contains(&line.item_id) {
                return Err(AdmissionError::UnknownItem(line.item_id.clone()));
            }
        }

        let order_id = order.id;
        let tasks: Vec<Task> = order
            .lines
            .iter()
            .map(|line| Task::new(order_id, &line.item_id, line.quantity))
            .collect();
        let tasks_queued = tasks.len();
        for task in tasks {
            if let Err(QueueError::UnknownItem(id)) = self.queue.enqueue(task, &self.deps.inventory)
            {
                // An item vanished between validation and enqueue; drop
                // any siblings already queued so rejection leaves no trace.
                self.queue.cancel_order(order_id);
                return Err(AdmissionError::UnknownItem(id));
            }
        }
        let reference = self.orders.register(order, tasks_queued);

        tracing::info!(%order_id, %reference, tasks_queued, "order admitted");
        self.log_op(format!(
            "[ORDER] admitted {reference} with {tasks_queued} task(s)"
        ));
        Ok(OrderReceipt {
            order_id,
            reference,
            tasks_queued,
        })
    }

    /// Process at most one task from the queue.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, RobotError> {
        let mut task = match self.queue.dequeue() {
            Ok(task) => task,
            Err(_) => {
                tracing::trace!("queue empty, staying idle");
                return Ok(CycleOutcome::QueueEmpty);
            }
        };
        task.status = TaskStatus::Active;
        self.orders.begin(task.order_id);
        let reference = self.order_reference(task.order_id);
        self.log_op(format!(
            "[TASK] {reference}: retrieving {}x {}",
            task.quantity, task.item_id
        ));
        self.apply(RobotEvent::TaskDequeued)?;

        match self.execute_task(&task).await {
            Ok(order_status) => {
                task.status = TaskStatus::Done;
                self.log_op(format!("[TASK] {reference}: task complete"));
                if order_status == OrderStatus::Completed {
                    self.log_op(format!("[ORDER] {reference} complete"));
                }
                Ok(CycleOutcome::TaskCompleted {
                    task_id: task.id,
                    order_id: task.order_id,
                    order_status,
                })
            }
            Err(StepError::Fatal(error)) => Err(error),
            Err(StepError::Failed(reason)) => {
                self.recover_from_failure(&mut task, &reason).await?;
                Ok(CycleOutcome::TaskFailed {
                    task_id: task.id,
                    order_id: task.order_id,
                    reason,
                })
            }
        }
    }

    /// Abort an order's still-queued tasks. Returns how many were
    /// removed from the queue.
    ///
    /// A task already dequeued is not interrupted; aborting mid-flight
    /// happens only through the error recovery path. When any task was
    /// cancelled the order can no longer complete, so it is failed and
    /// its staged items are discarded.
    pub fn cancel_order(&mut self, order_id: Uuid) -> usize {
        let cancelled = self.queue.cancel_order(order_id);
        if cancelled > 0 {
            self.orders.fail(order_id);
            let discarded = self.station.clear_order(order_id);
            let reference = self.order_reference(order_id);
            tracing::info!(%order_id, cancelled, discarded, "order cancelled");
            self.log_op(format!(
                "[CANCEL] {reference}: dropped {cancelled} queued task(s)"
            ));
        }
        cancelled
    }

    /// Run cycles until the queue is empty, collecting the outcomes.
    pub async fn drain_queue(&mut self) -> Result<Vec<CycleOutcome>, RobotError> {
        let mut outcomes = Vec::new();
        loop {
            match self.run_cycle().await? {
                CycleOutcome::QueueEmpty => break,
                outcome => outcomes.push(outcome),
            }
        }
        Ok(outcomes)
    }

    async fn execute_task(&mut self, task: &Task) -> Result<OrderStatus, StepError> {
        let record = match self.deps.inventory.find_by_id(&task.item_id) {
            Ok(record) => record,
            Err(InventoryError::NotFound(id)) => {
                return Err(StepError::Failed(format!("item {id} is gone from inventory")));
            }
            Err(fatal) => return Err(StepError::Fatal(fatal.into())),
        };
        let shelf = record.location().to_string();

        // Shelf leg.
        self.confirm(&format!("navigate to {shelf}")).await?;
        self.gated(self.config.move_cost).await?;
        let navigator = Arc::clone(&self.deps.navigator);
        match navigator.travel_to(&shelf).await {
            Ok(outcome) => self.log_capability("NAV", outcome.detail),
            Err(err) => return Err(StepError::Failed(err.to_string())),
        }
        self.apply(RobotEvent::Arrived)?;

        // Verify and grip.
        self.confirm(&format!("retrieve {}", task.item_id)).await?;
        self.gated(self.config.retrieve_cost).await?;
        let sensor = Arc::clone(&self.deps.sensor);
        match sensor.verify_item(&shelf, record.id()).await {
            Ok(outcome) => self.log_capability("SENSOR", outcome.detail),
            Err(err) => return Err(StepError::Failed(err.to_string())),
        }
        let gripper = Arc::clone(&self.deps.gripper);
        match gripper.pick(&record).await {
            Ok(outcome) => self.log_capability("GRIPPER", outcome.detail),
            Err(err) => return Err(StepError::Failed(err.to_string())),
        }
        self.held = Some(record.clone());

        // Retrieval is the point of inventory mutation: both index
        // views update under one write lock here.
        let removed = match self.deps.inventory.remove_item(&task.item_id) {
            Ok(item) => item,
            Err(InventoryError::NotFound(id)) => {
                return Err(StepError::Failed(format!("item {id} vanished before removal")));
            }
            Err(fatal) => return Err(StepError::Fatal(fatal.into())),
        };

        // Station leg.
        let station_id = self.station.id().to_string();
        self.gated(self.config.move_cost).await?;
        let navigator = Arc::clone(&self.deps.navigator);
        match navigator.travel_to(&station_id).await {
            Ok(outcome) => self.log_capability("NAV", outcome.detail),
            Err(err) => return Err(StepError::Failed(err.to_string())),
        }
        let gripper = Arc::clone(&self.deps.gripper);
        match gripper.release().await {
            Ok(outcome) => self.log_capability("GRIPPER", outcome.detail),
            Err(err) => return Err(StepError::Failed(err.to_string())),
        }
        self.held = None;
        for _ in 0..task.quantity {
            self.station.stage(task.order_id, removed.clone());
        }
        self.log_op(format!(
            "[STATION] staged {}x {} at {station_id}",
            task.quantity, task.item_id
        ));
        self.apply(RobotEvent::RetrievalComplete)?;

        // Packing pass fires on the order's last task; earlier tasks
        // only hand their items to the staged input set.
        let is_last = self.orders.remaining_tasks(task.order_id) == Some(1);
        if is_last {
            let reference = self.order_reference(task.order_id);
            self.confirm(&format!("pack staged items for {reference}"))
                .await?;
            self.gated(self.config.pack_cost).await?;
            let staged = self.station.take_staged(task.order_id);
            let total = staged.len();
            self.optimizer.load(staged);
            let mut position = 0;
            while let Some(item) = self.optimizer.next_item() {
                position += 1;
                self.log_op(format!(
                    "[PACK] placed {position}/{total}: {} ({:.1}kg{})",
                    item.id(),
                    item.weight(),
                    if item.fragile() { ", fragile" } else { "" }
                ));
            }
            self.station.record_packed(reference);
        }
        let order_status = self
            .orders
            .task_done(task.order_id)
            .unwrap_or(OrderStatus::Failed);
        self.apply(RobotEvent::PackingComplete)?;
        Ok(order_status)
    }

    /// Error recovery: unconditional release of anything held, staged
    /// items of the order discarded, queued siblings cancelled, the
    /// order failed, then back to idle.
    async fn recover_from_failure(
        &mut self,
        task: &mut Task,
        reason: &str,
    ) -> Result<(), RobotError> {
        tracing::warn!(task_id = %task.id, %reason, "task failed, entering recovery");
        self.log_op(format!("[FAIL] task for {}: {reason}", task.item_id));
        task.status = TaskStatus::Failed;
        self.apply(RobotEvent::Fault)?;

        let gripper = Arc::clone(&self.deps.gripper);
        if let Err(err) = gripper.release().await {
            tracing::warn!(%err, "release during recovery failed");
        }
        self.held = None;
        let discarded = self.station.clear_order(task.order_id);
        if discarded > 0 {
            self.log_op(format!("[FAIL] discarded {discarded} staged item(s)"));
        }
        let cancelled = self.queue.cancel_order(task.order_id);
        if cancelled > 0 {
            self.log_op(format!("[FAIL] cancelled {cancelled} queued sibling task(s)"));
        }
        self.orders.fail(task.order_id);

        self.apply(RobotEvent::Recovered)?;
        self.log_op("[RECOVERY] cleanup complete, robot idle");
        Ok(())
    }

    /// Battery-gate one physical step, charging first when the step
    /// cost is not covered or the level sits below the low threshold.
    /// `consume` failing after that check is a broken contract.
    async fn gated(&mut self, cost: f64) -> Result<(), StepError> {
        if !self.battery.can_perform(cost)
            || self.battery.is_below(self.config.low_battery_threshold)
        {
            self.charge().await?;
        }
        self.battery.consume(cost).map_err(|err| {
            tracing::error!(%err, "battery consumed without a passing capability check");
            StepError::Fatal(err.into())
        })
    }

    async fn charge(&mut self) -> Result<(), StepError> {
        let resume = self.status;
        self.apply(RobotEvent::ChargingNeeded)?;
        self.log_op(format!(
            "[BATTERY] low ({:.1}/{:.1}), charging",
            self.battery.level(),
            self.battery.max()
        ));
        let tick = self.config.charge_tick();
        while !self.battery.is_full() {
            self.battery.replenish(self.config.charge_rate);
            if !tick.is_zero() {
                tokio::time::sleep(tick).await;
            }
        }
        self.log_op(format!("[BATTERY] charged to {:.1}", self.battery.level()));
        self.apply(RobotEvent::ChargeComplete { resume })?;
        Ok(())
    }

    async fn confirm(&mut self, action: &str) -> Result<(), StepError> {
        if self.config.automation_mode == AutomationMode::FullAuto {
            return Ok(());
        }
        let approval = Arc::clone(&self.deps.approval);
        if approval.confirm(action).await {
            Ok(())
        } else {
            Err(StepError::Failed(format!("operator declined: {action}")))
        }
    }

    fn apply(&mut self, event: RobotEvent) -> Result<(), RobotError> {
        let next = transition(self.status, event)?;
        tracing::debug!(from = ?self.status, to = ?next, ?event, "transition");
        self.status = next;
        Ok(())
    }

    fn log_capability(&mut self, tag: &str, detail: Option<String>) {
        if let Some(detail) = detail {
            self.log_op(format!("[{tag}] {detail}"));
        }
    }

    fn log_op(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "steelgrip::robot", "{message}");
        self.log.push(message);
    }

    fn order_reference(&self, order_id: Uuid) -> String {
        self.orders
            .reference(order_id)
            .unwrap_or("<unknown order>")
            .to_string()
    }

    /// Read-only snapshot for status/telemetry surfaces.
    pub fn snapshot(&self, log_entries: usize) -> RobotSnapshot {
        RobotSnapshot {
            status: self.status,
            battery_level: self.battery.level(),
            battery_capacity: self.battery.max(),
            queue_depth: self.queue.len(),
            holding: self.held.as_ref().map(|item| item.id().to_string()),
            staged_items: self.station.staged_count(),
            orders_completed: self.orders.completed_count(),
            recent_log: self.log.recent(log_entries),
        }
    }

    pub fn status(&self) -> RobotStatus {
        self.status
    }

    pub fn battery_level(&self) -> f64 {
        self.battery.level()
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub fn holding(&self) -> Option<&Item> {
        self.held.as_ref()
    }

    pub fn order_status(&self, order_id: Uuid) -> Option<OrderStatus> {
        self.orders.status(order_id)
    }

    pub fn packed_orders(&self) -> &[String] {
        self.station.packed_orders()
    }

    /// The last `n` operation-log entries, oldest first.
    pub fn history(&self, n: usize) -> Vec<LogEntry> {
        self.log.recent(n)
    }
}
