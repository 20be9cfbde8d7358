//! Orders, tasks, and order lifecycle bookkeeping.
//!
//! An order arrives from the intake collaborator as a customer id plus
//! (item, quantity) lines. Admission decomposes it into one [`Task`]
//! per line; the [`OrderBook`] tracks how many tasks remain and flips
//! the order to `Completed` or `Failed` accordingly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle of a customer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Lifecycle of a single unit of robot work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Active,
    Done,
    Failed,
}

/// One (item, quantity) line of an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub item_id: String,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into().trim().to_uppercase(),
            quantity,
        }
    }
}

/// A customer order as supplied by the intake collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: String,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

impl Order {
    pub fn new(customer_id: impl Into<String>, lines: Vec<OrderLine>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id: customer_id.into(),
            lines,
            created_at: Utc::now(),
            status: OrderStatus::Pending,
        }
    }

    /// Total units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

/// A unit of robot work derived from one order line.
///
/// Owned by the task queue until dequeued, then by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: String,
    pub quantity: u32,
    pub status: TaskStatus,
}

impl Task {
    pub fn new(order_id: Uuid, item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            item_id: item_id.into(),
            quantity,
            status: TaskStatus::Queued,
        }
    }
}

struct OrderEntry {
    order: Order,
    reference: String,
    tasks_total: usize,
    tasks_done: usize,
}

/// Tracks admitted orders through to completion or failure.
///
/// Assigns the human-readable sequential references (`ORD0001`) used in
/// logs and at the packing station, alongside the uuid the core keys on.
#[derive(Default)]
pub struct OrderBook {
    orders: HashMap<Uuid, OrderEntry>,
    next_reference: u32,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an admitted order and hand back its reference.
    pub fn register(&mut self, order: Order, tasks_total: usize) -> String {
        self.next_reference += 1;
        let reference = format!("ORD{:04}", self.next_reference);
        self.orders.insert(
            order.id,
            OrderEntry {
                order,
                reference: reference.clone(),
                tasks_total,
                tasks_done: 0,
            },
        );
        reference
    }

    /// Move a pending order to `InProgress` when its first task starts.
    pub fn begin(&mut self, order_id: Uuid) {
        if let Some(entry) = self.orders.get_mut(&order_id) {
            if entry.order.status == OrderStatus::Pending {
                entry.order.status = OrderStatus::InProgress;
            }
        }
    }

    /// Count one task finished; completes the order on the last one.
    /// Returns the order's status afterwards.
    pub fn task_done(&mut self, order_id: Uuid) -> Option<OrderStatus> {
        let entry = self.orders.get_mut(&order_id)?;
        entry.tasks_done += 1;
        if entry.tasks_done >= entry.tasks_total && entry.order.status == OrderStatus::InProgress {
            entry.order.status = OrderStatus::Completed;
        }
        Some(entry.order.status)
    }

    /// Mark an order failed; a failed order never completes.
    pub fn fail(&mut self, order_id: Uuid) {
        if let Some(entry) = self.orders.get_mut(&order_id) {
            entry.order.status = OrderStatus::Failed;
        }
    }

    /// Tasks not yet counted done for an order.
    pub fn remaining_tasks(&self, order_id: Uuid) -> Option<usize> {
        self.orders
            .get(&order_id)
            .map(|entry| entry.tasks_total.saturating_sub(entry.tasks_done))
    }

    pub fn status(&self, order_id: Uuid) -> Option<OrderStatus> {
        self.orders.get(&order_id).map(|entry| entry.order.status)
    }

    pub fn reference(&self, order_id: Uuid) -> Option<&str> {
        self.orders
            .get(&order_id)
            .map(|entry| entry.reference.as_str())
    }

    /// Number of orders that reached `Completed`.
    pub fn completed_count(&self) -> usize {
        self.orders
            .values()
            .filter(|entry| entry.order.status == OrderStatus::Completed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_line_order() -> Order {
        Order::new(
            "CUST-7",
            vec![OrderLine::new("sku001", 2), OrderLine::new("SKU003", 1)],
        )
    }

    #[test]
    fn lines_normalise_item_ids() {
        let order = two_line_order();
        assert_eq!(order.lines[0].item_id, "SKU001");
        assert_eq!(order.unit_count(), 3);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn references_are_sequential() {
        let mut book = OrderBook::new();
        let first = book.register(two_line_order(), 2);
        let second = book.register(two_line_order(), 2);
        assert_eq!(first, "ORD0001");
        assert_eq!(second, "ORD0002");
    }

    #[test]
    fn completes_after_last_task() {
        let mut book = OrderBook::new();
        let order = two_line_order();
        let id = order.id;
        book.register(order, 2);

        book.begin(id);
        assert_eq!(book.status(id), Some(OrderStatus::InProgress));
        assert_eq!(book.task_done(id), Some(OrderStatus::InProgress));
        assert_eq!(book.task_done(id), Some(OrderStatus::Completed));
        assert_eq!(book.completed_count(), 1);
    }

    #[test]
    fn failed_order_never_completes() {
        let mut book = OrderBook::new();
        let order = two_line_order();
        let id = order.id;
        book.register(order, 2);

        book.begin(id);
        book.task_done(id);
        book.fail(id);
        // The remaining task finishing cannot resurrect the order.
        assert_eq!(book.task_done(id), Some(OrderStatus::Failed));
    }
}
