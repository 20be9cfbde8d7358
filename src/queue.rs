//! Strict FIFO task queue.
//!
//! No reordering, no priorities. Item existence is validated once, at
//! admission; dequeue trusts what enqueue admitted.

use std::collections::VecDeque;

use thiserror::Error;
use uuid::Uuid;

use crate::inventory::SharedInventory;
use crate::order::Task;

/// Error type for queue operations.
#[derive(Debug, Error, PartialEq)]
pub enum QueueError {
    #[error("Task queue is empty")]
    Empty,

    #[error("Task references unknown item {0}")]
    UnknownItem(String),
}

/// FIFO holder of pending tasks.
#[derive(Default)]
pub struct TaskQueue {
    queue: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task, validating its item against the inventory.
    /// Fails fast with [`QueueError::UnknownItem`]; validation is not
    /// repeated at dequeue.
    pub fn enqueue(&mut self, task: Task, inventory: &SharedInventory) -> Result<(), QueueError> {
        if !inventory.contains(&task.item_id) {
            return Err(QueueError::UnknownItem(task.item_id));
        }
        tracing::debug!(task_id = %task.id, item = %task.item_id, "task queued");
        self.queue.push_back(task);
        Ok(())
    }

    /// Remove and return the head.
    pub fn dequeue(&mut self) -> Result<Task, QueueError> {
        self.queue.pop_front().ok_or(QueueError::Empty)
    }

    /// Abort a task that is still queued.
    pub fn cancel(&mut self, task_id: Uuid) -> Option<Task> {
        let position = self.queue.iter().position(|task| task.id == task_id)?;
        self.queue.remove(position)
    }

    /// Drop every queued task belonging to an order. Returns how many
    /// were removed.
    pub fn cancel_order(&mut self, order_id: Uuid) -> usize {
        let before = self.queue.len();
        self.queue.retain(|task| task.order_id != order_id);
        before - self.queue.len()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{Inventory, Item};
    use pretty_assertions::assert_eq;

    fn seeded_inventory() -> SharedInventory {
        let mut inventory = Inventory::new();
        for id in ["SKU001", "SKU002"] {
            inventory
                .add_item(Item::new(id, "thing", 1.0, false, "A1").unwrap())
                .unwrap();
        }
        SharedInventory::new(inventory)
    }

    #[test]
    fn strict_fifo_order() {
        let inventory = seeded_inventory();
        let mut queue = TaskQueue::new();
        let order_id = Uuid::new_v4();
        let t1 = Task::new(order_id, "SKU001", 1);
        let t2 = Task::new(Uuid::new_v4(), "SKU002", 1);
        let (id1, id2) = (t1.id, t2.id);

        queue.enqueue(t1, &inventory).unwrap();
        queue.enqueue(t2, &inventory).unwrap();
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.dequeue().unwrap().id, id1);
        assert_eq!(queue.dequeue().unwrap().id, id2);
        assert_eq!(queue.dequeue(), Err(QueueError::Empty));
    }

    #[test]
    fn unknown_item_rejected_at_admission() {
        let inventory = seeded_inventory();
        let mut queue = TaskQueue::new();
        let err = queue
            .enqueue(Task::new(Uuid::new_v4(), "GHOST", 1), &inventory)
            .unwrap_err();
        assert_eq!(err, QueueError::UnknownItem("GHOST".into()));
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_removes_only_the_target() {
        let inventory = seeded_inventory();
        let mut queue = TaskQueue::new();
        let t1 = Task::new(Uuid::new_v4(), "SKU001", 1);
        let t2 = Task::new(Uuid::new_v4(), "SKU002", 1);
        let (id1, id2) = (t1.id, t2.id);
        queue.enqueue(t1, &inventory).unwrap();
        queue.enqueue(t2, &inventory).unwrap();

        assert_eq!(queue.cancel(id1).map(|task| task.id), Some(id1));
        assert_eq!(queue.cancel(id1), None);
        assert_eq!(queue.dequeue().unwrap().id, id2);
    }

    #[test]
    fn cancel_order_drops_all_siblings() {
        let inventory = seeded_inventory();
        let mut queue = TaskQueue::new();
        let doomed = Uuid::new_v4();
        queue
            .enqueue(Task::new(doomed, "SKU001", 1), &inventory)
            .unwrap();
        queue
            .enqueue(Task::new(doomed, "SKU002", 1), &inventory)
            .unwrap();
        let survivor = Task::new(Uuid::new_v4(), "SKU001", 1);
        let survivor_id = survivor.id;
        queue.enqueue(survivor, &inventory).unwrap();

        assert_eq!(queue.cancel_order(doomed), 2);
        assert_eq!(queue.dequeue().unwrap().id, survivor_id);
    }
}
