//! Packing-station staging area.
//!
//! Retrieved items are staged here per order until the order's last
//! task triggers the packing pass. The station also remembers which
//! orders it has packed, for status surfaces.

use std::collections::HashMap;

use uuid::Uuid;

use crate::inventory::Item;

/// Physical workspace where the robot stages and packs items.
pub struct PackingStation {
    id: String,
    staged: HashMap<Uuid, Vec<Item>>,
    packed_orders: Vec<String>,
}

impl PackingStation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            staged: HashMap::new(),
            packed_orders: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Accept one staged item for an order, in retrieval order.
    pub fn stage(&mut self, order_id: Uuid, item: Item) {
        self.staged.entry(order_id).or_default().push(item);
    }

    /// Take everything staged for an order, clearing its staging area.
    pub fn take_staged(&mut self, order_id: Uuid) -> Vec<Item> {
        self.staged.remove(&order_id).unwrap_or_default()
    }

    /// Discard staged items for an order that failed.
    pub fn clear_order(&mut self, order_id: Uuid) -> usize {
        self.staged.remove(&order_id).map_or(0, |items| items.len())
    }

    /// Total staged units across all orders.
    pub fn staged_count(&self) -> usize {
        self.staged.values().map(Vec::len).sum()
    }

    /// Record a completed packing pass.
    pub fn record_packed(&mut self, reference: impl Into<String>) {
        self.packed_orders.push(reference.into());
    }

    pub fn packed_orders(&self) -> &[String] {
        &self.packed_orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Item;
    use pretty_assertions::assert_eq;

    fn item(id: &str) -> Item {
        Item::new(id, "thing", 1.0, false, "A1").unwrap()
    }

    #[test]
    fn staging_is_per_order_and_ordered() {
        let mut station = PackingStation::new("PACK-1");
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        station.stage(first, item("A"));
        station.stage(second, item("X"));
        station.stage(first, item("B"));
        assert_eq!(station.staged_count(), 3);

        let taken: Vec<String> = station
            .take_staged(first)
            .into_iter()
            .map(|i| i.id().to_string())
            .collect();
        assert_eq!(taken, vec!["A", "B"]);
        assert_eq!(station.staged_count(), 1);
    }

    #[test]
    fn clear_discards_a_failed_orders_items() {
        let mut station = PackingStation::new("PACK-1");
        let order = Uuid::new_v4();
        station.stage(order, item("A"));
        assert_eq!(station.clear_order(order), 1);
        assert!(station.take_staged(order).is_empty());
    }

    #[test]
    fn packed_history_accumulates() {
        let mut station = PackingStation::new("PACK-1");
        station.record_packed("ORD0001");
        station.record_packed("ORD0002");
        assert_eq!(station.packed_orders(), ["ORD0001", "ORD0002"]);
    }
}
