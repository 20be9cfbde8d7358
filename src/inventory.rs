//! Dual-indexed warehouse inventory.
//!
//! One backing store, two views: an ordered `Vec` of item records
//! (definitive storage) and a `HashMap` from item id to position for
//! O(1) lookup. The two views are only ever updated together, behind
//! one interface; a reader observing them disagreeing is a fatal
//! [`InventoryError::InconsistentIndex`], never masked.
//!
//! [`SharedInventory`] wraps the store in a single `RwLock` so the
//! admission path (validation reads) and the execution path (removal
//! on retrieval) see pre- or post-mutation state only.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for inventory operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InventoryError {
    #[error("Invalid item record: {0}")]
    InvalidRecord(String),

    #[error("Item {0} already exists")]
    DuplicateIdentifier(String),

    #[error("Item {0} not found")]
    NotFound(String),

    /// The list and map views disagree. Indicates a bug in this module;
    /// surfaced as fatal so stale lookups cannot propagate.
    #[error("Inventory index out of sync for {id}: {detail}")]
    InconsistentIndex { id: String, detail: String },
}

/// A stored item. Weight is validated at construction and never
/// mutated; replacing a weight means replacing the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    id: String,
    name: String,
    weight: f64,
    fragile: bool,
    location: String,
}

impl Item {
    /// Build a validated item. Identifiers and locations are normalised
    /// to uppercase, matching how operators key them in.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        weight: f64,
        fragile: bool,
        location: impl Into<String>,
    ) -> Result<Self, InventoryError> {
        let id = id.into().trim().to_uppercase();
        let name = name.into().trim().to_string();
        let location = location.into().trim().to_uppercase();

        if id.is_empty() {
            return Err(InventoryError::InvalidRecord("item id is empty".into()));
        }
        if name.is_empty() {
            return Err(InventoryError::InvalidRecord("item name is empty".into()));
        }
        if location.is_empty() {
            return Err(InventoryError::InvalidRecord("location is empty".into()));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(InventoryError::InvalidRecord(format!(
                "weight must be a non-negative number, got {weight}"
            )));
        }

        Ok(Self {
            id,
            name,
            weight,
            fragile,
            location,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn fragile(&self) -> bool {
        self.fragile
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Wire shape for bootstrap inventory files.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemSpec {
    pub id: String,
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub fragile: bool,
    pub location: String,
}

impl TryFrom<ItemSpec> for Item {
    type Error = InventoryError;

    fn try_from(spec: ItemSpec) -> Result<Self, Self::Error> {
        Item::new(spec.id, spec.name, spec.weight, spec.fragile, spec.location)
    }
}

/// The dual-indexed store. Not thread safe on its own; see
/// [`SharedInventory`].
#[derive(Debug, Default)]
pub struct Inventory {
    items: Vec<Item>,
    index: HashMap<String, usize>,
    max_item_weight: Option<f64>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce a heaviest-accepted-item limit on top of per-record
    /// validation.
    pub fn with_max_weight(max_item_weight: f64) -> Self {
        Self {
            max_item_weight: Some(max_item_weight),
            ..Self::default()
        }
    }

    /// Append a record and index it. O(1) amortised.
    pub fn add_item(&mut self, item: Item) -> Result<(), InventoryError> {
        if let Some(max) = self.max_item_weight {
            if item.weight > max {
                return Err(InventoryError::InvalidRecord(format!(
                    "weight {} exceeds maximum {max}",
                    item.weight
                )));
            }
        }
        if self.index.contains_key(&item.id) {
            return Err(InventoryError::DuplicateIdentifier(item.id.clone()));
        }
        self.index.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Baseline O(n) lookup scanning storage order. Must agree with
    /// [`Inventory::find_by_id`] for every id at every point in time.
    pub fn find_by_id_linear(&self, id: &str) -> Result<&Item, InventoryError> {
        let id = id.trim().to_uppercase();
        self.items
            .iter()
            .find(|item| item.id == id)
            .ok_or(InventoryError::NotFound(id))
    }

    /// O(1) average lookup via the index.
    pub fn find_by_id(&self, id: &str) -> Result<&Item, InventoryError> {
        let id = id.trim().to_uppercase();
        let Some(&position) = self.index.get(&id) else {
            return Err(InventoryError::NotFound(id));
        };
        match self.items.get(position) {
            Some(item) if item.id == id => Ok(item),
            Some(item) => Err(InventoryError::InconsistentIndex {
                id,
                detail: format!("position {position} holds {}", item.id),
            }),
            None => Err(InventoryError::InconsistentIndex {
                id,
                detail: format!("position {position} is past the end of storage"),
            }),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(&id.trim().to_uppercase())
    }

    /// Remove a record from both views as one logical unit.
    ///
    /// Removal preserves storage order (no swap-remove) because
    /// [`Inventory::list_by_location`] promises stable ordering, so the
    /// tail of the index is shifted down one.
    pub fn remove_item(&mut self, id: &str) -> Result<Item, InventoryError> {
        let id = id.trim().to_uppercase();
        let Some(&position) = self.index.get(&id) else {
            return Err(InventoryError::NotFound(id));
        };
        match self.items.get(position) {
            Some(item) if item.id == id => {}
            Some(item) => {
                return Err(InventoryError::InconsistentIndex {
                    id,
                    detail: format!("position {position} holds {}", item.id),
                });
            }
            None => {
                return Err(InventoryError::InconsistentIndex {
                    id,
                    detail: format!("position {position} is past the end of storage"),
                });
            }
        }

        let removed = self.items.remove(position);
        self.index.remove(&id);
        for shifted in &self.items[position..] {
            if let Some(entry) = self.index.get_mut(&shifted.id) {
                *entry -= 1;
            }
        }
        Ok(removed)
    }

    /// All records stored at a location, in storage order.
    pub fn list_by_location(&self, location: &str) -> Vec<&Item> {
        let location = location.trim().to_uppercase();
        self.items
            .iter()
            .filter(|item| item.location == location)
            .collect()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cloneable handle to an inventory behind one `RwLock`.
///
/// Every mutating call holds the write lock across the whole
/// list-plus-index update, so concurrent readers see either the
/// pre-removal or the post-removal state and never a torn one.
#[derive(Clone)]
pub struct SharedInventory {
    inner: Arc<RwLock<Inventory>>,
}

impl SharedInventory {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inner: Arc::new(RwLock::new(inventory)),
        }
    }

    pub fn add_item(&self, item: Item) -> Result<(), InventoryError> {
        self.inner
            .write()
            .expect("inventory lock poisoned")
            .add_item(item)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Item, InventoryError> {
        self.inner
            .read()
            .expect("inventory lock poisoned")
            .find_by_id(id)
            .cloned()
    }

    pub fn find_by_id_linear(&self, id: &str) -> Result<Item, InventoryError> {
        self.inner
            .read()
            .expect("inventory lock poisoned")
            .find_by_id_linear(id)
            .cloned()
    }

    pub fn remove_item(&self, id: &str) -> Result<Item, InventoryError> {
        self.inner
            .write()
            .expect("inventory lock poisoned")
            .remove_item(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner
            .read()
            .expect("inventory lock poisoned")
            .contains(id)
    }

    pub fn list_by_location(&self, location: &str) -> Vec<Item> {
        self.inner
            .read()
            .expect("inventory lock poisoned")
            .list_by_location(location)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Snapshot of all records for presentation surfaces.
    pub fn items(&self) -> Vec<Item> {
        self.inner
            .read()
            .expect("inventory lock poisoned")
            .items()
            .to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("inventory lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .expect("inventory lock poisoned")
            .is_empty()
    }
}
