use serde::Serialize;

use crate::counter::Countable;
use crate::machine::CounterError;
use crate::model::{Count, Item, SlotId};

/// The single counter of inserted coin units.
#[derive(Debug, Clone)]
pub struct CoinBank {
    id: String,
    count: Count,
}

impl CoinBank {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            count: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Countable for CoinBank {
    fn count(&self) -> Count {
        self.count
    }

    fn store_count(&mut self, value: Count) -> Result<(), CounterError> {
        if value < 0 {
            return Err(CounterError::OutOfRange {
                counter: "coin bank",
                value,
                min: 0,
                max: Count::MAX,
            });
        }
        self.count = value;
        Ok(())
    }
}

/// One dispensing position: an item and how many units of it are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendingSlot {
    id: SlotId,
    item: Item,
    #[serde(rename = "count")]
    stock: Count,
    #[serde(skip)]
    capacity: Count,
}

impl VendingSlot {
    /// An empty slot holding at most `capacity` units.
    pub fn new(id: SlotId, item: Item, capacity: Count) -> Self {
        Self {
            id,
            item,
            stock: 0,
            capacity,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn stock(&self) -> Count {
        self.stock
    }

    pub fn capacity(&self) -> Count {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.stock == 0
    }

    /// Set stock to capacity, whatever it was before.
    pub fn refill(&mut self) {
        self.stock = self.capacity;
    }
}

impl Countable for VendingSlot {
    fn count(&self) -> Count {
        self.stock
    }

    fn store_count(&mut self, value: Count) -> Result<(), CounterError> {
        if !(0..=self.capacity).contains(&value) {
            return Err(CounterError::OutOfRange {
                counter: "slot stock",
                value,
                min: 0,
                max: self.capacity,
            });
        }
        self.stock = value;
        Ok(())
    }
}
