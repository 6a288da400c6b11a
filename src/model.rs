//! Core domain types for the vending machine.

use serde::Serialize;

use crate::Amount;

/// Slot identifier (one per dispensing position).
pub type SlotId = u32;

/// Value held by a counter record: coins in the bank or items in a slot.
pub type Count = i64;

/// Reference data describing a product type. Read-only once provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub name: String,
    pub verbose_name: String,
    /// Unit volume in litres.
    pub volume: Amount,
    /// Unit price in currency.
    pub price: Amount,
}

impl Item {
    pub fn new(name: impl Into<String>, volume: Amount, price: Amount) -> Self {
        let name = name.into();
        Self {
            verbose_name: name.clone(),
            name,
            volume,
            price,
        }
    }

    pub fn with_verbose_name(mut self, verbose_name: impl Into<String>) -> Self {
        self.verbose_name = verbose_name.into();
        self
    }
}

/// A request representing the possible inputs of the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Read the current coin count without touching it.
    PeekCoins,
    /// Insert coins. The raw value is kept so absent and non-integer input can be told apart.
    InsertCoins { coin: Option<String> },
    /// Return every inserted coin, resetting the bank to zero.
    DrainCoins,
    /// Buy one unit from a slot.
    Purchase { slot: SlotId },
    /// Restock every slot to capacity.
    Refill,
    /// List every slot with its item.
    ListSlots,
}

impl Request {
    /// Short operation name, used in logs and reports.
    pub fn op(&self) -> &'static str {
        match self {
            Request::PeekCoins => "peek",
            Request::InsertCoins { .. } => "insert",
            Request::DrainCoins => "drain",
            Request::Purchase { .. } => "purchase",
            Request::Refill => "refill",
            Request::ListSlots => "list",
        }
    }

    pub fn slot(&self) -> Option<SlotId> {
        match self {
            Request::Purchase { slot } => Some(*slot),
            _ => None,
        }
    }
}

/// Result of a successful purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    /// Units dispensed, always 1.
    pub quantity: Count,
    /// Stock left in the slot afterwards.
    pub remaining: Count,
    /// Bank count after paying for the item, before the bank is drained.
    pub coins: Count,
}
