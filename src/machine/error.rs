//! Error types for machine operations.

use thiserror::Error;

use crate::Amount;
use crate::model::{Count, SlotId};

/// Error returned by [`Machine`](super::Machine) provisioning and coin operations.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("invalid coin insertion: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Counter(#[from] CounterError),

    #[error("coin bank {0} is not provisioned")]
    BankMissing(String),

    #[error("slot {0} is already provisioned")]
    DuplicateSlot(SlotId),

    #[error("slot {slot}: item {field} must not be negative, got {value}")]
    InvalidItem {
        slot: SlotId,
        field: &'static str,
        value: Amount,
    },
}

/// Rejected coin insertion. Nothing is mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("coin count is required")]
    Missing,
    #[error("coin count '{0}' is not an integer")]
    NotAnInteger(String),
    #[error("coin count must be positive, got {0}")]
    NotPositive(Count),
    #[error("at most {max} coins can be inserted at once, got {requested}")]
    TooMany { requested: Count, max: Count },
}

/// Purchase attempt that did not dispense.
///
/// `coins` is the bank count reported to the caller, read before the bank
/// was drained.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("slot {0} not found")]
    UnknownSlot(SlotId),

    #[error("slot {slot} is out of stock")]
    OutOfStock { slot: SlotId, coins: Count },

    #[error("insufficient credit for slot {slot}: credit {credit}, price {price}")]
    InsufficientFunds {
        slot: SlotId,
        credit: Amount,
        price: Amount,
        coins: Count,
    },

    #[error("coin bank {0} is not provisioned")]
    BankMissing(String),

    #[error("{0}")]
    Counter(#[from] CounterError),
}

impl PurchaseError {
    /// Coin count to report, when the bank was read at all.
    pub fn reported_coins(&self) -> Option<Count> {
        match self {
            PurchaseError::OutOfStock { coins, .. }
            | PurchaseError::InsufficientFunds { coins, .. } => Some(*coins),
            _ => None,
        }
    }
}

/// A counter write that was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CounterError {
    /// The new value would break the owning record's range invariant.
    #[error("{counter} count {value} outside {min}..={max}")]
    OutOfRange {
        counter: &'static str,
        value: Count,
        min: Count,
        max: Count,
    },

    #[error("count {prior} cannot move by {delta} without overflowing")]
    Overflow { prior: Count, delta: Count },
}
