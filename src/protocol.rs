//! Transport mapping of machine outcomes: a status, named metadata fields and
//! an optional body.
//!
//! Out-of-stock and unknown slots share [`Status::NotFound`] on the wire even
//! though the machine reports them as distinct errors.

use serde::Serialize;

use crate::machine::{MachineError, PurchaseError, VendingSlot};
use crate::model::{Count, Purchase};

/// Metadata field carrying the coin count.
pub const COINS_FIELD: &str = "X-Coins";
/// Metadata field carrying the stock left after a sale.
pub const REMAINING_FIELD: &str = "X-Inventory-Remaining";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NoContent,
    BadRequest,
    NotFound,
    InternalError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NoContent => 204,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::InternalError => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Body {
    Quantity { quantity: Count },
    Slots(Vec<VendingSlot>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub body: Option<Body>,
    /// Reported as [`COINS_FIELD`].
    pub coins: Option<Count>,
    /// Reported as [`REMAINING_FIELD`].
    pub remaining: Option<Count>,
    /// Why the request was rejected, if it was.
    pub reason: Option<String>,
}

impl Response {
    fn new(status: Status) -> Self {
        Self {
            status,
            body: None,
            coins: None,
            remaining: None,
            reason: None,
        }
    }

    fn rejected(status: Status, reason: impl ToString) -> Self {
        Self {
            reason: Some(reason.to_string()),
            ..Self::new(status)
        }
    }

    /// Response of a coin bank accessor.
    ///
    /// Errors still carry a coin count, zeroed since the bank state is not
    /// known.
    pub fn coins(result: Result<Count, MachineError>) -> Self {
        match result {
            Ok(coins) => Self {
                coins: Some(coins),
                ..Self::new(Status::NoContent)
            },
            Err(err) => {
                let status = match err {
                    MachineError::Validation(_) => Status::BadRequest,
                    MachineError::BankMissing(_) => Status::NotFound,
                    _ => Status::InternalError,
                };
                Self {
                    coins: Some(0),
                    ..Self::rejected(status, err)
                }
            }
        }
    }

    pub fn purchase(result: Result<Purchase, PurchaseError>) -> Self {
        match result {
            Ok(purchase) => Self {
                body: Some(Body::Quantity {
                    quantity: purchase.quantity,
                }),
                coins: Some(purchase.coins),
                remaining: Some(purchase.remaining),
                ..Self::new(Status::Ok)
            },
            Err(err) => {
                let status = match err {
                    PurchaseError::UnknownSlot(_) | PurchaseError::OutOfStock { .. } => {
                        Status::NotFound
                    }
                    PurchaseError::InsufficientFunds { .. } => Status::BadRequest,
                    PurchaseError::BankMissing(_) | PurchaseError::Counter(_) => {
                        Status::InternalError
                    }
                };
                let coins = match err {
                    PurchaseError::UnknownSlot(_) => None,
                    _ => Some(err.reported_coins().unwrap_or(0)),
                };
                Self {
                    coins,
                    ..Self::rejected(status, err)
                }
            }
        }
    }

    pub fn slots(slots: Vec<VendingSlot>) -> Self {
        Self {
            body: Some(Body::Slots(slots)),
            ..Self::new(Status::Ok)
        }
    }

    /// Named metadata fields, in a stable order.
    pub fn metadata(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(remaining) = self.remaining {
            fields.push((REMAINING_FIELD, remaining.to_string()));
        }
        if let Some(coins) = self.coins {
            fields.push((COINS_FIELD, coins.to_string()));
        }
        fields
    }

    /// Body rendered as JSON, `None` when there is no body.
    pub fn body_json(&self) -> Result<Option<String>, serde_json::Error> {
        self.body.as_ref().map(serde_json::to_string).transpose()
    }
}
