//! Vending machine core.
//!
//! The machine owns one coin bank and a set of slots. It accepts coins,
//! sells one unit at a time against the inserted credit, and restocks.
//! Requests arrive one by one (see [`Machine::run`]), so every
//! read-modify-write of the bank or a slot is serialized.

use std::collections::BTreeMap;

use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::config::MachineConfig;
use crate::counter::Countable;
use crate::handle::Call;
use crate::model::{Count, Item, Purchase, Request, SlotId};
use crate::protocol::{Response, Status};

mod state;
pub use state::{CoinBank, VendingSlot};

mod error;
pub use error::{CounterError, MachineError, PurchaseError, ValidationError};

/// A single logical vending machine.
pub struct Machine {
    config: MachineConfig,
    bank: Option<CoinBank>,
    slots: BTreeMap<SlotId, VendingSlot>,
}

/// Public API
impl Machine {
    /// A machine with an empty coin bank and no slots.
    pub fn new(config: MachineConfig) -> Self {
        let mut machine = Self::unprovisioned(config);
        machine.bank = Some(CoinBank::new(machine.config.bank_id()));
        machine
    }

    /// A machine with neither a coin bank nor slots.
    pub fn unprovisioned(config: MachineConfig) -> Self {
        Self {
            config,
            bank: None,
            slots: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Create (or replace) the coin bank holding `coins`.
    pub fn provision_bank(&mut self, coins: Count) -> Result<&CoinBank, MachineError> {
        let mut bank = CoinBank::new(self.config.bank_id());
        bank.store_count(coins)?;
        Ok(&*self.bank.insert(bank))
    }

    /// Add a slot selling `item`, loaded with `stock` units.
    ///
    /// Price and volume must not be negative.
    pub fn provision_slot(
        &mut self,
        id: SlotId,
        item: Item,
        stock: Count,
    ) -> Result<&VendingSlot, MachineError> {
        if self.slots.contains_key(&id) {
            return Err(MachineError::DuplicateSlot(id));
        }
        for (field, value) in [("price", item.price), ("volume", item.volume)] {
            if value.is_negative() {
                return Err(MachineError::InvalidItem {
                    slot: id,
                    field,
                    value,
                });
            }
        }
        let mut slot = VendingSlot::new(id, item, self.config.max_slot_capacity());
        slot.store_count(stock)?;
        Ok(&*self.slots.entry(id).or_insert(slot))
    }

    /// Slots in id order.
    pub fn slots(&self) -> impl Iterator<Item = &VendingSlot> + '_ {
        self.slots.values()
    }

    pub fn get_slot(&self, id: SlotId) -> Option<&VendingSlot> {
        self.slots.get(&id)
    }

    pub fn get_bank(&self) -> Option<&CoinBank> {
        self.bank.as_ref()
    }

    /// Current coin count, without mutation.
    pub fn peek_coins(&self) -> Result<Count, MachineError> {
        Ok(self.bank()?.count())
    }

    /// Accept between 1 and the configured maximum of coins.
    /// Returns the new bank count.
    pub fn insert_coins(&mut self, coin: Option<&str>) -> Result<Count, MachineError> {
        let coins = parse_coin_count(coin, self.config.max_coins_per_insertion())?;
        let (_, new) = self.bank_mut()?.add_to(coins)?;
        Ok(new)
    }

    /// Hand every inserted coin back. Returns the count before the reset.
    pub fn drain_coins(&mut self) -> Result<Count, MachineError> {
        Ok(self.bank_mut()?.reset_to_zero()?)
    }

    /// Attempt to sell one unit from `slot`.
    ///
    /// Any attempt that reaches the bank leaves it at zero. The coin count
    /// reported (in the result or the error) is the one read before that
    /// final drain.
    pub fn purchase(&mut self, slot: SlotId) -> Result<Purchase, PurchaseError> {
        let unit = self.config.coin_unit();

        let target = self
            .slots
            .get_mut(&slot)
            .ok_or(PurchaseError::UnknownSlot(slot))?;
        let bank = self
            .bank
            .as_mut()
            .ok_or_else(|| PurchaseError::BankMissing(self.config.bank_id().to_string()))?;

        if target.is_empty() {
            let coins = settle_bank(bank)?;
            return Err(PurchaseError::OutOfStock { slot, coins });
        }

        let price = target.item().price;
        let credit = unit.times(bank.count());
        if credit < price {
            let coins = settle_bank(bank)?;
            return Err(PurchaseError::InsufficientFunds {
                slot,
                credit,
                price,
                coins,
            });
        }

        let (_, remaining) = target.subtract_from(1)?;
        let (_, coins) = bank.subtract_from(price.whole_units_of(unit))?;
        settle_bank(bank)?;

        Ok(Purchase {
            quantity: 1,
            remaining,
            coins,
        })
    }

    /// Restock every slot to capacity. Returns the updated slots.
    pub fn refill(&mut self) -> Vec<VendingSlot> {
        for slot in self.slots.values_mut() {
            slot.refill();
        }
        self.slots.values().cloned().collect()
    }

    /// Apply a single request on top of the current machine state.
    pub fn apply(&mut self, request: Request) -> Response {
        let response = match &request {
            Request::PeekCoins => Response::coins(self.peek_coins()),
            Request::InsertCoins { coin } => Response::coins(self.insert_coins(coin.as_deref())),
            Request::DrainCoins => Response::coins(self.drain_coins()),
            Request::Purchase { slot } => Response::purchase(self.purchase(*slot)),
            Request::Refill => Response::slots(self.refill()),
            Request::ListSlots => Response::slots(self.slots().cloned().collect()),
        };
        Self::log_response(&request, &response);
        response
    }

    /// Serve calls until every sender is gone.
    pub async fn run(&mut self, mut calls: impl Stream<Item = Call> + Unpin) {
        while let Some(Call { request, reply }) = calls.next().await {
            let response = self.apply(request);
            // the caller may have given up waiting, nothing to do then
            let _ = reply.send(response);
        }
    }
}

/// Private API
impl Machine {
    fn bank(&self) -> Result<&CoinBank, MachineError> {
        self.bank
            .as_ref()
            .ok_or_else(|| MachineError::BankMissing(self.config.bank_id().to_string()))
    }

    fn bank_mut(&mut self) -> Result<&mut CoinBank, MachineError> {
        self.bank
            .as_mut()
            .ok_or_else(|| MachineError::BankMissing(self.config.bank_id().to_string()))
    }

    /// Small helper to log `apply` results
    fn log_response(request: &Request, response: &Response) {
        let op = request.op();
        let status = response.status.code();
        match (&response.reason, request.slot()) {
            (None, Some(slot)) => {
                info!(op, slot, status, coins = ?response.coins, "{op} applied");
            }
            (None, None) => {
                info!(op, status, coins = ?response.coins, "{op} applied");
            }
            (Some(reason), Some(slot)) => {
                info!(op, slot, status, coins = ?response.coins, reason = %reason, "{op} rejected");
            }
            (Some(reason), None) => {
                info!(op, status, coins = ?response.coins, reason = %reason, "{op} rejected");
            }
        }
        if response.status == Status::InternalError {
            warn!(op, "request failed on machine state");
        }
    }
}

/// Reset the bank at the end of a purchase attempt, returning what it held.
///
/// The machine has no way to hand back change, so whatever is left after
/// paying for an item is dropped here together with the rest of the credit.
fn settle_bank(bank: &mut CoinBank) -> Result<Count, CounterError> {
    let dropped = bank.reset_to_zero()?;
    if dropped > 0 {
        debug!(bank = bank.id(), dropped, "coins left in bank discarded");
    }
    Ok(dropped)
}

/// Validate a raw coin count: present, an integer, within `1..=max`.
fn parse_coin_count(raw: Option<&str>, max: Count) -> Result<Count, ValidationError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let raw = raw.ok_or(ValidationError::Missing)?;
    let coins: Count = raw
        .parse()
        .map_err(|_| ValidationError::NotAnInteger(raw.to_string()))?;
    if coins <= 0 {
        return Err(ValidationError::NotPositive(coins));
    }
    if coins > max {
        return Err(ValidationError::TooMany {
            requested: coins,
            max,
        });
    }
    Ok(coins)
}
