//! Machine-wide constants, fixed at provisioning time.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::Amount;
use crate::model::Count;

pub const DEFAULT_BANK_ID: &str = "default";
pub const DEFAULT_MAX_COINS_PER_INSERTION: Count = 10;
pub const DEFAULT_MAX_SLOT_CAPACITY: Count = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("coin unit must be positive, got {0}")]
    CoinUnit(Amount),
    #[error("max coins per insertion must be positive, got {0}")]
    MaxCoins(Count),
    #[error("slot capacity must be positive, got {0}")]
    SlotCapacity(Count),
    #[error("bank id must not be empty")]
    BankId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    coin_unit: Amount,
    max_coins_per_insertion: Count,
    max_slot_capacity: Count,
    bank_id: String,
}

impl MachineConfig {
    pub fn new(
        coin_unit: Amount,
        max_coins_per_insertion: Count,
        max_slot_capacity: Count,
        bank_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let bank_id = bank_id.into();
        if !coin_unit.is_positive() {
            return Err(ConfigError::CoinUnit(coin_unit));
        }
        if max_coins_per_insertion <= 0 {
            return Err(ConfigError::MaxCoins(max_coins_per_insertion));
        }
        if max_slot_capacity <= 0 {
            return Err(ConfigError::SlotCapacity(max_slot_capacity));
        }
        if bank_id.trim().is_empty() {
            return Err(ConfigError::BankId);
        }
        Ok(Self {
            coin_unit,
            max_coins_per_insertion,
            max_slot_capacity,
            bank_id,
        })
    }

    /// Worth of a single accepted coin.
    pub fn coin_unit(&self) -> Amount {
        self.coin_unit
    }

    pub fn max_coins_per_insertion(&self) -> Count {
        self.max_coins_per_insertion
    }

    pub fn max_slot_capacity(&self) -> Count {
        self.max_slot_capacity
    }

    pub fn bank_id(&self) -> &str {
        &self.bank_id
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            coin_unit: Amount::from_scaled(2_500),
            max_coins_per_insertion: DEFAULT_MAX_COINS_PER_INSERTION,
            max_slot_capacity: DEFAULT_MAX_SLOT_CAPACITY,
            bank_id: DEFAULT_BANK_ID.to_string(),
        }
    }
}

/// Command line of the `vend-eng` binary. Every machine setting falls back to
/// a `VEND_*` environment variable (a `.env` file is honoured).
#[derive(Debug, Parser)]
#[command(name = "vend-eng", version, about = "Replay vending machine commands")]
pub struct Args {
    /// Inventory csv: slot,name,verbose_name,volume,price,stock
    pub inventory: PathBuf,

    /// Command csv: op,slot,coin
    pub commands: PathBuf,

    /// Worth of one coin
    #[arg(long, env = "VEND_COIN_UNIT", default_value = "0.25")]
    pub coin_unit: Amount,

    /// Most coins accepted by one insertion
    #[arg(long, env = "VEND_MAX_COINS", default_value_t = DEFAULT_MAX_COINS_PER_INSERTION)]
    pub max_coins: Count,

    /// Stock a slot holds once refilled
    #[arg(long, env = "VEND_SLOT_CAPACITY", default_value_t = DEFAULT_MAX_SLOT_CAPACITY)]
    pub slot_capacity: Count,

    /// Identifier of the coin bank record
    #[arg(long, env = "VEND_BANK_ID", default_value = DEFAULT_BANK_ID)]
    pub bank_id: String,

    /// Coins already in the bank at start-up
    #[arg(long, env = "VEND_INITIAL_COINS", default_value_t = 0)]
    pub initial_coins: Count,
}

impl Args {
    pub fn machine_config(&self) -> Result<MachineConfig, ConfigError> {
        MachineConfig::new(
            self.coin_unit,
            self.max_coins,
            self.slot_capacity,
            self.bank_id.clone(),
        )
    }
}
