pub mod amount;
pub mod config;
pub mod counter;
pub mod csv;
pub mod handle;
pub mod machine;
pub mod model;
pub mod protocol;

pub use amount::Amount;
pub use config::MachineConfig;
pub use handle::MachineHandle;
pub use machine::Machine;
pub use model::{Count, Item, Purchase, Request, SlotId};
pub use protocol::{Response, Status};
