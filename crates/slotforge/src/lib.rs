//! # Slotforge
//!
//! A tick-driven slot machine: N wheels spin together, settle on their own
//! schedules, and the round pays out once the last one lands.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slotforge::prelude::*;
//!
//! # async fn demo() -> Result<(), SlotforgeError> {
//! let machine = spawn_machine(MachineConfig::default());
//! let mut outcomes = machine.outcomes();
//!
//! machine.pull_lever().await?;
//! if let Ok(outcome) = outcomes.recv().await {
//!     println!("{} -> {}", outcome.reward, Balance(outcome.balance));
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod logging;
mod runtime;

pub use config::{load_config, parse_config};
pub use error::SlotforgeError;
pub use runtime::{spawn_machine, MachineHandle, MachineInfo};

pub mod prelude {
    pub use crate::{
        load_config, spawn_machine, MachineHandle, MachineInfo, SlotforgeError,
    };
    pub use slotforge_machine::{
        Balance, BalanceWatcher, Face, MachineConfig, MachineError, MachineState, PayoutTable,
        RoundId, RoundOutcome, SlotMachine, WheelId,
    };
}
