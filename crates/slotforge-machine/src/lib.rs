//! Spin and resolution core for Slotforge.
//!
//! A machine is N wheels that spin together but settle independently. Each
//! wheel reports its face when it settles; once every wheel of the round has
//! reported, the round pays out according to the largest group of equal
//! faces.
//!
//! # Key types
//!
//! - [`SlotMachine`]: the composed machine; drive it with `tick`
//! - [`WheelActor`]: one wheel with its own spin state and RNG
//! - [`SpinCoordinator`]: triggers all wheels, settles them when due
//! - [`OutcomeAggregator`]: the round barrier and reward policy
//! - [`PlayerState`]: the balance, observable through a watch channel
//! - [`MachineConfig`]: wheel/face counts, spin timing, payouts

mod aggregator;
mod config;
mod coordinator;
mod error;
mod machine;
mod player;
mod types;
mod wheel;

pub use aggregator::{max_frequency, reward, OutcomeAggregator};
pub use config::{MachineConfig, MachineState, PayoutTable};
pub use coordinator::SpinCoordinator;
pub use error::MachineError;
pub use machine::SlotMachine;
pub use player::{Balance, BalanceWatcher, PlayerState};
pub use types::{Face, RoundId, RoundOutcome, SpinFinished, WheelId};
pub use wheel::{EventSender, WheelActor};
