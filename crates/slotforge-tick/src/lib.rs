//! Fixed-timestep tick source and tick-keyed timers for Slotforge.
//!
//! The machine runtime has no engine game loop to lean on, so this crate
//! provides the two pieces that stand in for one:
//!
//! - [`TickScheduler`]: wakes the owning task once per tick at a fixed rate.
//! - [`TimerQueue`]: holds work scheduled to run at a given tick number.
//!
//! # Integration
//!
//! Both live inside the machine actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* lever, cancel, info */ }
//!         info = scheduler.wait_for_tick() => {
//!             for due in timers.pop_due(info.tick) { /* settle wheel */ }
//!         }
//!     }
//! }
//! ```

mod scheduler;
mod timer;

pub use scheduler::{TickConfig, TickInfo, TickScheduler};
pub use timer::TimerQueue;
