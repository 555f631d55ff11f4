//! Machine configuration and the round state machine.

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// PayoutTable
// ---------------------------------------------------------------------------

/// Amounts used by the reward policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutTable {
    /// Multiplied by `max_frequency²` for a winning round.
    pub unit: i64,
    /// Lost on a round with no repeated face.
    pub ante: i64,
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self { unit: 50, ante: 100 }
    }
}

// ---------------------------------------------------------------------------
// MachineConfig
// ---------------------------------------------------------------------------

/// Configuration for one slot machine.
///
/// Every field has a default, so a config file only needs to name what it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Number of wheels. A round resolves once this many have reported.
    pub wheel_count: usize,

    /// Faces per wheel. Each settle draws uniformly from `0..face_count`.
    pub face_count: u32,

    /// Shortest spin, in ticks.
    pub min_spin_ticks: u64,

    /// Longest spin, in ticks (inclusive).
    pub max_spin_ticks: u64,

    /// Balance the player starts with.
    pub starting_balance: i64,

    pub payout: PayoutTable,

    /// RNG seed. `None` draws a fresh seed per machine.
    pub seed: Option<u64>,

    /// Tick rate of the runtime loop in Hz. Must be non-zero: wheels only
    /// settle on ticks.
    pub tick_rate_hz: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            wheel_count: 5,
            face_count: 10,
            min_spin_ticks: 30,
            max_spin_ticks: 90,
            starting_balance: 500,
            payout: PayoutTable::default(),
            seed: None,
            tick_rate_hz: 60,
        }
    }
}

impl MachineConfig {
    /// Fixes out-of-range values so the config is safe to build from.
    ///
    /// - `wheel_count`, `face_count`, `min_spin_ticks` and `tick_rate_hz`
    ///   are raised to at least 1.
    /// - `max_spin_ticks` is raised to `min_spin_ticks` if below it.
    /// - Negative payout `unit` or `ante` becomes 0.
    pub fn validated(mut self) -> Self {
        if self.wheel_count == 0 {
            warn!("wheel_count is 0, using 1");
            self.wheel_count = 1;
        }
        if self.face_count == 0 {
            warn!("face_count is 0, using 1");
            self.face_count = 1;
        }
        if self.min_spin_ticks == 0 {
            warn!("min_spin_ticks is 0, using 1");
            self.min_spin_ticks = 1;
        }
        if self.max_spin_ticks < self.min_spin_ticks {
            warn!(
                min = self.min_spin_ticks,
                max = self.max_spin_ticks,
                "max_spin_ticks below min_spin_ticks, raising"
            );
            self.max_spin_ticks = self.min_spin_ticks;
        }
        if self.tick_rate_hz == 0 {
            warn!("tick_rate_hz is 0, wheels would never settle; using 1");
            self.tick_rate_hz = 1;
        }
        if self.payout.unit < 0 {
            warn!(unit = self.payout.unit, "negative payout unit, using 0");
            self.payout.unit = 0;
        }
        if self.payout.ante < 0 {
            warn!(ante = self.payout.ante, "negative ante would pay on a loss, using 0");
            self.payout.ante = 0;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// MachineState
// ---------------------------------------------------------------------------

/// Whether a round is currently being collected.
///
/// ```text
/// Idle ──(spin_all)──→ Collecting ──(N reports | cancel)──→ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    Idle,
    Collecting,
}

impl std::fmt::Display for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Collecting => write!(f, "Collecting"),
        }
    }
}
