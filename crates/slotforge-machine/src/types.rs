//! Identity and event types shared by every part of the machine.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Index of a wheel within its machine. Wheels are numbered from 0 in the
/// order they were built and never change number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WheelId(pub usize);

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W-{}", self.0)
    }
}

/// Identity of one spin round. The first round is 1; `RoundId(0)` means
/// "no round has been played yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundId(pub u64);

impl RoundId {
    /// The round that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A face index on a wheel, in `0..face_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Face(pub u32);

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Emitted by a wheel exactly once per triggered spin, when it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinFinished {
    /// The round the wheel was spinning for.
    pub round: RoundId,
    pub wheel: WheelId,
    pub face: Face,
}

/// The result of a fully resolved round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: RoundId,
    /// Terminal faces in wheel order (index = `WheelId`).
    pub faces: Vec<Face>,
    /// Size of the largest group of equal faces.
    pub max_frequency: usize,
    /// Amount applied to the balance; negative for a losing round.
    pub reward: i64,
    /// Balance after the reward was applied.
    pub balance: i64,
}
