//! Error types for the machine core.

use crate::RoundId;

/// Errors returned by machine operations.
///
/// Everything inside a round (drawing faces, counting, paying out) is total;
/// these only report misuse of the round protocol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    /// A round is still open or wheels from the last round are still
    /// spinning.
    #[error("round {0} is still in progress")]
    RoundInProgress(RoundId),

    /// There is no open round to cancel.
    #[error("no round is open")]
    NoRoundOpen,
}
