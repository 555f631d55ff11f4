//! Unified error type for the Slotforge runtime.

use std::path::PathBuf;

use slotforge_machine::MachineError;

/// Top-level error for everything above the machine core.
#[derive(Debug, thiserror::Error)]
pub enum SlotforgeError {
    /// The machine rejected the operation.
    #[error(transparent)]
    Machine(#[from] MachineError),

    /// The machine actor has shut down or its command channel is gone.
    #[error("machine is unavailable")]
    Unavailable,

    /// The config file couldn't be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file isn't valid JSON for a `MachineConfig`.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use slotforge_machine::RoundId;

    use super::*;

    #[test]
    fn test_from_machine_error() {
        let err: SlotforgeError = MachineError::RoundInProgress(RoundId(3)).into();
        assert!(matches!(err, SlotforgeError::Machine(_)));
        assert_eq!(err.to_string(), "round #3 is still in progress");
    }

    #[test]
    fn test_config_read_mentions_path() {
        let err = SlotforgeError::ConfigRead {
            path: PathBuf::from("machine.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("machine.json"));
    }
}
