//! Loading a [`MachineConfig`] from disk.

use std::path::Path;

use slotforge_machine::MachineConfig;

use crate::SlotforgeError;

/// Reads a JSON machine config. Missing fields take their defaults; the
/// result is validated before it is returned.
pub fn load_config(path: impl AsRef<Path>) -> Result<MachineConfig, SlotforgeError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SlotforgeError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&text)?;
    tracing::debug!(path = %path.display(), ?config, "config loaded");
    Ok(config)
}

/// Parses a JSON machine config from a string.
pub fn parse_config(text: &str) -> Result<MachineConfig, SlotforgeError> {
    let config: MachineConfig = serde_json::from_str(text)?;
    Ok(config.validated())
}
