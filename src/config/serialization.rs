// Serialization utilities for configuration snapshots
// Used by the persistence layer to store and restore the metronome setup

use super::ConfigError;
use super::snapshot::ConfigurationSnapshot;

/// Serialize a snapshot to RON
pub fn snapshot_to_ron(snapshot: &ConfigurationSnapshot) -> Result<String, ConfigError> {
    ron::to_string(snapshot).map_err(|e| {
        ConfigError::Serialization(format!("Failed to serialize snapshot to RON: {}", e))
    })
}

/// Deserialize a snapshot from RON, normalized to its invariants
pub fn snapshot_from_ron(ron_data: &str) -> Result<ConfigurationSnapshot, ConfigError> {
    ron::from_str::<ConfigurationSnapshot>(ron_data)
        .map(ConfigurationSnapshot::normalized)
        .map_err(|e| {
            ConfigError::Serialization(format!("Failed to deserialize snapshot from RON: {}", e))
        })
}

/// Serialize a snapshot to pretty JSON
pub fn snapshot_to_json(snapshot: &ConfigurationSnapshot) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(snapshot).map_err(|e| {
        ConfigError::Serialization(format!("Failed to serialize snapshot to JSON: {}", e))
    })
}

/// Deserialize a snapshot from JSON, normalized to its invariants
pub fn snapshot_from_json(json_data: &str) -> Result<ConfigurationSnapshot, ConfigError> {
    serde_json::from_str::<ConfigurationSnapshot>(json_data)
        .map(ConfigurationSnapshot::normalized)
        .map_err(|e| {
            ConfigError::Serialization(format!(
                "Failed to deserialize snapshot from JSON: {}",
                e
            ))
        })
}
