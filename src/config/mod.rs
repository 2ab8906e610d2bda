// Configuration - Snapshot data model, lock-free store and runtime settings

pub mod serialization;
pub mod settings;
pub mod snapshot;
pub mod store;

pub use serialization::{snapshot_from_json, snapshot_from_ron, snapshot_to_json, snapshot_to_ron};
pub use settings::SchedulerSettings;
pub use snapshot::{BeatStatus, ConfigurationSnapshot, SubdivisionNote, SubdivisionPattern};
pub use store::ConfigStore;

/// Errors raised while loading or storing configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
