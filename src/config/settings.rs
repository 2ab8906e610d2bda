// Scheduler settings - Runtime knobs for the timing and practice threads
// Loaded from a RON file; missing fields and missing files fall back to defaults

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for the timing thread, the practice ticker and the event channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Upper bound on the timing thread's sleep between polls
    pub poll_interval_ms: u64,
    /// Period of one practice "second"
    pub practice_tick_ms: u64,
    /// Capacity of the event ring buffer towards the UI thread
    pub event_capacity: usize,
    pub timer_thread_name: String,
}

impl SchedulerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn practice_tick(&self) -> Duration {
        Duration::from_millis(self.practice_tick_ms.max(1))
    }

    /// Load settings from a RON file, or defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        ron::from_str(&contents).map_err(|e| {
            ConfigError::Serialization(format!(
                "Failed to parse settings {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| {
                ConfigError::Serialization(format!("Failed to serialize settings: {}", e))
            })?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            practice_tick_ms: 1000,
            event_capacity: 256,
            timer_thread_name: "metronome-timer".to_string(),
        }
    }
}
