// ConfigStore - Single holder of the current Configuration Snapshot
// Writers clone, edit and swap; the timing thread loads without locking

use super::snapshot::{
    BeatStatus, ConfigurationSnapshot, SubdivisionPattern, clamp_beats, clamp_tempo,
};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Shared, lock-free configuration
///
/// Every mutator publishes a fresh snapshot via read-copy-update, so a reader
/// always sees a consistent value (possibly one change behind).
#[derive(Debug)]
pub struct ConfigStore {
    current: ArcSwap<ConfigurationSnapshot>,
}

impl ConfigStore {
    pub fn new(snapshot: ConfigurationSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot.normalized()),
        }
    }

    /// Read-only accessor used by the scheduler and the persistence layer
    pub fn current(&self) -> Arc<ConfigurationSnapshot> {
        self.current.load_full()
    }

    /// Replace the whole configuration (e.g. restoring a saved session)
    pub fn replace(&self, snapshot: ConfigurationSnapshot) {
        self.current.store(Arc::new(snapshot.normalized()));
    }

    /// Apply an edit atomically and return the published snapshot
    pub fn update<F>(&self, edit: F) -> Arc<ConfigurationSnapshot>
    where
        F: Fn(&mut ConfigurationSnapshot),
    {
        self.current.rcu(|current| {
            let mut next = ConfigurationSnapshot::clone(current);
            edit(&mut next);
            Arc::new(next)
        });
        self.current()
    }

    /// Set tempo, clamped to 30..=240. Returns the applied value.
    pub fn set_tempo(&self, bpm: i64) -> u32 {
        let tempo = clamp_tempo(bpm);
        self.update(|snapshot| snapshot.tempo = tempo);
        tempo
    }

    /// Change the meter, keeping `beat_statuses` the same length
    pub fn update_beats_per_bar(&self, beats_per_bar: u8) {
        self.update(|snapshot| snapshot.resize_beats(beats_per_bar));
    }

    pub fn set_beat_unit(&self, beat_unit: u8) {
        self.update(|snapshot| snapshot.beat_unit = clamp_beats(beat_unit));
    }

    /// Change the accent of one beat; out-of-range indices are ignored
    pub fn set_beat_status(&self, index: u8, status: BeatStatus) {
        self.update(|snapshot| {
            if let Some(slot) = snapshot.beat_statuses.get_mut(index as usize) {
                *slot = status;
            }
        });
    }

    /// Advance one beat's accent along the tap cycle
    pub fn cycle_beat_status(&self, index: u8) {
        self.update(|snapshot| {
            if let Some(slot) = snapshot.beat_statuses.get_mut(index as usize) {
                *slot = slot.next();
            }
        });
    }

    pub fn set_subdivision_pattern(&self, pattern: SubdivisionPattern) {
        self.update(|snapshot| snapshot.subdivision_pattern = pattern.clone());
    }

    pub fn set_sound_set(&self, sound_set_id: &str) {
        self.update(|snapshot| snapshot.sound_set_id = sound_set_id.to_string());
    }

    pub(crate) fn set_current_beat_index(&self, index: u8) {
        self.update(|snapshot| {
            snapshot.current_beat_index = if index < snapshot.beats_per_bar {
                index
            } else {
                0
            };
        });
    }

    pub(crate) fn set_completed_bars(&self, completed_bars: u64) {
        self.update(|snapshot| snapshot.completed_bars = completed_bars);
    }

    /// Back to beat 0 with no completed bars (scheduler stop)
    pub(crate) fn reset_progress(&self) {
        self.update(|snapshot| {
            snapshot.current_beat_index = 0;
            snapshot.completed_bars = 0;
        });
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(ConfigurationSnapshot::default())
    }
}
