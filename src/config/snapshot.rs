// Configuration Snapshot - Immutable view of tempo, meter, accents and pattern
// Replaced wholesale on every change, read by the timing thread each beat

use serde::{Deserialize, Serialize};
use std::fmt;

/// Accent of a single beat
/// Determines which sound, if any, plays for the beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BeatStatus {
    Strong,
    Medium,
    #[default]
    Normal,
    Muted,
}

impl BeatStatus {
    /// Check if this beat produces no sound
    pub fn is_muted(&self) -> bool {
        matches!(self, BeatStatus::Muted)
    }

    /// Next status in the tap cycle: strong -> medium -> normal -> muted -> strong
    pub fn next(&self) -> Self {
        match self {
            BeatStatus::Strong => BeatStatus::Medium,
            BeatStatus::Medium => BeatStatus::Normal,
            BeatStatus::Normal => BeatStatus::Muted,
            BeatStatus::Muted => BeatStatus::Strong,
        }
    }
}

impl fmt::Display for BeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BeatStatus::Strong => "strong",
            BeatStatus::Medium => "medium",
            BeatStatus::Normal => "normal",
            BeatStatus::Muted => "muted",
        };
        f.write_str(name)
    }
}

/// One sub-note of a subdivided beat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubdivisionNote {
    /// Fraction of the beat, in (0, 1]
    pub length: f64,
    pub muted: bool,
}

impl SubdivisionNote {
    pub fn new(length: f64) -> Self {
        Self {
            length,
            muted: false,
        }
    }

    pub fn muted(length: f64) -> Self {
        Self {
            length,
            muted: true,
        }
    }
}

/// Ordered, non-empty division of one beat into sub-notes
///
/// Lengths are expected to sum to 1.0; this is assumed, not enforced.
/// A single-note pattern means "no subdivision".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SubdivisionNote>", into = "Vec<SubdivisionNote>")]
pub struct SubdivisionPattern {
    notes: Vec<SubdivisionNote>,
}

impl SubdivisionPattern {
    /// Create a pattern from notes
    /// Notes with a non-finite or non-positive length are dropped, lengths
    /// above one beat are capped. An empty result falls back to `whole()`.
    pub fn new(notes: Vec<SubdivisionNote>) -> Self {
        let notes: Vec<SubdivisionNote> = notes
            .into_iter()
            .filter(|note| note.length.is_finite() && note.length > 0.0)
            .map(|note| SubdivisionNote {
                length: note.length.min(1.0),
                muted: note.muted,
            })
            .collect();

        if notes.is_empty() {
            return Self::whole();
        }

        Self { notes }
    }

    /// Build an unmuted pattern from relative lengths
    pub fn from_lengths(lengths: &[f64]) -> Self {
        Self::new(lengths.iter().copied().map(SubdivisionNote::new).collect())
    }

    /// The whole beat played once
    pub fn whole() -> Self {
        Self {
            notes: vec![SubdivisionNote::new(1.0)],
        }
    }

    pub fn eighths() -> Self {
        Self::from_lengths(&[0.5, 0.5])
    }

    pub fn triplets() -> Self {
        Self::from_lengths(&[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0])
    }

    pub fn sixteenths() -> Self {
        Self::from_lengths(&[0.25, 0.25, 0.25, 0.25])
    }

    /// Swung eighths (long-short triplet feel)
    pub fn swing() -> Self {
        Self::from_lengths(&[2.0 / 3.0, 1.0 / 3.0])
    }

    pub fn notes(&self) -> &[SubdivisionNote] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Patterns are never empty; provided for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// More than one note, so the beat needs the Subdivision Player
    pub fn is_subdivided(&self) -> bool {
        self.notes.len() > 1
    }
}

impl Default for SubdivisionPattern {
    fn default() -> Self {
        Self::whole()
    }
}

impl From<Vec<SubdivisionNote>> for SubdivisionPattern {
    fn from(notes: Vec<SubdivisionNote>) -> Self {
        Self::new(notes)
    }
}

impl From<SubdivisionPattern> for Vec<SubdivisionNote> {
    fn from(pattern: SubdivisionPattern) -> Self {
        pattern.notes
    }
}

/// Immutable configuration read by the scheduler on every beat
///
/// Never mutated in place once published: the `ConfigStore` clones,
/// edits and swaps in a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationSnapshot {
    /// Beats per minute, 30..=240
    pub tempo: u32,
    /// 1..=16
    pub beats_per_bar: u8,
    /// 1..=16, display only
    pub beat_unit: u8,
    /// 0-based, always < beats_per_bar
    pub current_beat_index: u8,
    /// Always beats_per_bar entries
    pub beat_statuses: Vec<BeatStatus>,
    pub subdivision_pattern: SubdivisionPattern,
    pub sound_set_id: String,
    /// Bars completed since the last stop
    pub completed_bars: u64,
}

impl ConfigurationSnapshot {
    pub const MIN_TEMPO: u32 = 30;
    pub const MAX_TEMPO: u32 = 240;
    pub const MIN_BEATS: u8 = 1;
    pub const MAX_BEATS: u8 = 16;
    pub const DEFAULT_TEMPO: u32 = 120;
    pub const DEFAULT_SOUND_SET: &'static str = "default";

    /// Create a snapshot in the given meter with default accents
    pub fn new(tempo: u32, beats_per_bar: u8, beat_unit: u8) -> Self {
        let beats_per_bar = clamp_beats(beats_per_bar);
        Self {
            tempo: clamp_tempo(tempo as i64),
            beats_per_bar,
            beat_unit: clamp_beats(beat_unit),
            current_beat_index: 0,
            beat_statuses: default_statuses(beats_per_bar),
            subdivision_pattern: SubdivisionPattern::whole(),
            sound_set_id: Self::DEFAULT_SOUND_SET.to_string(),
            completed_bars: 0,
        }
    }

    /// Duration of one beat in seconds at the current tempo
    pub fn seconds_per_beat(&self) -> f64 {
        seconds_per_beat(self.tempo)
    }

    /// Accent for a beat, `Normal` when the index is out of range
    pub fn beat_status(&self, index: u8) -> BeatStatus {
        self.beat_statuses
            .get(index as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Resize the bar, keeping existing accents by index and padding with `Normal`
    pub fn resize_beats(&mut self, beats_per_bar: u8) {
        let beats_per_bar = clamp_beats(beats_per_bar);
        self.beats_per_bar = beats_per_bar;
        self.beat_statuses
            .resize(beats_per_bar as usize, BeatStatus::Normal);
        if self.current_beat_index >= beats_per_bar {
            self.current_beat_index = 0;
        }
    }

    /// Bring a snapshot from an untrusted source back within its invariants
    pub fn normalized(mut self) -> Self {
        self.tempo = clamp_tempo(self.tempo as i64);
        self.beat_unit = clamp_beats(self.beat_unit);
        let beats = self.beats_per_bar;
        self.resize_beats(beats);
        self
    }
}

impl Default for ConfigurationSnapshot {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TEMPO, 4, 4)
    }
}

/// Clamp any requested tempo into the supported range
pub fn clamp_tempo(bpm: i64) -> u32 {
    bpm.clamp(
        ConfigurationSnapshot::MIN_TEMPO as i64,
        ConfigurationSnapshot::MAX_TEMPO as i64,
    ) as u32
}

pub fn clamp_beats(beats: u8) -> u8 {
    beats.clamp(
        ConfigurationSnapshot::MIN_BEATS,
        ConfigurationSnapshot::MAX_BEATS,
    )
}

/// 60 / tempo, with the tempo clamped first so the result is always finite
pub fn seconds_per_beat(tempo: u32) -> f64 {
    60.0 / clamp_tempo(tempo as i64) as f64
}

fn default_statuses(beats_per_bar: u8) -> Vec<BeatStatus> {
    (0..beats_per_bar)
        .map(|i| {
            if i == 0 {
                BeatStatus::Strong
            } else {
                BeatStatus::Normal
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let snapshot = ConfigurationSnapshot::default();

        assert_eq!(snapshot.tempo, 120);
        assert_eq!(snapshot.beats_per_bar, 4);
        assert_eq!(snapshot.beat_statuses.len(), 4);
        assert_eq!(snapshot.beat_statuses[0], BeatStatus::Strong);
        assert_eq!(snapshot.beat_statuses[1], BeatStatus::Normal);
        assert!(!snapshot.subdivision_pattern.is_subdivided());
        assert_eq!(snapshot.sound_set_id, "default");
    }

    #[test]
    fn test_tempo_clamping() {
        assert_eq!(clamp_tempo(10), 30);
        assert_eq!(clamp_tempo(-5), 30);
        assert_eq!(clamp_tempo(120), 120);
        assert_eq!(clamp_tempo(500), 240);

        let snapshot = ConfigurationSnapshot::new(999, 40, 0);
        assert_eq!(snapshot.tempo, 240);
        assert_eq!(snapshot.beats_per_bar, 16);
        assert_eq!(snapshot.beat_unit, 1);
        assert_eq!(snapshot.beat_statuses.len(), 16);
    }

    #[test]
    fn test_seconds_per_beat() {
        assert!((seconds_per_beat(120) - 0.5).abs() < 1e-12);
        assert!((seconds_per_beat(60) - 1.0).abs() < 1e-12);
        // Zero tempo is clamped, never divides by zero
        assert!((seconds_per_beat(0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_resize_preserves_and_pads() {
        let mut snapshot = ConfigurationSnapshot::default();
        snapshot.beat_statuses = vec![
            BeatStatus::Strong,
            BeatStatus::Muted,
            BeatStatus::Medium,
            BeatStatus::Normal,
        ];

        snapshot.resize_beats(6);
        assert_eq!(snapshot.beat_statuses.len(), 6);
        assert_eq!(snapshot.beat_statuses[1], BeatStatus::Muted);
        assert_eq!(snapshot.beat_statuses[2], BeatStatus::Medium);
        assert_eq!(snapshot.beat_statuses[4], BeatStatus::Normal);
        assert_eq!(snapshot.beat_statuses[5], BeatStatus::Normal);

        snapshot.resize_beats(2);
        assert_eq!(
            snapshot.beat_statuses,
            vec![BeatStatus::Strong, BeatStatus::Muted]
        );
    }

    #[test]
    fn test_resize_resets_out_of_range_beat_index() {
        let mut snapshot = ConfigurationSnapshot::default();
        snapshot.current_beat_index = 3;

        snapshot.resize_beats(3);
        assert_eq!(snapshot.current_beat_index, 0);
    }

    #[test]
    fn test_beat_status_cycle() {
        let mut status = BeatStatus::Strong;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(status);
            status = status.next();
        }
        assert_eq!(status, BeatStatus::Strong);
        assert_eq!(
            seen,
            vec![
                BeatStatus::Strong,
                BeatStatus::Medium,
                BeatStatus::Normal,
                BeatStatus::Muted
            ]
        );
    }

    #[test]
    fn test_beat_status_out_of_range_reads_normal() {
        let snapshot = ConfigurationSnapshot::default();
        assert_eq!(snapshot.beat_status(12), BeatStatus::Normal);
    }

    #[test]
    fn test_pattern_filters_invalid_lengths() {
        let pattern = SubdivisionPattern::from_lengths(&[0.5, f64::NAN, -0.2, 0.5]);
        assert_eq!(pattern.len(), 2);

        let empty = SubdivisionPattern::new(Vec::new());
        assert_eq!(empty, SubdivisionPattern::whole());
        assert!(!empty.is_subdivided());
    }

    #[test]
    fn test_pattern_presets_sum_to_one_beat() {
        for pattern in [
            SubdivisionPattern::whole(),
            SubdivisionPattern::eighths(),
            SubdivisionPattern::triplets(),
            SubdivisionPattern::sixteenths(),
            SubdivisionPattern::swing(),
        ] {
            let total: f64 = pattern.notes().iter().map(|n| n.length).sum();
            assert!((total - 1.0).abs() < 1e-9, "{:?} sums to {}", pattern, total);
        }
    }

    #[test]
    fn test_normalized_repairs_inconsistent_snapshot() {
        let snapshot = ConfigurationSnapshot {
            tempo: 5,
            beats_per_bar: 3,
            beat_statuses: vec![BeatStatus::Strong],
            current_beat_index: 7,
            ..ConfigurationSnapshot::default()
        }
        .normalized();

        assert_eq!(snapshot.tempo, 30);
        assert_eq!(snapshot.beat_statuses.len(), 3);
        assert_eq!(snapshot.beat_statuses[0], BeatStatus::Strong);
        assert_eq!(snapshot.current_beat_index, 0);
    }
}
