// Subdivision Player - Sub-beat deadlines within one beat
// The first sub-note is played by the beat itself; the rest are queued here
// and fired by the timing thread's poll

use crate::config::SubdivisionPattern;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct PendingNote {
    due: Instant,
    generation: u64,
}

/// Pending sub-notes of the beat currently sounding
#[derive(Debug, Default)]
pub struct SubdivisionPlayer {
    pending: VecDeque<PendingNote>,
    /// Bumped on every cancel; notes from an older generation are stale
    generation: u64,
}

/// Offsets of the audible notes after the first
/// Note `i` starts at `beat_duration * sum(length[0..i])`
pub fn note_offsets(pattern: &SubdivisionPattern, beat_duration: Duration) -> Vec<Duration> {
    let beat_secs = beat_duration.as_secs_f64();
    let mut offsets = Vec::with_capacity(pattern.len().saturating_sub(1));
    let mut position = 0.0;

    for (i, note) in pattern.notes().iter().enumerate() {
        if i > 0 && !note.muted {
            offsets.push(Duration::from_secs_f64(beat_secs * position));
        }
        position += note.length;
    }

    offsets
}

impl SubdivisionPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the sub-notes of a beat that started at `beat_start`
    /// Anything still pending from the previous beat is cancelled first.
    /// Returns the number of notes queued.
    pub fn schedule(
        &mut self,
        beat_start: Instant,
        beat_duration: Duration,
        pattern: &SubdivisionPattern,
    ) -> usize {
        self.cancel_all();

        if !pattern.is_subdivided() {
            return 0;
        }

        let generation = self.generation;
        self.pending.extend(
            note_offsets(pattern, beat_duration)
                .into_iter()
                .map(|offset| PendingNote {
                    due: beat_start + offset,
                    generation,
                }),
        );
        self.pending.len()
    }

    /// Drop every pending sub-note
    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Remove and count the sub-notes due at `now`
    pub fn take_due(&mut self, now: Instant) -> usize {
        let mut due = 0;
        while let Some(note) = self.pending.front() {
            if note.due > now {
                break;
            }
            let note = self.pending.pop_front();
            // A note queued before the last cancel never sounds
            if note.is_some_and(|n| n.generation == self.generation) {
                due += 1;
            }
        }
        due
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.front().map(|note| note.due)
    }

    /// True while sub-notes of the current beat are still to be played
    pub fn is_playing(&self) -> bool {
        !self.pending.is_empty()
    }
}
