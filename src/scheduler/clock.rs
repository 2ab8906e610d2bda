// Beat clock - Absolute beat deadlines anchored to the start instant
// Deadlines are `anchor + sum(beat intervals)`, never `now + interval`, so
// polling jitter does not accumulate into drift

use crate::config::snapshot::seconds_per_beat;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct BeatClock {
    anchor: Instant,
    /// Seconds from the anchor to the next beat deadline
    offset_secs: f64,
    beats_elapsed: u64,
}

impl BeatClock {
    /// Start counting at `now`; the first deadline is one beat later
    pub fn start(now: Instant, tempo: u32) -> Self {
        Self {
            anchor: now,
            offset_secs: seconds_per_beat(tempo),
            beats_elapsed: 0,
        }
    }

    pub fn anchor(&self) -> Instant {
        self.anchor
    }

    pub fn next_deadline(&self) -> Instant {
        self.anchor + Duration::from_secs_f64(self.offset_secs)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_deadline()
    }

    /// Move the deadline forward by one beat at `tempo`
    /// A tempo change only affects intervals computed from now on
    pub fn advance(&mut self, tempo: u32) {
        self.offset_secs += seconds_per_beat(tempo);
        self.beats_elapsed += 1;
    }

    /// Deadlines crossed since the anchor
    pub fn beats_elapsed(&self) -> u64 {
        self.beats_elapsed
    }
}
