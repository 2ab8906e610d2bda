// Beat engine - Beat-advance algorithm driven by an explicit clock
// Single-threaded core of the scheduler: the timing thread feeds it
// `Instant::now()`, tests feed it synthetic instants

use super::clock::BeatClock;
use super::state::{AtomicSchedulerState, SchedulerState};
use super::subdivision::SubdivisionPlayer;
use crate::audio::{PlaybackError, SoundPlayer};
use crate::config::{BeatStatus, ConfigStore, ConfigurationSnapshot};
use crate::events::{BarCompletionHook, BarDecision, EventSender, MetronomeEvent};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Beat scheduling state machine
///
/// Owns the beat clock and the pending sub-notes; reads tempo, meter and
/// accents from the `ConfigStore` on every beat and writes the beat index
/// and completed bar count back to it.
pub struct BeatEngine {
    config: Arc<ConfigStore>,
    player: Arc<dyn SoundPlayer>,
    events: EventSender,
    bar_hook: Option<Arc<dyn BarCompletionHook>>,
    state: AtomicSchedulerState,
    clock: Option<BeatClock>,
    subdivisions: SubdivisionPlayer,
}

impl BeatEngine {
    pub fn new(config: Arc<ConfigStore>, player: Arc<dyn SoundPlayer>, events: EventSender) -> Self {
        Self {
            config,
            player,
            events,
            bar_hook: None,
            state: AtomicSchedulerState::default(),
            clock: None,
            subdivisions: SubdivisionPlayer::new(),
        }
    }

    /// Install the observer consulted synchronously at every bar end
    pub fn with_bar_hook(mut self, hook: Arc<dyn BarCompletionHook>) -> Self {
        self.bar_hook = Some(hook);
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state.get()
    }

    /// Lock-free view of the state for other threads
    pub fn state_handle(&self) -> AtomicSchedulerState {
        self.state.clone()
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub fn next_beat_deadline(&self) -> Option<Instant> {
        self.clock.as_ref().map(BeatClock::next_deadline)
    }

    pub fn has_pending_subdivisions(&self) -> bool {
        self.subdivisions.is_playing()
    }

    /// Start ticking at `now`, sounding the current beat immediately
    pub fn start(&mut self, now: Instant) {
        self.subdivisions.cancel_all();

        if let Err(e) = self.player.ensure_engine_running() {
            log::warn!("Audio engine not running, beats will be silent: {}", e);
        }

        let snapshot = self.config.current();
        let index = if snapshot.current_beat_index < snapshot.beats_per_bar {
            snapshot.current_beat_index
        } else {
            0
        };

        self.clock = Some(BeatClock::start(now, snapshot.tempo));
        self.state.set(SchedulerState::Running);
        log::debug!(
            "Scheduler started at beat {} ({} BPM, {}/{})",
            index,
            snapshot.tempo,
            snapshot.beats_per_bar,
            snapshot.beat_unit
        );

        self.events.send(MetronomeEvent::BeatAdvanced { index });
        self.play_beat(&snapshot, index, now);
    }

    /// Restart from beat 0 of a fresh bar, keeping the completed bar count
    pub fn resume(&mut self, now: Instant) {
        self.config.set_current_beat_index(0);
        self.start(now);
    }

    /// Silence everything but keep the beat index and counters
    pub fn pause(&mut self) {
        self.subdivisions.cancel_all();
        self.clock = None;
        if self.state.get() == SchedulerState::Running {
            self.state.set(SchedulerState::Paused);
            log::debug!("Scheduler paused");
        }
    }

    /// Stop and rewind to beat 0; repeated calls have no further effect
    pub fn stop(&mut self) {
        self.subdivisions.cancel_all();
        self.clock = None;

        let previous = self.state.get();
        if matches!(previous, SchedulerState::Running | SchedulerState::Paused) {
            self.state.set(SchedulerState::Stopped);
            self.config.reset_progress();
            self.events.send(MetronomeEvent::BeatAdvanced { index: 0 });
            log::debug!("Scheduler stopped");
        }
    }

    /// Process everything due at `now`
    ///
    /// Fires due sub-notes, then at most one beat. Returns the next instant
    /// that needs attention, or `None` when the engine is not running.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        if !self.state.get().is_running() {
            return None;
        }

        let due = self.subdivisions.take_due(now);
        if due > 0 {
            let snapshot = self.config.current();
            for _ in 0..due {
                self.play(&snapshot, BeatStatus::Normal);
            }
        }

        let deadline = self.clock.as_ref()?.next_deadline();
        if now >= deadline {
            self.advance_beat(deadline);
        }

        if !self.state.get().is_running() {
            return None;
        }

        let next_beat = self.clock.as_ref()?.next_deadline();
        Some(match self.subdivisions.next_due() {
            Some(next_note) if next_note < next_beat => next_note,
            _ => next_beat,
        })
    }

    /// One crossed deadline: move to the next beat, handling bar completion
    fn advance_beat(&mut self, beat_start: Instant) {
        let snapshot = self.config.current();
        let beats_per_bar = snapshot.beats_per_bar.max(1);
        let current = snapshot.current_beat_index;
        let next = (current % beats_per_bar + 1) % beats_per_bar;

        let mut halted = false;
        if next == 0 && (current > 0 || beats_per_bar == 1) {
            let next_bar_count = snapshot.completed_bars + 1;
            self.events
                .send(MetronomeEvent::BarWillComplete { next_bar_count });

            let decision = match &self.bar_hook {
                Some(hook) => hook.on_bar_will_complete(next_bar_count),
                None => BarDecision::Continue,
            };
            self.config.set_completed_bars(next_bar_count);

            match decision {
                BarDecision::Halt => halted = true,
                BarDecision::Continue => {
                    self.events.send(MetronomeEvent::BarCompleted {
                        completed_bars: next_bar_count,
                    });
                }
            }
        }

        // The hook may have changed the tempo for the bar that starts now
        let snapshot = self.config.current();
        if let Some(clock) = self.clock.as_mut() {
            clock.advance(snapshot.tempo);
        }

        if halted {
            log::info!(
                "Target reached after bar {}, stopping before the next beat",
                snapshot.completed_bars
            );
            self.stop();
            return;
        }

        self.config.set_current_beat_index(next);
        self.events.send(MetronomeEvent::BeatAdvanced { index: next });
        self.play_beat(&snapshot, next, beat_start);
    }

    /// Sound one beat, handing sub-notes to the Subdivision Player
    fn play_beat(&mut self, snapshot: &ConfigurationSnapshot, index: u8, beat_start: Instant) {
        self.subdivisions.cancel_all();

        let status = snapshot.beat_status(index);
        if status.is_muted() {
            return;
        }

        let pattern = &snapshot.subdivision_pattern;
        if !pattern.is_subdivided() {
            self.play(snapshot, status);
            return;
        }

        if pattern.notes().first().is_some_and(|note| !note.muted) {
            self.play(snapshot, status);
        }
        let beat_duration = Duration::from_secs_f64(snapshot.seconds_per_beat());
        self.subdivisions.schedule(beat_start, beat_duration, pattern);
    }

    fn play(&self, snapshot: &ConfigurationSnapshot, status: BeatStatus) {
        match self.player.play_sound(&snapshot.sound_set_id, status) {
            Ok(()) => {}
            Err(e @ PlaybackError::MissingSound { .. }) => {
                log::debug!("Silent beat: {}", e);
            }
            Err(e) => {
                log::warn!("Playback failed for {} beat: {}", status, e);
            }
        }
    }
}

impl Drop for BeatEngine {
    fn drop(&mut self) {
        self.subdivisions.cancel_all();
    }
}
