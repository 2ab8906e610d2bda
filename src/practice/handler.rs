// Cycle handlers - Decide what happens when a practice cycle completes

use crate::config::ConfigStore;
use crate::config::snapshot::clamp_tempo;
use std::sync::Arc;

/// Result of a completed cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Start another cycle without interrupting playback
    Continue,
    /// End the session
    Finish,
}

/// Tempo of the current stage and of the one after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInfo {
    pub current_bpm: u32,
    pub next_bpm: u32,
}

/// Behaviour that differs between practice modes
///
/// Called with the practice state locked, possibly on the timing thread:
/// implementations must not block.
pub trait CycleHandler: Send {
    /// Number of cycles the session will run
    fn total_cycles(&self) -> u32;

    /// Session (re)started
    fn on_start(&mut self) {}

    /// Progress within the current cycle, in the target's unit
    fn on_progress(&mut self, _elapsed: u32, _target: u32) {}

    fn on_cycle_complete(&mut self) -> CycleOutcome;

    fn on_practice_complete(&mut self) {}

    fn stage(&self) -> Option<StageInfo> {
        None
    }
}

/// Single countdown, optionally repeated forever
#[derive(Debug, Clone)]
pub struct CountdownHandler {
    loop_enabled: bool,
    cycles_completed: u32,
}

impl CountdownHandler {
    pub fn new(loop_enabled: bool) -> Self {
        Self {
            loop_enabled,
            cycles_completed: 0,
        }
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }
}

impl CycleHandler for CountdownHandler {
    /// Open-ended when looping: the total follows the current cycle
    fn total_cycles(&self) -> u32 {
        if self.loop_enabled {
            self.cycles_completed + 1
        } else {
            1
        }
    }

    fn on_start(&mut self) {
        self.cycles_completed = 0;
    }

    fn on_cycle_complete(&mut self) -> CycleOutcome {
        self.cycles_completed += 1;
        if self.loop_enabled {
            CycleOutcome::Continue
        } else {
            CycleOutcome::Finish
        }
    }
}

/// Step-wise tempo ramp from `start_bpm` towards `target_bpm`
pub struct ProgressiveHandler {
    start_bpm: u32,
    target_bpm: u32,
    step_bpm: u32,
    current_bpm: u32,
    cycles_completed: u32,
    config: Arc<ConfigStore>,
}

impl ProgressiveHandler {
    /// Tempi are clamped to the supported range; a zero step counts as 1 BPM
    pub fn new(start_bpm: u32, target_bpm: u32, step_bpm: u32, config: Arc<ConfigStore>) -> Self {
        let start_bpm = clamp_tempo(start_bpm as i64);
        Self {
            start_bpm,
            target_bpm: clamp_tempo(target_bpm as i64),
            step_bpm: step_bpm.max(1),
            current_bpm: start_bpm,
            cycles_completed: 0,
            config,
        }
    }

    pub fn current_bpm(&self) -> u32 {
        self.current_bpm
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    fn direction(&self) -> i64 {
        (self.target_bpm as i64 - self.start_bpm as i64).signum()
    }

    /// One step from the current tempo, never past the target
    pub fn next_bpm(&self) -> u32 {
        let candidate = self.current_bpm as i64 + self.direction() * self.step_bpm as i64;
        let target = self.target_bpm as i64;
        let next = match self.direction() {
            1 => candidate.min(target),
            -1 => candidate.max(target),
            _ => target,
        };
        next as u32
    }

    fn has_reached_target(&self, bpm: u32) -> bool {
        match self.direction() {
            1 => bpm >= self.target_bpm,
            -1 => bpm <= self.target_bpm,
            _ => true,
        }
    }
}

impl CycleHandler for ProgressiveHandler {
    fn total_cycles(&self) -> u32 {
        let span = self.target_bpm.abs_diff(self.start_bpm);
        span.div_ceil(self.step_bpm).max(1)
    }

    fn on_start(&mut self) {
        self.current_bpm = self.start_bpm;
        self.cycles_completed = 0;
        self.config.set_tempo(self.start_bpm as i64);
    }

    fn on_cycle_complete(&mut self) -> CycleOutcome {
        self.cycles_completed += 1;
        let next = self.next_bpm();
        self.current_bpm = next;

        if self.has_reached_target(next) {
            log::info!("Progressive practice reached {} BPM", next);
            return CycleOutcome::Finish;
        }

        self.config.set_tempo(next as i64);
        log::debug!("Progressive practice stepping to {} BPM", next);
        CycleOutcome::Continue
    }

    fn stage(&self) -> Option<StageInfo> {
        Some(StageInfo {
            current_bpm: self.current_bpm,
            next_bpm: self.next_bpm(),
        })
    }
}
