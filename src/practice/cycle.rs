// Practice cycle - Progress accounting and the cycle completion protocol
// Shared by the bar hook (timing thread) and the practice ticker

use super::handler::{CycleHandler, CycleOutcome};
use super::state::{CountdownType, PracticeMode, PracticeState, PracticeStatus};
use crate::events::{BarCompletionHook, BarDecision, EventSender, MetronomeEvent};
use std::sync::{Arc, Mutex, MutexGuard};

/// Practice state plus the handler driving it
/// Only ever accessed through `lock_core`
pub(crate) struct PracticeCore {
    state: PracticeState,
    handler: Option<Box<dyn CycleHandler>>,
    events: EventSender,
}

pub(crate) fn lock_core(core: &Mutex<PracticeCore>) -> MutexGuard<'_, PracticeCore> {
    core.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PracticeCore {
    pub fn new(events: EventSender) -> Self {
        Self {
            state: PracticeState::default(),
            handler: None,
            events,
        }
    }

    pub fn state(&self) -> &PracticeState {
        &self.state
    }

    pub fn status(&self) -> PracticeStatus {
        self.state.status
    }

    pub fn has_mode(&self) -> bool {
        self.state.mode != PracticeMode::None
    }

    pub fn is_running(&self) -> bool {
        self.state.status == PracticeStatus::Running
    }

    /// Replace the session mode; the session waits in standby
    pub fn configure(&mut self, mode: PracticeMode, handler: Box<dyn CycleHandler>) {
        self.state = PracticeState {
            mode,
            total_cycles: handler.total_cycles(),
            ..PracticeState::default()
        };
        self.handler = Some(handler);
        self.refresh_stage();
    }

    /// Back to free play: no mode, no handler
    pub fn clear(&mut self) {
        self.handler = None;
        self.state.mode = PracticeMode::None;
        self.state.current_cycle = 0;
        self.state.total_cycles = 0;
        self.refresh_stage();
        self.finish(PracticeStatus::Standby);
    }

    /// Enter `Running` from scratch
    pub fn begin(&mut self) {
        if let Some(handler) = self.handler.as_mut() {
            handler.on_start();
        }
        self.state.elapsed_time = 0;
        self.state.elapsed_bars = 0;
        self.state.current_cycle = 1;
        self.refresh_stage();

        self.set_status(PracticeStatus::Running);
        self.notify_progress();
        self.notify_cycle();
    }

    pub fn set_status(&mut self, status: PracticeStatus) {
        if self.state.status != status {
            self.state.status = status;
            self.events.send(MetronomeEvent::PracticeStatusChanged(status));
        }
    }

    /// Count one completed bar
    pub fn record_bar(&mut self) -> BarDecision {
        self.record(CountdownType::Bar)
    }

    /// Count one practice second
    pub fn record_second(&mut self) -> BarDecision {
        self.record(CountdownType::Time)
    }

    fn record(&mut self, unit: CountdownType) -> BarDecision {
        if self.state.status != PracticeStatus::Running {
            return BarDecision::Continue;
        }

        match unit {
            CountdownType::Bar => self.state.elapsed_bars += 1,
            CountdownType::Time => self.state.elapsed_time += 1,
        }
        self.notify_progress();

        let Some(target) = self.state.mode.target() else {
            return BarDecision::Continue;
        };
        if target.countdown_type() != unit {
            return BarDecision::Continue;
        }

        let elapsed = self.state.elapsed();
        if let Some(handler) = self.handler.as_mut() {
            handler.on_progress(elapsed, target.amount());
        }

        if elapsed >= target.amount() {
            self.complete_cycle()
        } else {
            BarDecision::Continue
        }
    }

    fn complete_cycle(&mut self) -> BarDecision {
        let outcome = self
            .handler
            .as_mut()
            .map(|handler| handler.on_cycle_complete())
            .unwrap_or(CycleOutcome::Finish);

        match outcome {
            CycleOutcome::Continue => {
                self.state.elapsed_time = 0;
                self.state.elapsed_bars = 0;
                self.state.current_cycle += 1;
                self.refresh_stage();
                log::debug!("Practice cycle {} started", self.state.current_cycle);

                self.notify_progress();
                self.notify_cycle();
                BarDecision::Continue
            }
            CycleOutcome::Finish => {
                if let Some(handler) = self.handler.as_mut() {
                    handler.on_practice_complete();
                }
                self.refresh_stage();
                log::info!(
                    "Practice completed after {} cycle(s)",
                    self.state.current_cycle
                );
                self.finish(PracticeStatus::Completed);
                BarDecision::Halt
            }
        }
    }

    /// End the session with `status`
    ///
    /// Progress is pinned to the target when completed and to zero otherwise,
    /// before observers are notified.
    pub fn finish(&mut self, status: PracticeStatus) {
        if status == PracticeStatus::Completed {
            match self.state.mode.target() {
                Some(target) => match target.countdown_type() {
                    CountdownType::Time => self.state.elapsed_time = target.amount(),
                    CountdownType::Bar => self.state.elapsed_bars = target.amount(),
                },
                None => {
                    self.state.elapsed_time = 0;
                    self.state.elapsed_bars = 0;
                }
            }
        } else {
            self.state.elapsed_time = 0;
            self.state.elapsed_bars = 0;
        }

        self.notify_progress();
        self.set_status(status);
        if status == PracticeStatus::Completed {
            self.events.send(MetronomeEvent::PracticeCompleted);
        }
    }

    fn refresh_stage(&mut self) {
        let stage = self.handler.as_ref().and_then(|handler| handler.stage());
        self.state.current_bpm = stage.map(|s| s.current_bpm);
        self.state.next_bpm = stage.map(|s| s.next_bpm);
        if let Some(handler) = self.handler.as_ref() {
            self.state.total_cycles = handler.total_cycles();
        }
    }

    fn notify_progress(&self) {
        self.events.send(MetronomeEvent::PracticeProgressChanged {
            elapsed_time: self.state.elapsed_time,
            elapsed_bars: self.state.elapsed_bars,
        });
    }

    fn notify_cycle(&self) {
        self.events.send(MetronomeEvent::PracticeCycleInfoChanged {
            current: self.state.current_cycle,
            total: self.state.total_cycles,
        });
        if let (Some(current_bpm), Some(next_bpm)) = (self.state.current_bpm, self.state.next_bpm) {
            self.events.send(MetronomeEvent::PracticeStageInfoChanged {
                current_bpm,
                next_bpm,
            });
        }
    }
}

/// Bar hook installed in the scheduler: counts bars towards the target
pub(crate) struct PracticeBarHook {
    core: Arc<Mutex<PracticeCore>>,
}

impl PracticeBarHook {
    pub fn new(core: Arc<Mutex<PracticeCore>>) -> Self {
        Self { core }
    }
}

impl BarCompletionHook for PracticeBarHook {
    fn on_bar_will_complete(&self, _next_bar_count: u64) -> BarDecision {
        lock_core(&self.core).record_bar()
    }
}
