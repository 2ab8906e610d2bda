// Practice session - Controller owning the beat scheduler
// Layers countdown and progressive practice on top of plain ticking

use super::cycle::{PracticeBarHook, PracticeCore, lock_core};
use super::handler::{CountdownHandler, ProgressiveHandler};
use super::state::{CountdownTarget, PracticeMode, PracticeState, PracticeStatus};
use super::ticker::PracticeTicker;
use crate::audio::SoundPlayer;
use crate::config::snapshot::clamp_tempo;
use crate::config::{ConfigStore, ConfigurationSnapshot, SchedulerSettings};
use crate::events::EventSender;
use crate::scheduler::{BeatEngine, BeatScheduler, SchedulerState};
use std::sync::{Arc, Mutex};

/// Metronome session: plain playback or a practice session
///
/// Lock order is scheduler engine, then practice core. Methods here never
/// hold the practice lock while calling into the scheduler.
pub struct PracticeSession {
    config: Arc<ConfigStore>,
    scheduler: BeatScheduler,
    core: Arc<Mutex<PracticeCore>>,
    ticker: Mutex<Option<PracticeTicker>>,
    settings: SchedulerSettings,
}

impl PracticeSession {
    pub fn new(
        config: Arc<ConfigStore>,
        player: Arc<dyn SoundPlayer>,
        events: EventSender,
        settings: SchedulerSettings,
    ) -> Self {
        let core = Arc::new(Mutex::new(PracticeCore::new(events.clone())));
        let hook = Arc::new(PracticeBarHook::new(core.clone()));
        let engine = BeatEngine::new(config.clone(), player, events).with_bar_hook(hook);

        Self {
            config,
            scheduler: BeatScheduler::new(engine, settings.clone()),
            core,
            ticker: Mutex::new(None),
            settings,
        }
    }

    /// Count down a time or bar target, once or repeatedly
    pub fn setup_countdown_practice(&self, target: CountdownTarget, loop_enabled: bool) {
        self.stop_active_practice();

        let mode = PracticeMode::Countdown {
            target,
            loop_enabled,
        };
        log::info!("Countdown practice configured: {:?}", mode);
        lock_core(&self.core).configure(mode, Box::new(CountdownHandler::new(loop_enabled)));
    }

    /// Ramp the tempo one step per completed target
    pub fn setup_progressive_practice(
        &self,
        target: CountdownTarget,
        start_bpm: u32,
        target_bpm: u32,
        step_bpm: u32,
    ) {
        self.stop_active_practice();

        let start_bpm = clamp_tempo(start_bpm as i64);
        let target_bpm = clamp_tempo(target_bpm as i64);
        let step_bpm = step_bpm.max(1);
        let mode = PracticeMode::Progressive {
            target,
            start_bpm,
            target_bpm,
            step_bpm,
        };
        log::info!("Progressive practice configured: {:?}", mode);

        let handler = ProgressiveHandler::new(start_bpm, target_bpm, step_bpm, self.config.clone());
        lock_core(&self.core).configure(mode, Box::new(handler));
    }

    /// Drop the practice mode and go back to free play
    pub fn clear_practice(&self) {
        self.stop_active_practice();
        lock_core(&self.core).clear();
    }

    /// Start the configured session from its first cycle
    pub fn start_practice(&self) {
        self.cancel_ticker();

        if !lock_core(&self.core).has_mode() {
            log::warn!("start_practice called without a practice mode");
            return;
        }

        // Fresh bar count for the session, then the starting tempo
        self.scheduler.stop();
        lock_core(&self.core).begin();
        self.scheduler.start();
        self.spawn_ticker();
    }

    pub fn pause_practice(&self) {
        if !lock_core(&self.core).is_running() {
            return;
        }

        self.cancel_ticker();
        self.scheduler.pause();

        let mut core = lock_core(&self.core);
        // The last bar may have completed the session meanwhile
        if core.is_running() {
            core.set_status(PracticeStatus::Paused);
        }
    }

    /// Continue a paused session from beat 0, keeping its progress
    pub fn resume_practice(&self) {
        {
            let mut core = lock_core(&self.core);
            if core.status() != PracticeStatus::Paused {
                return;
            }
            core.set_status(PracticeStatus::Running);
        }

        self.scheduler.resume();
        self.spawn_ticker();
    }

    /// End the session as `status`, pinning progress to 100% or 0%
    pub fn stop_practice(&self, status: PracticeStatus) {
        self.cancel_ticker();
        self.scheduler.stop();
        lock_core(&self.core).finish(status);
    }

    /// Start playback, as a practice session when one is configured
    pub fn play(&self) {
        let (has_mode, status) = {
            let core = lock_core(&self.core);
            (core.has_mode(), core.status())
        };

        match (has_mode, status) {
            (true, PracticeStatus::Running) => {}
            (true, PracticeStatus::Paused) => self.resume_practice(),
            (true, _) => self.start_practice(),
            (false, _) => self.scheduler.start(),
        }
    }

    pub fn pause(&self) {
        if lock_core(&self.core).is_running() {
            self.pause_practice();
        } else {
            self.scheduler.pause();
        }
    }

    pub fn resume(&self) {
        if lock_core(&self.core).status() == PracticeStatus::Paused {
            self.resume_practice();
        } else {
            self.scheduler.resume();
        }
    }

    pub fn stop(&self) {
        if lock_core(&self.core).status().is_active() {
            self.stop_practice(PracticeStatus::Standby);
        } else {
            self.scheduler.stop();
        }
    }

    pub fn practice_state(&self) -> PracticeState {
        lock_core(&self.core).state().clone()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Read-only snapshot for the persistence layer
    pub fn current_configuration(&self) -> Arc<ConfigurationSnapshot> {
        self.config.current()
    }

    /// Store for tempo, meter and pattern edits
    pub fn configuration(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub fn scheduler(&self) -> &BeatScheduler {
        &self.scheduler
    }

    fn stop_active_practice(&self) {
        if lock_core(&self.core).status().is_active() {
            log::debug!("Stopping the running practice before reconfiguring");
            self.stop_practice(PracticeStatus::Standby);
        }
    }

    fn spawn_ticker(&self) {
        let spawned = PracticeTicker::spawn(
            self.core.clone(),
            self.scheduler.handle(),
            self.settings.practice_tick(),
            format!("{}-practice", self.settings.timer_thread_name),
        );

        match spawned {
            Ok(ticker) => {
                let previous = self
                    .ticker
                    .lock()
                    .unwrap_or_else(|p| p.into_inner())
                    .replace(ticker);
                drop(previous);
            }
            Err(e) => log::error!("Failed to spawn practice ticker: {}", e),
        }
    }

    fn cancel_ticker(&self) {
        let ticker = self
            .ticker
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();

        if let Some(mut ticker) = ticker {
            ticker.cancel();
        }
    }
}

impl Drop for PracticeSession {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}
