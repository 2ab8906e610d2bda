// Beat Scheduler - Runs the beat engine on a dedicated timing thread
// The thread sleeps until the next deadline (at most one poll interval) and
// is woken early by cancellation

use super::engine::BeatEngine;
use super::state::{AtomicSchedulerState, SchedulerState};
use crate::config::{ConfigStore, ConfigurationSnapshot, SchedulerSettings};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

struct TimerThread {
    /// Dropping the sender wakes and ends the thread
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

struct SchedulerShared {
    engine: Mutex<BeatEngine>,
    timer: Mutex<Option<TimerThread>>,
    state: AtomicSchedulerState,
    config: Arc<ConfigStore>,
    settings: SchedulerSettings,
}

impl SchedulerShared {
    fn lock_engine(&self) -> MutexGuard<'_, BeatEngine> {
        // A panicking observer must not take the metronome down with it
        self.engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start(self: &Arc<Self>) {
        self.cancel_timer();
        self.lock_engine().start(Instant::now());
        self.spawn_timer();
    }

    fn resume(self: &Arc<Self>) {
        self.cancel_timer();
        self.lock_engine().resume(Instant::now());
        self.spawn_timer();
    }

    fn pause(&self) {
        self.lock_engine().pause();
        self.cancel_timer();
    }

    fn stop(&self) {
        // Engine first: once it is stopped no poll can play anything
        self.lock_engine().stop();
        self.cancel_timer();
    }

    fn spawn_timer(self: &Arc<Self>) {
        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let shared = Arc::downgrade(self);
        let poll_interval = self.settings.poll_interval();

        let spawned = thread::Builder::new()
            .name(self.settings.timer_thread_name.clone())
            .spawn(move || run_timer(shared, cancel_rx, poll_interval));

        match spawned {
            Ok(handle) => {
                let mut timer = self.timer.lock().unwrap_or_else(|p| p.into_inner());
                *timer = Some(TimerThread {
                    cancel: cancel_tx,
                    handle,
                });
            }
            Err(e) => {
                log::error!("Failed to spawn timing thread: {}", e);
                self.lock_engine().stop();
            }
        }
    }

    fn cancel_timer(&self) {
        let timer = self
            .timer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();

        if let Some(TimerThread { cancel, handle }) = timer {
            drop(cancel);
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                log::error!("Timing thread panicked");
            }
        }
    }
}

/// Timing thread body: poll the engine, sleep until the next deadline
fn run_timer(shared: Weak<SchedulerShared>, cancel: Receiver<()>, poll_interval: Duration) {
    log::debug!("Timing thread running");

    loop {
        let wait = {
            let Some(shared) = shared.upgrade() else {
                break;
            };
            let mut engine = shared.lock_engine();
            let now = Instant::now();
            match engine.poll(now) {
                // Behind by more than a beat: one beat per poll interval, no burst
                Some(next) if next <= now => poll_interval,
                Some(next) => (next - now).min(poll_interval),
                None => break,
            }
        };

        match cancel.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log::debug!("Timing thread finished");
}

/// Beat scheduler with its own timing thread
///
/// Owned by the session controller. All control methods return promptly and
/// guarantee that no sound is played for the old run once they return.
pub struct BeatScheduler {
    shared: Arc<SchedulerShared>,
}

impl BeatScheduler {
    pub fn new(engine: BeatEngine, settings: SchedulerSettings) -> Self {
        let state = engine.state_handle();
        let config = engine.config().clone();
        Self {
            shared: Arc::new(SchedulerShared {
                engine: Mutex::new(engine),
                timer: Mutex::new(None),
                state,
                config,
                settings,
            }),
        }
    }

    /// Start ticking now, from the current beat
    pub fn start(&self) {
        self.shared.start();
    }

    /// Cancel all timers, keep the beat index and counters
    pub fn pause(&self) {
        self.shared.pause();
    }

    /// Restart from beat 0 of a fresh bar, keeping the completed bar count
    pub fn resume(&self) {
        self.shared.resume();
    }

    /// Cancel all timers and rewind to beat 0
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Lock-free read of the lifecycle state
    pub fn state(&self) -> SchedulerState {
        self.shared.state.get()
    }

    pub fn current_configuration(&self) -> Arc<ConfigurationSnapshot> {
        self.shared.config.current()
    }

    pub fn has_pending_subdivisions(&self) -> bool {
        self.shared.lock_engine().has_pending_subdivisions()
    }

    /// Non-owning handle for collaborators that need to stop playback
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl Drop for BeatScheduler {
    fn drop(&mut self) {
        self.shared.pause();
    }
}

/// Weak back-reference to a `BeatScheduler`
/// Calls become no-ops once the scheduler is dropped
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Weak<SchedulerShared>,
}

impl SchedulerHandle {
    pub fn stop(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.stop();
        }
    }

    pub fn state(&self) -> Option<SchedulerState> {
        self.shared.upgrade().map(|shared| shared.state.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::player::testing::RecordingPlayer;
    use crate::config::SubdivisionPattern;
    use crate::events::{MetronomeEvent, create_event_channel};

    fn scheduler(tempo: i64) -> (BeatScheduler, Arc<RecordingPlayer>, crate::events::EventReceiver) {
        let config = Arc::new(ConfigStore::default());
        config.set_tempo(tempo);
        let player = Arc::new(RecordingPlayer::default());
        let (tx, rx) = create_event_channel(1024);
        let engine = BeatEngine::new(config, player.clone(), tx);
        (
            BeatScheduler::new(engine, SchedulerSettings::default()),
            player,
            rx,
        )
    }

    #[test]
    fn test_scheduler_ticks_on_its_own_thread() {
        let (scheduler, player, mut rx) = scheduler(240);
        scheduler.start();
        assert_eq!(scheduler.state(), SchedulerState::Running);

        thread::sleep(Duration::from_millis(600));
        scheduler.stop();

        // Beats at 0, 250 and 500ms
        let beats = rx
            .drain()
            .into_iter()
            .filter(|e| matches!(e, MetronomeEvent::BeatAdvanced { .. }))
            .count();
        assert!(beats >= 3, "only {} beat events", beats);
        assert!(player.count() >= 3);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_no_sound_after_stop_returns() {
        let (scheduler, player, _rx) = scheduler(240);
        scheduler
            .shared
            .config
            .set_subdivision_pattern(SubdivisionPattern::sixteenths());

        scheduler.start();
        thread::sleep(Duration::from_millis(130));
        scheduler.stop();
        assert!(!scheduler.has_pending_subdivisions());

        let after_stop = player.count();
        thread::sleep(Duration::from_millis(300));
        assert_eq!(player.count(), after_stop);
    }

    #[test]
    fn test_pause_silences_and_resume_restarts() {
        let (scheduler, player, mut rx) = scheduler(240);
        scheduler.start();
        thread::sleep(Duration::from_millis(300));

        scheduler.pause();
        assert_eq!(scheduler.state(), SchedulerState::Paused);
        let paused_count = player.count();
        thread::sleep(Duration::from_millis(300));
        assert_eq!(player.count(), paused_count);

        rx.drain();
        scheduler.resume();
        assert_eq!(rx.try_recv(), Some(MetronomeEvent::BeatAdvanced { index: 0 }));
        assert_eq!(scheduler.current_configuration().current_beat_index, 0);
        scheduler.stop();
    }

    #[test]
    fn test_restart_replaces_timer_thread() {
        let (scheduler, _player, _rx) = scheduler(120);
        scheduler.start();
        scheduler.start();
        scheduler.start();

        assert_eq!(scheduler.state(), SchedulerState::Running);
        scheduler.stop();
        assert!(scheduler.shared.timer.lock().unwrap().is_none());
    }

    #[test]
    fn test_handle_outlives_scheduler_safely() {
        let (scheduler, _player, _rx) = scheduler(120);
        let handle = scheduler.handle();
        scheduler.start();
        assert_eq!(handle.state(), Some(SchedulerState::Running));

        handle.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        drop(scheduler);
        assert_eq!(handle.state(), None);
        handle.stop();
    }
}
