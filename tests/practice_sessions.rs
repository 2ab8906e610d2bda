// Integration test: Practice sessions end to end
//
// Drives PracticeSession against the real timing thread at fast tempi
// and a shortened practice "second".

use metronome_core::audio::PlaybackResult;
use metronome_core::{
    BeatStatus, ConfigStore, CountdownTarget, EventReceiver, MetronomeEvent, PracticeSession,
    PracticeStatus, SchedulerSettings, SchedulerState, SoundPlayer, create_event_channel,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Default)]
struct CountingPlayer {
    played: AtomicUsize,
}

impl CountingPlayer {
    fn count(&self) -> usize {
        self.played.load(Ordering::SeqCst)
    }
}

impl SoundPlayer for CountingPlayer {
    fn ensure_engine_running(&self) -> PlaybackResult<()> {
        Ok(())
    }

    fn play_sound(&self, _sound_set: &str, _status: BeatStatus) -> PlaybackResult<()> {
        self.played.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Fixture {
    session: PracticeSession,
    config: Arc<ConfigStore>,
    player: Arc<CountingPlayer>,
    events: EventReceiver,
}

fn fixture(tempo: i64, beats_per_bar: u8, practice_tick_ms: u64) -> Fixture {
    let config = Arc::new(ConfigStore::default());
    config.set_tempo(tempo);
    config.update_beats_per_bar(beats_per_bar);
    let player = Arc::new(CountingPlayer::default());
    let (tx, events) = create_event_channel(4096);
    let settings = SchedulerSettings {
        practice_tick_ms,
        ..SchedulerSettings::default()
    };

    Fixture {
        session: PracticeSession::new(config.clone(), player.clone(), tx, settings),
        config,
        player,
        events,
    }
}

/// Poll until `done` holds or `timeout` passes
fn wait_for(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn test_bar_countdown_stops_before_fifth_bar() {
    // 240 BPM in 2/4: a bar every 500ms
    let mut fx = fixture(240, 2, 1000);
    fx.session
        .setup_countdown_practice(CountdownTarget::Bars { count: 4 }, false);
    fx.session.start_practice();

    assert!(wait_for(Duration::from_secs(4), || {
        fx.session.practice_state().status == PracticeStatus::Completed
    }));
    thread::sleep(Duration::from_millis(600));

    let state = fx.session.practice_state();
    assert_eq!(state.elapsed_bars, 4);
    assert_eq!(fx.session.scheduler_state(), SchedulerState::Stopped);
    // Four full bars of two beats; the fifth bar's downbeat never sounds
    assert_eq!(fx.player.count(), 8);

    let events = fx.events.drain();
    let will_complete = events
        .iter()
        .filter(|e| matches!(e, MetronomeEvent::BarWillComplete { .. }))
        .count();
    assert_eq!(will_complete, 4);
    assert!(events.contains(&MetronomeEvent::PracticeCompleted));
    assert_eq!(fx.config.current().current_beat_index, 0);
}

#[test]
fn test_progressive_ramp_completes_at_target() {
    // One bar per cycle, one beat per bar
    let mut fx = fixture(120, 1, 1000);
    fx.session
        .setup_progressive_practice(CountdownTarget::Bars { count: 1 }, 200, 240, 20);
    assert_eq!(fx.session.practice_state().total_cycles, 2);

    fx.session.start_practice();
    assert_eq!(fx.config.current().tempo, 200);

    assert!(wait_for(Duration::from_secs(3), || {
        fx.session.practice_state().status == PracticeStatus::Completed
    }));

    let state = fx.session.practice_state();
    assert_eq!(state.current_bpm, Some(240));
    assert_eq!(state.current_cycle, 2);
    // The target is reached by completing, never by playing past it
    assert_eq!(fx.config.current().tempo, 220);

    let stages: Vec<(u32, u32)> = fx
        .events
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            MetronomeEvent::PracticeStageInfoChanged {
                current_bpm,
                next_bpm,
            } => Some((current_bpm, next_bpm)),
            _ => None,
        })
        .collect();
    assert_eq!(stages, vec![(200, 220), (220, 240)]);
}

#[test]
fn test_looping_time_countdown_keeps_playing() {
    let mut fx = fixture(120, 4, 20);
    fx.session
        .setup_countdown_practice(CountdownTarget::Time { seconds: 2 }, true);
    fx.session.start_practice();

    assert!(wait_for(Duration::from_secs(2), || {
        fx.session.practice_state().current_cycle >= 3
    }));
    assert_eq!(fx.session.practice_state().status, PracticeStatus::Running);
    assert_eq!(fx.session.scheduler_state(), SchedulerState::Running);

    fx.session.stop();
    let state = fx.session.practice_state();
    assert_eq!(state.status, PracticeStatus::Standby);
    assert_eq!(state.progress(), 0.0);

    let cycles = fx
        .events
        .drain()
        .into_iter()
        .filter(|e| matches!(e, MetronomeEvent::PracticeCycleInfoChanged { .. }))
        .count();
    assert!(cycles >= 3);
}

#[test]
fn test_pause_resume_keeps_bar_progress() {
    // 240 BPM in 1/4: a bar every 250ms
    let fx = fixture(240, 1, 1000);
    fx.session
        .setup_countdown_practice(CountdownTarget::Bars { count: 100 }, false);
    fx.session.start_practice();
    assert!(wait_for(Duration::from_secs(2), || {
        fx.session.practice_state().elapsed_bars >= 2
    }));

    fx.session.pause_practice();
    let paused = fx.session.practice_state();
    assert_eq!(paused.status, PracticeStatus::Paused);
    thread::sleep(Duration::from_millis(400));
    assert_eq!(fx.session.practice_state().elapsed_bars, paused.elapsed_bars);

    fx.session.resume_practice();
    assert!(wait_for(Duration::from_secs(2), || {
        fx.session.practice_state().elapsed_bars > paused.elapsed_bars
    }));
    fx.session.stop_practice(PracticeStatus::Completed);

    let state = fx.session.practice_state();
    assert_eq!(state.status, PracticeStatus::Completed);
    assert_eq!(state.elapsed_bars, 100);
    assert_eq!(state.progress(), 1.0);
}

#[test]
fn test_bar_mode_also_counts_elapsed_time() {
    let fx = fixture(60, 4, 20);
    fx.session
        .setup_countdown_practice(CountdownTarget::Bars { count: 50 }, false);
    fx.session.start_practice();

    assert!(wait_for(Duration::from_secs(2), || {
        fx.session.practice_state().elapsed_time >= 5
    }));
    let state = fx.session.practice_state();
    assert_eq!(state.status, PracticeStatus::Running);
    assert_eq!(state.elapsed_bars, 0);
    fx.session.stop();
}

#[test]
fn test_restarting_a_completed_session() {
    let fx = fixture(240, 1, 1000);
    fx.session
        .setup_countdown_practice(CountdownTarget::Bars { count: 1 }, false);

    for _ in 0..2 {
        fx.session.play();
        assert!(wait_for(Duration::from_secs(2), || {
            fx.session.practice_state().status == PracticeStatus::Completed
        }));
        assert!(wait_for(Duration::from_secs(1), || {
            fx.session.scheduler_state() == SchedulerState::Stopped
        }));
    }
    assert_eq!(fx.config.current().completed_bars, 0);
}
