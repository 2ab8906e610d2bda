use metronome_core::audio::PlaybackResult;
use metronome_core::{
    BeatStatus, ConfigStore, CountdownTarget, MetronomeEvent, PracticeSession, PracticeStatus,
    SchedulerSettings, SoundPlayer, SubdivisionPattern, create_event_channel,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// Console stand-in for the audio layer
struct ConsolePlayer;

impl SoundPlayer for ConsolePlayer {
    fn ensure_engine_running(&self) -> PlaybackResult<()> {
        Ok(())
    }

    fn play_sound(&self, sound_set: &str, status: BeatStatus) -> PlaybackResult<()> {
        let glyph = match status {
            BeatStatus::Strong => "TICK",
            BeatStatus::Medium => "Tick",
            BeatStatus::Normal => "tick",
            BeatStatus::Muted => return Ok(()),
        };
        println!("  [{}] {}", sound_set, glyph);
        Ok(())
    }
}

fn print_event(event: MetronomeEvent) {
    match event {
        MetronomeEvent::BeatAdvanced { .. } => {}
        MetronomeEvent::BarCompleted { completed_bars } => {
            println!("-- bar {} --", completed_bars);
        }
        MetronomeEvent::PracticeCycleInfoChanged { current, total } => {
            println!("Cycle {}/{}", current, total);
        }
        MetronomeEvent::PracticeStageInfoChanged {
            current_bpm,
            next_bpm,
        } => {
            println!("Stage {} BPM (next {} BPM)", current_bpm, next_bpm);
        }
        MetronomeEvent::PracticeCompleted => println!("Practice completed!"),
        other => log::debug!("{:?}", other),
    }
}

fn main() {
    // Also picks up the library's `log` records
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Metronome Core ===");
    println!("Usage: metronome_core [countdown|progressive] [settings.ron]\n");

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| "countdown".to_string());
    let settings = match args.next() {
        Some(path) => match SchedulerSettings::load(Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                return;
            }
        },
        None => SchedulerSettings::default(),
    };

    let config = Arc::new(ConfigStore::default());
    config.set_tempo(150);
    config.update_beats_per_bar(3);

    let (event_tx, mut event_rx) = create_event_channel(settings.event_capacity);
    let session = PracticeSession::new(config.clone(), Arc::new(ConsolePlayer), event_tx, settings);

    match mode.as_str() {
        "progressive" => {
            config.set_subdivision_pattern(SubdivisionPattern::eighths());
            session.setup_progressive_practice(CountdownTarget::Bars { count: 2 }, 100, 140, 20);
        }
        _ => session.setup_countdown_practice(CountdownTarget::Bars { count: 4 }, false),
    }

    println!("Starting {} practice...\n", mode);
    session.start_practice();

    while session.practice_state().status == PracticeStatus::Running {
        for event in event_rx.drain() {
            print_event(event);
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    for event in event_rx.drain() {
        print_event(event);
    }

    let state = session.practice_state();
    println!(
        "\nFinished: {:?}, {} bar(s), {} s",
        state.status, state.elapsed_bars, state.elapsed_time
    );
}
