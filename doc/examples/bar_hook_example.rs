// Example: Driving the beat scheduler directly with a bar hook
// Shows the synchronous bar-will-complete decision without a practice session

use metronome_core::{
    BarDecision, BeatEngine, BeatScheduler, ConfigStore, MetronomeEvent, SchedulerSettings,
    SilentPlayer, SubdivisionPattern, create_event_channel,
};
use std::sync::Arc;
use std::time::Duration;

fn main() {
    // Configure musical context: 180 BPM, 3/4, triplet feel
    let config = Arc::new(ConfigStore::default());
    config.set_tempo(180);
    config.update_beats_per_bar(3);
    config.set_subdivision_pattern(SubdivisionPattern::triplets());

    let (event_tx, mut event_rx) = create_event_channel(256);

    // Runs on the timing thread: keep it to pure state checks
    let hook = |next_bar_count: u64| {
        if next_bar_count >= 3 {
            BarDecision::Halt
        } else {
            BarDecision::Continue
        }
    };

    let engine = BeatEngine::new(config, Arc::new(SilentPlayer), event_tx).with_bar_hook(Arc::new(hook));
    let scheduler = BeatScheduler::new(engine, SchedulerSettings::default());

    println!("Three bars of 3/4 at 180 BPM, then the hook halts playback\n");
    scheduler.start();
    std::thread::sleep(Duration::from_secs(4));

    for event in event_rx.drain() {
        match event {
            MetronomeEvent::BeatAdvanced { index } => print!("{} ", index + 1),
            MetronomeEvent::BarCompleted { completed_bars } => println!("| bar {}", completed_bars),
            MetronomeEvent::BarWillComplete { next_bar_count } => {
                println!("(bar {} ending)", next_bar_count)
            }
            _ => {}
        }
    }
    println!("\nScheduler state: {:?}", scheduler.state());
}
