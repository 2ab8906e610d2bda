// Metronome events - Notifications published towards the UI/state layer

use crate::practice::PracticeStatus;

/// Discrete events exposed by the metronome core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetronomeEvent {
    /// The beat at `index` (0-based within the bar) just started
    BeatAdvanced { index: u8 },
    /// A bar is about to complete; the synchronous hook runs right after
    BarWillComplete { next_bar_count: u64 },
    /// A bar completed and playback continues
    BarCompleted { completed_bars: u64 },
    /// Practice cycle `current` of `total` (1-based)
    PracticeCycleInfoChanged { current: u32, total: u32 },
    /// Progressive practice stage: tempo now and tempo of the next stage
    PracticeStageInfoChanged { current_bpm: u32, next_bpm: u32 },
    /// Elapsed practice progress of the current cycle
    PracticeProgressChanged { elapsed_time: u32, elapsed_bars: u32 },
    PracticeStatusChanged(PracticeStatus),
    PracticeCompleted,
}

impl MetronomeEvent {
    /// Events produced by the practice layer rather than the beat scheduler
    pub fn is_practice_event(&self) -> bool {
        matches!(
            self,
            MetronomeEvent::PracticeCycleInfoChanged { .. }
                | MetronomeEvent::PracticeStageInfoChanged { .. }
                | MetronomeEvent::PracticeProgressChanged { .. }
                | MetronomeEvent::PracticeStatusChanged(_)
                | MetronomeEvent::PracticeCompleted
        )
    }
}
