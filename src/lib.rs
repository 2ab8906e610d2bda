// Metronome Core - Library exports for the app shell, tests and benchmarks

pub mod audio;
pub mod config;
pub mod events;
pub mod practice;
pub mod scheduler;

// Re-export commonly used types for convenience
pub use audio::{PlaybackError, SilentPlayer, SoundPlayer};
pub use config::{
    BeatStatus, ConfigError, ConfigStore, ConfigurationSnapshot, SchedulerSettings,
    SubdivisionNote, SubdivisionPattern,
};
pub use events::{
    BarCompletionHook, BarDecision, EventReceiver, EventSender, MetronomeEvent,
    create_event_channel,
};
pub use practice::{CountdownTarget, PracticeMode, PracticeSession, PracticeState, PracticeStatus};
pub use scheduler::{BeatEngine, BeatScheduler, SchedulerHandle, SchedulerState};
