// Scheduler - Beat timing, subdivisions and the timing thread

pub mod beat_scheduler;
pub mod clock;
pub mod engine;
pub mod state;
pub mod subdivision;

pub use beat_scheduler::{BeatScheduler, SchedulerHandle};
pub use clock::BeatClock;
pub use engine::BeatEngine;
pub use state::{AtomicSchedulerState, SchedulerState};
pub use subdivision::{SubdivisionPlayer, note_offsets};
