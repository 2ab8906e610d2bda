// Practice - Countdown and progressive practice sessions on top of the scheduler

mod cycle;
pub mod handler;
pub mod session;
pub mod state;
mod ticker;

pub use handler::{CountdownHandler, CycleHandler, CycleOutcome, ProgressiveHandler, StageInfo};
pub use session::PracticeSession;
pub use state::{CountdownTarget, CountdownType, PracticeMode, PracticeState, PracticeStatus};
