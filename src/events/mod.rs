// Events - Notifications from the metronome core to its observers
// Asynchronous ring buffer for the UI, synchronous hook for bar decisions

pub mod channels;
pub mod event;
pub mod hook;

pub use channels::{EventReceiver, EventSender, create_event_channel};
pub use event::MetronomeEvent;
pub use hook::{BarCompletionHook, BarDecision};
