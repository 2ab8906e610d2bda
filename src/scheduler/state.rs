// Scheduler state - Lifecycle of the beat scheduler, readable without locks

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// idle -> running -> {paused, stopped}; paused -> {running, stopped}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle = 0,
    Running = 1,
    Paused = 2,
    Stopped = 3,
}

impl SchedulerState {
    pub fn is_running(&self) -> bool {
        matches!(self, SchedulerState::Running)
    }
}

impl From<u8> for SchedulerState {
    fn from(value: u8) -> Self {
        match value {
            1 => SchedulerState::Running,
            2 => SchedulerState::Paused,
            3 => SchedulerState::Stopped,
            _ => SchedulerState::Idle,
        }
    }
}

/// Atomic wrapper to share the state between the timing thread and the UI
#[derive(Debug, Clone, Default)]
pub struct AtomicSchedulerState {
    inner: Arc<AtomicU8>,
}

impl AtomicSchedulerState {
    pub fn new(state: SchedulerState) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(state as u8)),
        }
    }

    pub fn get(&self) -> SchedulerState {
        SchedulerState::from(self.inner.load(Ordering::Acquire))
    }

    pub fn set(&self, state: SchedulerState) {
        self.inner.store(state as u8, Ordering::Release);
    }
}
