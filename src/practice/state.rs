// Practice Session State - Mode, status and progress of a practice session

use serde::{Deserialize, Serialize};

/// Lifecycle of a practice session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PracticeStatus {
    #[default]
    Standby,
    Running,
    Paused,
    Completed,
}

impl PracticeStatus {
    /// Running or paused: a session is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, PracticeStatus::Running | PracticeStatus::Paused)
    }
}

/// Unit a countdown is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownType {
    Time,
    Bar,
}

/// Goal of one practice cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownTarget {
    /// Elapsed practice time in seconds
    Time { seconds: u32 },
    /// Completed bars
    Bars { count: u32 },
}

impl CountdownTarget {
    pub fn countdown_type(&self) -> CountdownType {
        match self {
            CountdownTarget::Time { .. } => CountdownType::Time,
            CountdownTarget::Bars { .. } => CountdownType::Bar,
        }
    }

    /// Target amount in its own unit, at least 1
    pub fn amount(&self) -> u32 {
        match self {
            CountdownTarget::Time { seconds } => (*seconds).max(1),
            CountdownTarget::Bars { count } => (*count).max(1),
        }
    }
}

/// Practice mode, one variant per kind of session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PracticeMode {
    #[default]
    None,
    Countdown {
        target: CountdownTarget,
        loop_enabled: bool,
    },
    Progressive {
        target: CountdownTarget,
        start_bpm: u32,
        target_bpm: u32,
        step_bpm: u32,
    },
}

impl PracticeMode {
    pub fn target(&self) -> Option<CountdownTarget> {
        match self {
            PracticeMode::None => None,
            PracticeMode::Countdown { target, .. } | PracticeMode::Progressive { target, .. } => {
                Some(*target)
            }
        }
    }

    pub fn is_loop_enabled(&self) -> bool {
        matches!(
            self,
            PracticeMode::Countdown {
                loop_enabled: true,
                ..
            }
        )
    }
}

/// Observable state of a practice session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PracticeState {
    pub mode: PracticeMode,
    pub status: PracticeStatus,
    /// Seconds practised in the current cycle
    pub elapsed_time: u32,
    /// Bars completed in the current cycle
    pub elapsed_bars: u32,
    /// 1-based once the session has started
    pub current_cycle: u32,
    pub total_cycles: u32,
    /// Progressive mode only
    pub current_bpm: Option<u32>,
    pub next_bpm: Option<u32>,
}

impl PracticeState {
    /// Elapsed amount in the unit of the current target
    pub fn elapsed(&self) -> u32 {
        match self.mode.target().map(|t| t.countdown_type()) {
            Some(CountdownType::Time) => self.elapsed_time,
            Some(CountdownType::Bar) => self.elapsed_bars,
            None => 0,
        }
    }

    /// Fraction of the current cycle done, 0.0..=1.0
    pub fn progress(&self) -> f64 {
        match self.mode.target() {
            Some(target) => (self.elapsed() as f64 / target.amount() as f64).min(1.0),
            None => 0.0,
        }
    }

    /// Amount left in the current cycle, in the target's unit
    pub fn remaining(&self) -> Option<u32> {
        self.mode
            .target()
            .map(|target| target.amount().saturating_sub(self.elapsed()))
    }
}
