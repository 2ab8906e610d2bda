// Bar hook - Synchronous callback invoked on the timing thread before a bar ends

/// What the scheduler should do with the beat that follows a completed bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarDecision {
    /// Play the next bar's first beat as usual
    Continue,
    /// The practice target was reached: suppress the next beat and stop
    Halt,
}

/// Observer consulted synchronously when a bar is about to complete
///
/// Runs on the timing thread while the scheduler waits, so implementations
/// must only mutate in-memory state: no I/O, no calls back into the scheduler.
pub trait BarCompletionHook: Send + Sync {
    fn on_bar_will_complete(&self, next_bar_count: u64) -> BarDecision;
}

impl<F> BarCompletionHook for F
where
    F: Fn(u64) -> BarDecision + Send + Sync,
{
    fn on_bar_will_complete(&self, next_bar_count: u64) -> BarDecision {
        self(next_bar_count)
    }
}
