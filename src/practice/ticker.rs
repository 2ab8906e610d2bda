// Practice ticker - One-second driving loop for time-based practice
// Ticks are anchored to the start instant so the count does not drift

use super::cycle::{PracticeCore, lock_core};
use crate::events::BarDecision;
use crate::scheduler::SchedulerHandle;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::io;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Background thread counting practice seconds
pub(crate) struct PracticeTicker {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PracticeTicker {
    pub fn spawn(
        core: Arc<Mutex<PracticeCore>>,
        scheduler: SchedulerHandle,
        period: Duration,
        name: String,
    ) -> io::Result<Self> {
        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || run_ticker(core, scheduler, cancel_rx, period))?;

        Ok(Self {
            cancel: Some(cancel_tx),
            handle: Some(handle),
        })
    }

    /// Stop ticking and wait for the thread to exit
    pub fn cancel(&mut self) {
        self.cancel.take();

        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                log::error!("Practice ticker panicked");
            }
        }
    }
}

impl Drop for PracticeTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run_ticker(
    core: Arc<Mutex<PracticeCore>>,
    scheduler: SchedulerHandle,
    cancel: Receiver<()>,
    period: Duration,
) {
    log::debug!("Practice ticker running ({:?} per tick)", period);
    let mut next_tick = Instant::now() + period;

    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        match cancel.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
        next_tick += period;

        let decision = {
            let mut core = lock_core(&core);
            if !core.is_running() {
                break;
            }
            core.record_second()
        };

        // Core lock released: stopping joins the timing thread, whose bar
        // hook takes the same lock
        if decision == BarDecision::Halt {
            scheduler.stop();
            break;
        }
    }

    log::debug!("Practice ticker finished");
}
