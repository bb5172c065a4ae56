//! Countdown clocks driving timed sessions.
//!
//! A [`Timer`] runs at most one countdown at a time on the tokio runtime and
//! reports progress as [`TimerEvent`]s on a channel owned by the event loop.
//! Every countdown gets a fresh epoch so events from a superseded countdown
//! that were already queued can be told apart and dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Interval between two ticks.
pub const TICK: Duration = Duration::from_secs(1);

/// Something a session can start and cancel countdowns on.
pub trait Clock {
    /// Start a countdown of `seconds`, replacing any running one.
    fn start(&mut self, seconds: u32);

    /// Stop the running countdown. Safe to call when nothing runs.
    fn cancel(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; `remaining` reaches 0 on the last tick.
    Tick { epoch: u64, remaining: u32 },
    /// Sent exactly once, right after the tick at 0.
    Expired { epoch: u64 },
}

impl TimerEvent {
    pub fn epoch(&self) -> u64 {
        match self {
            TimerEvent::Tick { epoch, .. } | TimerEvent::Expired { epoch } => *epoch,
        }
    }
}

/// Tokio-backed countdown.
pub struct Timer {
    events: mpsc::UnboundedSender<TimerEvent>,
    epoch: u64,
    task: Option<JoinHandle<()>>,
}

impl Timer {
    /// Create a timer and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let timer = Self {
            events,
            epoch: 0,
            task: None,
        };
        (timer, rx)
    }

    /// Whether `event` belongs to the countdown currently running.
    pub fn is_current(&self, event: &TimerEvent) -> bool {
        self.task.is_some() && event.epoch() == self.epoch
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn stop_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Clock for Timer {
    fn start(&mut self, seconds: u32) {
        self.stop_task();
        self.epoch += 1;
        tracing::debug!(epoch = self.epoch, seconds, "countdown started");
        let task = tokio::spawn(run_countdown(self.epoch, seconds, self.events.clone()));
        self.task = Some(task);
    }

    fn cancel(&mut self) {
        if self.task.is_some() {
            tracing::debug!(epoch = self.epoch, "countdown cancelled");
        }
        self.stop_task();
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop_task();
    }
}

async fn run_countdown(epoch: u64, seconds: u32, events: mpsc::UnboundedSender<TimerEvent>) {
    if seconds == 0 {
        let _ = events.send(TimerEvent::Tick { epoch, remaining: 0 });
        let _ = events.send(TimerEvent::Expired { epoch });
        return;
    }

    let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut remaining = seconds;
    while remaining > 0 {
        ticker.tick().await;
        remaining -= 1;
        if events.send(TimerEvent::Tick { epoch, remaining }).is_err() {
            return;
        }
    }

    let _ = events.send(TimerEvent::Expired { epoch });
}

/// Clock that never fires on its own.
///
/// Records what the session asked of it so headless drivers and tests can
/// deliver ticks and expiry by hand.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ManualClock {
    /// Durations passed to every `start`, oldest first.
    pub starts: Vec<u32>,
    /// Number of `cancel` calls.
    pub cancels: usize,
    running: Option<u32>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duration of the countdown currently running, if any.
    pub fn running(&self) -> Option<u32> {
        self.running
    }
}

impl Clock for ManualClock {
    fn start(&mut self, seconds: u32) {
        self.starts.push(seconds);
        self.running = Some(seconds);
    }

    fn cancel(&mut self) {
        self.cancels += 1;
        self.running = None;
    }
}
