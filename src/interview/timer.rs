use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, Deserialize};
use log::{info, debug};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const TICK: Duration = Duration::from_secs(1);

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub is_active: bool,
}

/// Answer countdown with one-second granularity. Purely local state: the
/// owner calls [`CountdownTimer::tick`] once per second, or hands the timer
/// to a [`CountdownHandle`] which does it on a tokio interval.
#[derive(Debug, Clone, Default)]
pub struct CountdownTimer {
    remaining: u32,
    active: bool,
}

impl CountdownTimer {
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining: seconds,
            active: false,
        }
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    /// Halts without touching the remaining time.
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn reset(&mut self, seconds: u32) {
        self.active = false;
        self.remaining = seconds;
    }

    pub fn tick(&mut self) {
        if !self.active {
            return;
        }
        if self.remaining <= 1 {
            self.remaining = 0;
            self.active = false;
        } else {
            self.remaining -= 1;
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            remaining_seconds: self.remaining,
            is_active: self.active,
        }
    }

    /// `MM:SS`, e.g. 120 seconds renders as `02:00`.
    pub fn formatted(&self) -> String {
        format_seconds(self.remaining)
    }
}

pub fn format_seconds(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Shares a [`CountdownTimer`] with a background ticker task.
///
/// The task exits on its own once the countdown reaches zero and is aborted
/// by `stop`, `reset` and on drop, so a discarded view never leaks an
/// interval.
pub struct CountdownHandle {
    timer: Arc<Mutex<CountdownTimer>>,
    period: Duration,
    ticker: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    pub fn new(seconds: u32) -> Self {
        Self::with_period(seconds, TICK)
    }

    pub fn with_period(seconds: u32, period: Duration) -> Self {
        Self {
            timer: Arc::new(Mutex::new(CountdownTimer::new(seconds))),
            period,
            ticker: None,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.abort_ticker();
        self.timer.lock().start();
        info!("⏱️ Countdown started at {}", self.timer.lock().formatted());

        let timer = Arc::clone(&self.timer);
        let period = self.period;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let finished = {
                    let mut guard = timer.lock();
                    guard.tick();
                    !guard.is_active()
                };
                if finished {
                    debug!("Countdown finished");
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        self.abort_ticker();
        self.timer.lock().stop();
    }

    pub fn reset(&mut self, seconds: u32) {
        self.abort_ticker();
        self.timer.lock().reset(seconds);
    }

    pub fn state(&self) -> TimerState {
        self.timer.lock().state()
    }

    pub fn remaining(&self) -> u32 {
        self.timer.lock().remaining()
    }

    pub fn is_active(&self) -> bool {
        self.timer.lock().is_active()
    }

    pub fn formatted(&self) -> String {
        self.timer.lock().formatted()
    }

    fn abort_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.abort_ticker();
    }
}
