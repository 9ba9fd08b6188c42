use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Countdown for one attempt. The budget is set when the quiz loads; the
/// countdown only begins once [`SessionTimer::start`] is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimer {
    budget: u64,
    remaining: u64,
    running: bool,
}

impl SessionTimer {
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            remaining: budget,
            running: false,
        }
    }

    /// Returns true if this call started the timer.
    pub fn start(&mut self) -> bool {
        if self.running || self.remaining == 0 {
            return false;
        }
        self.running = true;
        true
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Removes one second if running. Saturates at zero and stops there.
    pub fn tick(&mut self) -> u64 {
        if self.running {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.running = false;
            }
        }
        self.remaining
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }
}

/// Repeating one-second schedule for the running attempt. Elapsed
/// intervals are measured from a moving mark, so a caller that polls late
/// still sees every interval. Dropping it cancels the schedule.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    mark: Instant,
}

impl Ticker {
    pub fn every_second() -> Self {
        Self::with_interval(TICK_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            mark: Instant::now(),
        }
    }

    /// Number of whole intervals elapsed since the last call. The
    /// remainder carries over to the next call.
    pub fn drain(&mut self) -> usize {
        let elapsed = self.mark.elapsed();
        let count = (elapsed.as_nanos() / self.interval.as_nanos().max(1)) as u32;
        self.mark += self.interval * count;
        count as usize
    }
}

pub fn format_remaining(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
