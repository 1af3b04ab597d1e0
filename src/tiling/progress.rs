use std::time::Duration;

/// Snapshot of a running batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
    pub elapsed: Duration,
    pub remaining: Duration,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.done as f64 * 100.0 / self.total as f64
        }
    }
}

/// Estimates time remaining from the mean of the item durations seen so far.
#[derive(Debug, Clone)]
pub struct EtaTracker {
    total: usize,
    durations: Vec<Duration>,
}

impl EtaTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            durations: Vec::with_capacity(total),
        }
    }

    /// Record one finished item.
    pub fn record(&mut self, duration: Duration) -> Progress {
        self.durations.push(duration);

        let done = self.durations.len();
        let elapsed: Duration = self.durations.iter().sum();
        let mean = elapsed.as_secs_f64() / done as f64;
        let left = self.total.saturating_sub(done);

        Progress {
            done,
            total: self.total,
            elapsed,
            remaining: Duration::from_secs_f64(mean * left as f64),
        }
    }
}
