use std::time::Duration;

pub type Task = Box<dyn FnOnce()>;

/// Deferred execution on the UI thread. Tasks never run re-entrantly
/// from inside `post`/`post_delayed`.
pub trait Scheduler {
    /// Monotonic milliseconds. Touch event timestamps use the same clock.
    fn now_ms(&self) -> u64;
    fn post(&self, task: Task);
    fn post_delayed(&self, delay_ms: u64, task: Task);
}

/// Scheduler backed by a tokio `LocalSet`. Must be used from inside
/// `LocalSet::run_until`/`block_on`.
pub struct TokioScheduler {
    start: tokio::time::Instant,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            start: tokio::time::Instant::now(),
        }
    }

    pub fn start(&self) -> tokio::time::Instant {
        self.start
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn post(&self, task: Task) {
        tokio::task::spawn_local(async move {
            task();
        });
    }

    fn post_delayed(&self, delay_ms: u64, task: Task) {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            task();
        });
    }
}

#[cfg(test)]
pub use manual::ManualScheduler;
