use log::warn;
use rand::Rng;
use std::thread;
use std::time::Duration;

use crate::error::Result;

/// Bounded exponential backoff for calls to external services.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1 = first retry), without jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn jittered(&self, attempt: u32) -> Duration {
        let delay = self.backoff(attempt);
        let spread = (delay.as_millis() / 4) as u64;
        if spread == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=spread))
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempt budget is spent. The last error is returned.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && e.is_transient() => {
                    let delay = self.jittered(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        what, attempt, self.max_attempts, e, delay
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
