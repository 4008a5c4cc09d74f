use std::{fmt::Display, future::Future, time::Duration};
use tracing::warn;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts is `max_retries + 1`.
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after every failed attempt. No jitter, no cap.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            ..Default::default()
        }
    }

    /// Delay to use after `current`. Nonsensical factors (negative, NaN) keep the delay flat and
    /// overflow saturates instead of panicking.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let factor = if self.backoff_factor.is_finite() && self.backoff_factor >= 0.0 {
            self.backoff_factor
        } else {
            1.0
        };
        Duration::try_from_secs_f64(current.as_secs_f64() * factor).unwrap_or(Duration::MAX)
    }
}

/// Run `op` until it succeeds or the policy's retries are spent, sleeping between attempts with
/// exponential backoff. Returns the last error on exhaustion; callers add their own context.
pub async fn retry_with_backoff<T, E, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: impl FnMut() -> Fut + Send,
) -> Result<T, E>
where
    E: Display,
    Fut: Future<Output = Result<T, E>> + Send,
{
    let mut delay = policy.initial_delay;
    let mut retries_left = policy.max_retries;

    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if retries_left > 0 => {
                let attempt = policy.max_retries - retries_left + 1;
                warn!(
                    label,
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "Retry attempt {attempt} of {}",
                    policy.max_retries
                );
                tokio::time::sleep(delay).await;
                delay = policy.next_delay(delay);
                retries_left -= 1;
            }
            Err(e) => return Err(e),
        }
    }
}
