use crate::infrastructure::config::RetryConfig;
use crate::infrastructure::logger::Logger;
use rand::Rng;
use recovery_wallet_core::shared::constants::{MAX_RETRY_ATTEMPTS, RETRY_BACKOFF_BASE, RETRY_JITTER};
use recovery_wallet_core::{Chain, RecoveryError};
use std::future::Future;
use std::time::Duration;

/// Bounded retry for per-chain reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRY_ATTEMPTS,
            backoff_base: Duration::from_millis(RETRY_BACKOFF_BASE),
            jitter: Duration::from_millis(RETRY_JITTER),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration, jitter: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
            jitter,
        }
    }

    /// Retry without waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
            Duration::from_millis(config.jitter_ms),
        )
    }

    /// Exponential backoff plus random jitter before attempt `attempt + 1`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let base = self.backoff_base.saturating_mul(1u32 << exponent);
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
    }

    /// Run `op` until it succeeds or `max_attempts` is reached, returning the last error
    pub async fn run<T, F, Fut>(&self, chain: Chain, mut op: F) -> Result<T, RecoveryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RecoveryError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    Logger::chain_fetch_failed(chain, attempt, self.max_attempts, &e.to_string());
                    if attempt >= self.max_attempts {
                        return Err(e);
                    }
                    let delay = self.delay_for(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
