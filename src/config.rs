//! Protocol Configuration
//!
//! Tunables for the ledger and client. Defaults match the deployed
//! behaviour (daily nullifier period, 280-char comments); every field can be
//! overridden from the environment.

use std::time::Duration;

use crate::core::clock::DEFAULT_PERIOD_SECS;

/// Retry policy for transient ledger transport failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub base_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based): base * 2^attempt, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Ledger and client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Length of one nullifier period in seconds.
    pub period_secs: u64,
    /// Largest page returned by a confession query.
    pub max_page_size: usize,
    /// Longest accepted comment, in characters.
    pub max_comment_len: usize,
    /// Transport retry behaviour.
    pub retry: RetryPolicy,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            period_secs: DEFAULT_PERIOD_SECS,
            max_page_size: 50,
            max_comment_len: 280,
            retry: RetryPolicy::default(),
        }
    }
}

impl ProtocolConfig {
    /// Create config from environment variables.
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            period_secs: env_parse("CONFESSION_PERIOD_SECS").unwrap_or(defaults.period_secs),
            max_page_size: env_parse("CONFESSION_MAX_PAGE_SIZE").unwrap_or(defaults.max_page_size),
            max_comment_len: env_parse("CONFESSION_MAX_COMMENT_LEN")
                .unwrap_or(defaults.max_comment_len),
            retry: RetryPolicy {
                max_retries: env_parse("CONFESSION_MAX_RETRIES")
                    .unwrap_or(defaults.retry.max_retries),
                base_delay: env_parse("CONFESSION_RETRY_BASE_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.base_delay),
                max_delay: defaults.retry.max_delay,
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
