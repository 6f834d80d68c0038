//! Bounded retry policy for readiness checks.

use crate::error::{AvatarGenError, Result};
use std::time::Duration;

/// Env var overriding [`RetryPolicy::max_attempts`].
pub const ATTEMPTS_ENV: &str = "AVATARGEN_POLL_ATTEMPTS";

/// Env var overriding [`RetryPolicy::delay`], in milliseconds.
pub const DELAY_ENV: &str = "AVATARGEN_POLL_DELAY_MS";

/// How many existence checks to run and how long to wait after a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of existence checks. Zero skips checking entirely.
    pub max_attempts: u32,
    /// Wait after each failed check.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_millis(800),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Default policy with `AVATARGEN_POLL_ATTEMPTS` / `AVATARGEN_POLL_DELAY_MS`
    /// applied when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut policy = Self::default();

        if let Some(raw) = lookup(ATTEMPTS_ENV) {
            policy.max_attempts = raw.trim().parse().map_err(|_| {
                AvatarGenError::Validation(format!("{ATTEMPTS_ENV} must be a whole number, got {raw:?}"))
            })?;
        }
        if let Some(raw) = lookup(DELAY_ENV) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                AvatarGenError::Validation(format!("{DELAY_ENV} must be milliseconds, got {raw:?}"))
            })?;
            policy.delay = Duration::from_millis(millis);
        }

        Ok(policy)
    }

    /// Worst-case time spent waiting, excluding check latency.
    pub fn max_wait(&self) -> Duration {
        self.delay * self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.delay, Duration::from_millis(800));
        assert_eq!(policy.max_wait(), Duration::from_millis(1600));
    }

    #[test]
    fn test_lookup_overrides() {
        let policy =
            RetryPolicy::from_lookup(lookup(&[(ATTEMPTS_ENV, "5"), (DELAY_ENV, " 250 ")])).unwrap();
        assert_eq!(policy, RetryPolicy::new(5, Duration::from_millis(250)));
    }

    #[test]
    fn test_lookup_missing_keeps_defaults() {
        let policy = RetryPolicy::from_lookup(lookup(&[])).unwrap();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn test_lookup_rejects_garbage() {
        let err = RetryPolicy::from_lookup(lookup(&[(ATTEMPTS_ENV, "two")])).unwrap_err();
        assert!(matches!(err, AvatarGenError::Validation(_)));

        let err = RetryPolicy::from_lookup(lookup(&[(DELAY_ENV, "-1")])).unwrap_err();
        assert!(matches!(err, AvatarGenError::Validation(_)));
    }
}
