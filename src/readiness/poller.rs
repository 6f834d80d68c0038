//! Readiness polling for freshly issued media URLs.
//!
//! Generation services can hand out a URL a moment before the object behind
//! it is stored. Displaying it straight away tends to produce an empty,
//! zero-length clip that the player then caches. The poller checks the URL
//! a bounded number of times and always finishes with a cache-busted URL.

use crate::readiness::cache_bust::{cache_bust, strip_query};
use crate::readiness::clock::{Clock, SystemClock};
use crate::readiness::outcome::PollOutcome;
use crate::readiness::policy::RetryPolicy;
use crate::readiness::probe::ExistenceCheck;
use std::future::Future;

/// Confirms that a media URL is servable before it is displayed.
///
/// Holds no mutable state, so one poller can serve any number of
/// concurrent polls.
#[derive(Debug, Clone)]
pub struct ReadinessPoller<E, C = SystemClock> {
    check: E,
    clock: C,
    policy: RetryPolicy,
}

impl<E: ExistenceCheck> ReadinessPoller<E, SystemClock> {
    /// Creates a poller using the system clock.
    pub fn new(check: E, policy: RetryPolicy) -> Self {
        Self::with_clock(check, SystemClock, policy)
    }
}

impl<E: ExistenceCheck, C: Clock> ReadinessPoller<E, C> {
    /// Creates a poller with an explicit clock.
    pub fn with_clock(check: E, clock: C, policy: RetryPolicy) -> Self {
        Self {
            check,
            clock,
            policy,
        }
    }

    /// The retry policy in use.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// The clock used for cache-busting tokens.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Checks `url` up to `max_attempts` times, waiting `delay` after each
    /// miss, and returns a cache-busted URL.
    ///
    /// Never fails. Exhausting the attempts yields
    /// [`PollOutcome::Unconfirmed`] with a usable URL.
    ///
    /// `url` must be an absolute URL. Nothing is validated here, so an empty
    /// string comes back as a bare `?t=<token>`.
    /// [`MediaPipeline`](crate::MediaPipeline) rejects such URLs before
    /// polling.
    pub async fn poll(&self, url: &str) -> PollOutcome {
        let clean = strip_query(url);
        let confirmed = self.confirm(clean).await;
        let busted = cache_bust(clean, self.clock.now_millis());

        if confirmed {
            PollOutcome::Confirmed(busted)
        } else {
            tracing::warn!(
                url = %clean,
                attempts = self.policy.max_attempts,
                "media not confirmed, showing best-effort URL"
            );
            PollOutcome::Unconfirmed(busted)
        }
    }

    /// Like [`poll`](Self::poll), but abandons remaining attempts and returns
    /// `None` as soon as `cancel` completes.
    pub async fn poll_until<F>(&self, url: &str, cancel: F) -> Option<PollOutcome>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                tracing::debug!(url = %strip_query(url), "readiness poll cancelled");
                None
            }
            outcome = self.poll(url) => Some(outcome),
        }
    }

    async fn confirm(&self, clean: &str) -> bool {
        for attempt in 1..=self.policy.max_attempts {
            if self.check.exists(clean).await {
                tracing::debug!(url = %clean, attempt, "media confirmed");
                return true;
            }
            tracing::debug!(
                url = %clean,
                attempt,
                max_attempts = self.policy.max_attempts,
                delay_ms = self.policy.delay.as_millis(),
                "media not ready yet"
            );
            tokio::time::sleep(self.policy.delay).await;
        }
        false
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Clock that follows tokio's (pausable) time, starting at `base`.
    pub struct TokioClock {
        base: u64,
        start: tokio::time::Instant,
    }

    impl TokioClock {
        pub fn starting_at(base: u64) -> Self {
            Self {
                base,
                start: tokio::time::Instant::now(),
            }
        }
    }

    impl Clock for TokioClock {
        fn now_millis(&self) -> u64 {
            self.base + self.start.elapsed().as_millis() as u64
        }
    }

    /// Simulated round trip of one scripted check.
    pub const CHECK_LATENCY: std::time::Duration = std::time::Duration::from_millis(1);

    /// Existence check that replays scripted answers and records each call.
    ///
    /// Each answer takes [`CHECK_LATENCY`] of tokio time to arrive.
    #[derive(Default)]
    pub struct ScriptedCheck {
        answers: Mutex<VecDeque<bool>>,
        pub calls: Mutex<Vec<(String, tokio::time::Instant)>>,
    }

    impl ScriptedCheck {
        pub fn new(answers: &[bool]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().copied().collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ExistenceCheck for ScriptedCheck {
        async fn exists(&self, url: &str) -> bool {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), tokio::time::Instant::now()));
            let answer = self.answers.lock().unwrap().pop_front().unwrap_or(false);
            tokio::time::sleep(CHECK_LATENCY).await;
            answer
        }
    }
}
