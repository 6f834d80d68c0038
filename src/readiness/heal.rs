//! One-shot recovery after a playback failure.
//!
//! When a player fails on a delivered URL (typically a decoder error on a
//! cached empty response), the source is swapped once for a URL with a
//! newer cache-busting token. No existence check and no delay; a second
//! failure is left to the user.

use crate::readiness::cache_bust::{cache_bust, strip_query, token_of};
use crate::readiness::clock::Clock;
use crate::readiness::outcome::PollOutcome;

/// A media URL as handed to a display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSource {
    url: String,
    token: u64,
    healed: bool,
}

impl PlaybackSource {
    /// Wraps a URL, cache-busting it with the clock if it carries no token.
    pub fn new(url: &str, clock: &impl Clock) -> Self {
        let token = token_of(url).unwrap_or_else(|| clock.now_millis());
        Self {
            url: cache_bust(url, token),
            token,
            healed: false,
        }
    }

    /// Starts from a poll result.
    pub fn from_outcome(outcome: &PollOutcome, clock: &impl Clock) -> Self {
        Self::new(outcome.url(), clock)
    }

    /// URL to hand to the player.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current cache-busting token.
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Whether the one recovery attempt has been used.
    pub fn is_healed(&self) -> bool {
        self.healed
    }

    /// Handles a playback failure.
    ///
    /// Returns a replacement source with a strictly newer token the first
    /// time, and `None` for a source that was already healed or whose token
    /// cannot advance any further.
    pub fn heal(&self, clock: &impl Clock) -> Option<PlaybackSource> {
        if self.healed {
            tracing::debug!(url = %self.url, "playback failed again, not retrying");
            return None;
        }

        let Some(token) = clock.now_millis().max(self.token).checked_add(1) else {
            tracing::debug!(url = %self.url, "cache-buster token exhausted, not retrying");
            return None;
        };
        let url = cache_bust(strip_query(&self.url), token);
        tracing::debug!(url = %url, "retrying playback with fresh cache-buster");

        Some(Self {
            url,
            token,
            healed: true,
        })
    }
}
