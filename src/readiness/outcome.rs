//! Result of a readiness poll.

use serde::{Deserialize, Serialize};

/// Whether a media URL was confirmed servable before display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// An existence check succeeded.
    Confirmed,
    /// Every check failed; the URL may still become playable shortly.
    Unconfirmed,
}

/// Outcome of [`crate::readiness::ReadinessPoller::poll`].
///
/// Both variants carry a non-empty, cache-busted URL. `Unconfirmed` is not
/// an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "url", rename_all = "lowercase")]
pub enum PollOutcome {
    /// The media responded to an existence check.
    Confirmed(String),
    /// Attempts ran out; best-effort URL.
    Unconfirmed(String),
}

impl PollOutcome {
    /// The display-ready URL.
    pub fn url(&self) -> &str {
        match self {
            Self::Confirmed(url) | Self::Unconfirmed(url) => url,
        }
    }

    /// Consumes the outcome, returning the URL.
    pub fn into_url(self) -> String {
        match self {
            Self::Confirmed(url) | Self::Unconfirmed(url) => url,
        }
    }

    /// True for [`PollOutcome::Confirmed`].
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// Confidence flag handed to the display surface.
    pub fn confidence(&self) -> Confidence {
        match self {
            Self::Confirmed(_) => Confidence::Confirmed,
            Self::Unconfirmed(_) => Confidence::Unconfirmed,
        }
    }
}
