//! Media readiness: existence polling and playback self-heal.

mod cache_bust;
mod clock;
mod heal;
mod outcome;
mod policy;
mod poller;
mod probe;

pub use cache_bust::{cache_bust, strip_query, token_of, CACHE_BUST_PARAM};
pub use clock::{Clock, SystemClock};
pub use heal::PlaybackSource;
pub use outcome::{Confidence, PollOutcome};
pub use policy::{RetryPolicy, ATTEMPTS_ENV, DELAY_ENV};
pub use poller::ReadinessPoller;
pub use probe::{ExistenceCheck, HttpExistenceCheck};

#[cfg(test)]
pub(crate) use poller::testing;
