#![warn(missing_docs)]
//! AvatarGen - anime avatar images and animations.
//!
//! This crate builds avatar generation requests from user-supplied fields,
//! submits them to a remote generation service, and makes sure a freshly
//! issued video URL is actually servable before it is displayed.
//!
//! # Quick Start - Images
//!
//! ```no_run
//! use avatargen::{AnimeStyle, AvatarForm, GenerationService, RunwareProvider};
//!
//! #[tokio::main]
//! async fn main() -> avatargen::Result<()> {
//!     let provider = RunwareProvider::builder().build()?;
//!     let request = AvatarForm::new("a girl with long black hair and a pink kimono")
//!         .with_name("Nezuko")
//!         .with_style(AnimeStyle::Ghibli)
//!         .build()?;
//!     let result = provider.generate(&request).await?;
//!     println!("{:?}", result.media_url());
//!     Ok(())
//! }
//! ```
//!
//! # Quick Start - Videos
//!
//! ```no_run
//! use avatargen::{
//!     AnimationForm, HttpExistenceCheck, MediaPipeline, ReadinessPoller, RetryPolicy,
//!     RunwareProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() -> avatargen::Result<()> {
//!     let poller = ReadinessPoller::new(HttpExistenceCheck::new()?, RetryPolicy::default());
//!     let pipeline = MediaPipeline::new(RunwareProvider::builder().build()?, poller);
//!
//!     let request = AnimationForm::new()
//!         .with_reference_image("6f1c2b1e-image-uuid")
//!         .build()?;
//!     let video = pipeline.render_video(&request).await?;
//!     println!("{} ({:?})", video.url, video.confidence);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`request`]: size tokens, styles and the avatar/animation forms
//! - [`service`]: the generation service trait and the Runware provider
//! - [`readiness`]: readiness polling and playback self-heal
//! - [`pipeline`]: generation followed by readiness confirmation
//!
//! # Features
//!
//! - `cli` (default): the `avatargen` command-line tool

mod error;

pub mod pipeline;
pub mod readiness;
pub mod request;
pub mod service;

// Re-export error types at crate root
pub use error::{AvatarGenError, Result};

pub use pipeline::{DeliveredMedia, MediaPipeline};
pub use readiness::{
    Clock, Confidence, ExistenceCheck, HttpExistenceCheck, PlaybackSource, PollOutcome,
    ReadinessPoller, RetryPolicy, SystemClock,
};
pub use request::{
    AnimationForm, AnimeStyle, AvatarForm, GenerationParams, GenerationRequest, MediaKind,
    OutputFormat, Size,
};
pub use service::{
    FallbackTemplate, GenerationResult, GenerationService, GenerationServiceExt, RunwareProvider,
    RunwareProviderBuilder,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{AvatarGenError, Result};
    pub use crate::pipeline::{DeliveredMedia, MediaPipeline};
    pub use crate::readiness::{
        HttpExistenceCheck, PlaybackSource, PollOutcome, ReadinessPoller, RetryPolicy,
    };
    pub use crate::request::{AnimationForm, AnimeStyle, AvatarForm, GenerationRequest};
    pub use crate::service::{GenerationResult, GenerationService, RunwareProvider};
}
