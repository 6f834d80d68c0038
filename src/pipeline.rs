//! Generation followed by readiness confirmation.

use crate::error::{AvatarGenError, Result};
use crate::readiness::{
    strip_query, Clock, Confidence, ExistenceCheck, ReadinessPoller, SystemClock,
};
use crate::request::{GenerationRequest, MediaKind};
use crate::service::{GenerationResult, GenerationService, GenerationServiceExt};
use serde::Serialize;
use std::path::Path;

/// Media ready to hand to a display surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveredMedia {
    /// What was generated.
    pub kind: MediaKind,
    /// URL to display.
    pub url: String,
    /// Whether the URL was confirmed servable.
    pub confidence: Confidence,
    /// Service-side asset id, reusable as a reference image.
    pub asset_id: Option<String>,
    /// Task id when the URL was derived from one.
    pub task_id: Option<String>,
}

impl DeliveredMedia {
    /// True when the display surface should expect the media to still be
    /// arriving.
    pub fn is_pending(&self) -> bool {
        self.confidence == Confidence::Unconfirmed
    }

    /// Fetches the media bytes from the delivered URL.
    pub async fn download(&self, client: &reqwest::Client) -> Result<Vec<u8>> {
        let response = client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AvatarGenError::Api {
                status: status.as_u16(),
                message: format!("failed to download {}", self.kind),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Downloads the media to `path`, returning the number of bytes written.
    pub async fn save(&self, client: &reqwest::Client, path: impl AsRef<Path>) -> Result<usize> {
        let data = self.download(client).await?;
        std::fs::write(path.as_ref(), &data)?;
        tracing::debug!(path = %path.as_ref().display(), bytes = data.len(), "media saved");
        Ok(data.len())
    }
}

/// Runs a generation service and confirms video URLs before delivery.
pub struct MediaPipeline<S, E, C = SystemClock> {
    service: S,
    poller: ReadinessPoller<E, C>,
    max_retries: u32,
}

impl<S, E, C> MediaPipeline<S, E, C>
where
    S: GenerationService,
    E: ExistenceCheck,
    C: Clock,
{
    /// Creates a pipeline. Generation calls are not retried.
    pub fn new(service: S, poller: ReadinessPoller<E, C>) -> Self {
        Self {
            service,
            poller,
            max_retries: 0,
        }
    }

    /// Retries generation calls on rate limiting and transport errors.
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// The poller used for video.
    pub fn poller(&self) -> &ReadinessPoller<E, C> {
        &self.poller
    }

    /// Generates an avatar image. Images are ready as returned.
    pub async fn render_image(&self, request: &GenerationRequest) -> Result<DeliveredMedia> {
        expect_kind(request, MediaKind::Image)?;

        match self.generate(request).await? {
            GenerationResult::Ready { url, asset_id } => Ok(DeliveredMedia {
                kind: MediaKind::Image,
                url,
                confidence: Confidence::Confirmed,
                asset_id,
                task_id: None,
            }),
            GenerationResult::Processing { task_id, .. } => Err(AvatarGenError::NoMedia(format!(
                "image task {task_id} returned without an image"
            ))),
            GenerationResult::Failed { reason } => Err(AvatarGenError::Generation(reason)),
        }
    }

    /// Generates a video and confirms its URL is servable.
    ///
    /// A still-processing task has its URL derived from the task id. Either
    /// way the URL goes through the poller; an unconfirmed URL is delivered
    /// with [`Confidence::Unconfirmed`] rather than as an error.
    pub async fn render_video(&self, request: &GenerationRequest) -> Result<DeliveredMedia> {
        expect_kind(request, MediaKind::Video)?;

        let (raw_url, asset_id, task_id) = match self.generate(request).await? {
            GenerationResult::Ready { url, asset_id } => (url, asset_id, None),
            GenerationResult::Processing { task_id, fallback } => {
                tracing::info!(task_id = %task_id, "video still processing, using derived URL");
                (fallback.derive(&task_id), None, Some(task_id))
            }
            GenerationResult::Failed { reason } => {
                return Err(AvatarGenError::Generation(reason));
            }
        };

        if strip_query(&raw_url).trim().is_empty() {
            return Err(AvatarGenError::Validation(format!(
                "video URL {raw_url:?} has no location to poll"
            )));
        }

        let outcome = self.poller.poll(&raw_url).await;
        Ok(DeliveredMedia {
            kind: MediaKind::Video,
            confidence: outcome.confidence(),
            url: outcome.into_url(),
            asset_id,
            task_id,
        })
    }

    /// Dispatches on the request kind.
    pub async fn render(&self, request: &GenerationRequest) -> Result<DeliveredMedia> {
        match request.kind() {
            MediaKind::Image => self.render_image(request).await,
            MediaKind::Video => self.render_video(request).await,
        }
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        tracing::info!(
            service = self.service.name(),
            kind = %request.kind(),
            size = %request.size(),
            "generating"
        );
        self.service
            .generate_with_retries(request, self.max_retries)
            .await
    }
}

fn expect_kind(request: &GenerationRequest, kind: MediaKind) -> Result<()> {
    if request.kind() != kind {
        return Err(AvatarGenError::Validation(format!(
            "expected a {kind} request, got a {} request",
            request.kind()
        )));
    }
    Ok(())
}
