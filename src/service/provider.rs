//! Generation service trait and utilities.

use crate::error::Result;
use crate::request::GenerationRequest;
use crate::service::types::GenerationResult;
use async_trait::async_trait;

/// A remote service that turns a [`GenerationRequest`] into media.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Submits the request and returns what the service produced.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;

    /// Returns the name of this service for display.
    fn name(&self) -> &str;

    /// Checks that the service is configured well enough to be called.
    async fn health_check(&self) -> Result<()>;
}

/// Extension trait for services with retry logic.
#[async_trait]
pub trait GenerationServiceExt: GenerationService {
    /// Generates with automatic retries on transient failures.
    ///
    /// Only rate limiting and transport errors are retried. A service that
    /// answers with an error status is never called again.
    async fn generate_with_retries(
        &self,
        request: &GenerationRequest,
        max_retries: u32,
    ) -> Result<GenerationResult> {
        let mut attempt = 0;
        loop {
            match self.generate(request).await {
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    let delay = e.retry_after().unwrap_or(std::time::Duration::from_secs(1));
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries,
                        delay_ms = delay.as_millis(),
                        "retrying after transient error: {e}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

impl<T: GenerationService> GenerationServiceExt for T {}
