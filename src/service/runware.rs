//! Runware generation service.
//!
//! Runware takes a JSON array of tasks and, with `deliveryMethod: "sync"`,
//! answers with the produced media in the same response. Video tasks may
//! come back without a URL while the clip is still being stored; in that
//! case the URL is derived from the task id.

use crate::error::{parse_retry_after, sanitize_error_message, AvatarGenError, Result};
use crate::request::{GenerationRequest, MediaKind};
use crate::service::provider::GenerationService;
use crate::service::types::{FallbackTemplate, GenerationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Default Runware REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.runware.ai/v1";

/// Builder for `RunwareProvider`.
#[derive(Debug, Clone)]
pub struct RunwareProviderBuilder {
    api_key: Option<String>,
    endpoint: Option<String>,
    fallback: FallbackTemplate,
    timeout: Duration,
}

impl Default for RunwareProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            fallback: FallbackTemplate::default(),
            timeout: Duration::from_secs(300), // sync video inference is slow
        }
    }
}

impl RunwareProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `RUNWARE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the endpoint. Falls back to `RUNWARE_API_URL`, then the public API.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the template used to derive a video URL from a task id.
    pub fn fallback_template(mut self, template: FallbackTemplate) -> Self {
        self.fallback = template;
        self
    }

    /// Sets the maximum time to wait for one generation call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<RunwareProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("RUNWARE_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AvatarGenError::Auth("RUNWARE_API_KEY not set and no API key provided".into())
            })?;

        let endpoint = self
            .endpoint
            .or_else(|| std::env::var("RUNWARE_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(RunwareProvider {
            client,
            api_key,
            endpoint,
            fallback: self.fallback,
            timeout: self.timeout,
        })
    }
}

/// Runware image and video generation provider.
#[derive(Debug)]
pub struct RunwareProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    fallback: FallbackTemplate,
    timeout: Duration,
}

impl RunwareProvider {
    /// Creates a new `RunwareProviderBuilder`.
    pub fn builder() -> RunwareProviderBuilder {
        RunwareProviderBuilder::new()
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn submit(&self, task: &RunwareTask) -> Result<RunwareResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&[task])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GenerationService for RunwareProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let task = RunwareTask::from_request(request, Uuid::new_v4());
        tracing::debug!(
            task_uuid = %task.task_uuid,
            task_type = task.task_type,
            model = %task.model,
            timeout_secs = self.timeout.as_secs(),
            "submitting Runware task"
        );

        let response = self.submit(&task).await?;
        let result = response.into_result(request.kind(), &task.task_uuid, &self.fallback)?;

        match &result {
            GenerationResult::Ready { url, .. } => {
                tracing::debug!(task_uuid = %task.task_uuid, url = %url, "Runware task ready");
            }
            GenerationResult::Processing { task_id, .. } => {
                tracing::debug!(task_uuid = %task_id, "Runware task still processing");
            }
            GenerationResult::Failed { reason } => {
                tracing::warn!(task_uuid = %task.task_uuid, reason = %reason, "Runware task failed");
            }
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Runware"
    }

    async fn health_check(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            Err(AvatarGenError::Auth("empty API key".into()))
        } else {
            Ok(())
        }
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> AvatarGenError {
    // Runware wraps failures as {"errors": [{"message": ...}]}
    let message = serde_json::from_str::<RunwareResponse>(text)
        .ok()
        .and_then(|r| r.errors.into_iter().next())
        .map(|e| e.message)
        .unwrap_or_else(|| text.to_string());
    let message = sanitize_error_message(&message);

    if status == 429 {
        let retry_after = parse_retry_after(headers).map(Duration::from_secs);
        return AvatarGenError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return AvatarGenError::Auth(message);
    }
    if status == 400 || status == 422 {
        let lower = message.to_lowercase();
        if lower.contains("nsfw") || lower.contains("safety") || lower.contains("moderat") {
            return AvatarGenError::ContentBlocked(message);
        }
    }
    AvatarGenError::Api { status, message }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunwareTask {
    task_type: &'static str,
    #[serde(rename = "taskUUID")]
    task_uuid: String,
    model: String,
    positive_prompt: String,
    width: u32,
    height: u32,
    output_type: &'static str,
    output_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_quality: Option<u8>,
    delivery_method: &'static str,
    number_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<u32>,
    #[serde(rename = "CFGScale", skip_serializing_if = "Option::is_none")]
    cfg_scale: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    frame_images: Vec<FrameImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_settings: Option<ProviderSettings>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameImage {
    input_image: String,
    frame: &'static str,
}

#[derive(Debug, Serialize)]
struct ProviderSettings {
    bytedance: BytedanceSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BytedanceSettings {
    camera_fixed: bool,
}

impl RunwareTask {
    fn from_request(req: &GenerationRequest, task_uuid: Uuid) -> Self {
        let params = req.params();
        let task_type = match req.kind() {
            MediaKind::Image => "imageInference",
            MediaKind::Video => "videoInference",
        };

        let frame_images = match req.kind() {
            MediaKind::Video => params
                .reference_image
                .iter()
                .map(|image| FrameImage {
                    input_image: image.clone(),
                    frame: "first",
                })
                .collect(),
            MediaKind::Image => Vec::new(),
        };

        let provider_settings = params
            .camera_fixed
            .filter(|_| params.model.starts_with("bytedance:"))
            .map(|camera_fixed| ProviderSettings {
                bytedance: BytedanceSettings { camera_fixed },
            });

        Self {
            task_type,
            task_uuid: task_uuid.to_string(),
            model: params.model.clone(),
            positive_prompt: req.prompt().to_string(),
            width: req.width(),
            height: req.height(),
            output_type: "URL",
            output_format: params.output_format.extension().to_uppercase(),
            output_quality: params.output_quality,
            delivery_method: "sync",
            number_results: 1,
            duration: params.duration_secs,
            steps: params.steps,
            cfg_scale: params.cfg_scale,
            frame_images,
            provider_settings,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RunwareResponse {
    #[serde(default)]
    data: Vec<RunwareTaskResult>,
    #[serde(default)]
    errors: Vec<RunwareError>,
}

#[derive(Debug, Deserialize)]
struct RunwareTaskResult {
    #[serde(rename = "taskUUID")]
    task_uuid: Option<String>,
    #[serde(rename = "imageURL")]
    image_url: Option<String>,
    #[serde(rename = "imageUUID")]
    image_uuid: Option<String>,
    #[serde(rename = "videoURL")]
    video_url: Option<String>,
    #[serde(rename = "videoUUID")]
    video_uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunwareError {
    message: String,
}

impl RunwareResponse {
    fn into_result(
        self,
        kind: MediaKind,
        task_uuid: &str,
        fallback: &FallbackTemplate,
    ) -> Result<GenerationResult> {
        if let Some(error) = self.errors.into_iter().next() {
            return Ok(GenerationResult::Failed {
                reason: sanitize_error_message(&error.message),
            });
        }

        let first = self.data.into_iter().next();
        match kind {
            MediaKind::Image => {
                let item = first.ok_or_else(|| {
                    AvatarGenError::NoMedia("no image returned from API".into())
                })?;
                let url = item.image_url.filter(|u| !u.is_empty()).ok_or_else(|| {
                    AvatarGenError::NoMedia("image task finished without an imageURL".into())
                })?;
                Ok(GenerationResult::Ready {
                    url,
                    asset_id: item.image_uuid,
                })
            }
            MediaKind::Video => match first {
                Some(RunwareTaskResult {
                    video_url: Some(url),
                    video_uuid,
                    ..
                }) if !url.is_empty() => Ok(GenerationResult::Ready {
                    url,
                    asset_id: video_uuid,
                }),
                item => Ok(GenerationResult::Processing {
                    task_id: item
                        .and_then(|i| i.task_uuid)
                        .filter(|id| !id.is_empty())
                        .unwrap_or_else(|| task_uuid.to_string()),
                    fallback: fallback.clone(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{AnimationForm, AvatarForm};
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    fn task_id() -> Uuid {
        Uuid::parse_str("6f1c2b1e-0000-4000-8000-000000000001").unwrap()
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let provider = RunwareProviderBuilder::new()
            .api_key("rw-test")
            .endpoint("http://localhost:9/v1")
            .build()
            .unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9/v1");
    }

    #[test]
    fn test_builder_rejects_blank_key() {
        let result = RunwareProviderBuilder::new().api_key("  ").build();
        assert!(matches!(result, Err(AvatarGenError::Auth(_))));
    }

    #[test]
    fn test_builder_custom_timeout() {
        let provider = RunwareProviderBuilder::new()
            .api_key("rw-test")
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();
        assert_eq!(provider.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_image_task_serialization() {
        let req = AvatarForm::new("a knight").with_size("512x768").build().unwrap();
        let json = serde_json::to_value(RunwareTask::from_request(&req, task_id())).unwrap();

        assert_eq!(json["taskType"], "imageInference");
        assert_eq!(json["taskUUID"], "6f1c2b1e-0000-4000-8000-000000000001");
        assert_eq!(json["model"], "civitai:129218@141668");
        assert_eq!(json["width"], 512);
        assert_eq!(json["height"], 768);
        assert_eq!(json["outputType"], "URL");
        assert_eq!(json["outputFormat"], "JPG");
        assert_eq!(json["deliveryMethod"], "sync");
        assert_eq!(json["steps"], 30);
        assert_eq!(json["CFGScale"], 7.5);
        assert_eq!(json["numberResults"], 1);
        assert!(json["positivePrompt"]
            .as_str()
            .unwrap()
            .starts_with("a knight, Ghibli-style"));
        assert!(json.get("frameImages").is_none());
        assert!(json.get("duration").is_none());
        assert!(json.get("providerSettings").is_none());
    }

    #[test]
    fn test_video_task_serialization() {
        let req = AnimationForm::new()
            .with_reference_image("img-uuid-7")
            .with_size("640x640")
            .build()
            .unwrap();
        let json = serde_json::to_value(RunwareTask::from_request(&req, task_id())).unwrap();

        assert_eq!(json["taskType"], "videoInference");
        assert_eq!(json["model"], "bytedance:2@1");
        assert_eq!(json["duration"], 5);
        assert_eq!(json["outputFormat"], "MP4");
        assert_eq!(json["outputQuality"], 95);
        assert_eq!(json["frameImages"][0]["inputImage"], "img-uuid-7");
        assert_eq!(json["frameImages"][0]["frame"], "first");
        assert_eq!(json["providerSettings"]["bytedance"]["cameraFixed"], true);
        assert!(json.get("CFGScale").is_none());
    }

    #[test]
    fn test_provider_settings_only_for_bytedance() {
        let req = AnimationForm::new()
            .with_reference_image("img")
            .with_model("klingai:5@3")
            .build()
            .unwrap();
        let task = RunwareTask::from_request(&req, task_id());
        assert!(task.provider_settings.is_none());
    }

    #[test]
    fn test_image_response_ready() {
        let json = r#"{"data":[{"taskType":"imageInference","taskUUID":"t-1",
            "imageUUID":"img-1","imageURL":"https://im.runware.ai/image/img-1.jpg"}]}"#;
        let resp: RunwareResponse = serde_json::from_str(json).unwrap();
        let result = resp
            .into_result(MediaKind::Image, "t-1", &FallbackTemplate::default())
            .unwrap();
        assert_eq!(
            result,
            GenerationResult::Ready {
                url: "https://im.runware.ai/image/img-1.jpg".into(),
                asset_id: Some("img-1".into()),
            }
        );
    }

    #[test]
    fn test_image_response_without_url() {
        let resp: RunwareResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        let err = resp
            .into_result(MediaKind::Image, "t-1", &FallbackTemplate::default())
            .unwrap_err();
        assert!(matches!(err, AvatarGenError::NoMedia(_)));
    }

    #[test]
    fn test_video_response_ready() {
        let json = r#"{"data":[{"taskUUID":"t-2","videoURL":"https://vm.runware.ai/video/x.mp4"}]}"#;
        let resp: RunwareResponse = serde_json::from_str(json).unwrap();
        let result = resp
            .into_result(MediaKind::Video, "t-2", &FallbackTemplate::default())
            .unwrap();
        assert_eq!(
            result.media_url().as_deref(),
            Some("https://vm.runware.ai/video/x.mp4")
        );
    }

    #[test]
    fn test_video_response_processing_uses_task_id() {
        let json = r#"{"data":[{"taskUUID":"t-3","status":"processing"}]}"#;
        let resp: RunwareResponse = serde_json::from_str(json).unwrap();
        let result = resp
            .into_result(MediaKind::Video, "ignored", &FallbackTemplate::default())
            .unwrap();
        match result {
            GenerationResult::Processing { task_id, fallback } => {
                assert_eq!(task_id, "t-3");
                assert_eq!(
                    fallback.derive(&task_id),
                    "https://vm.runware.ai/video/ws/2/vi/t-3.mp4"
                );
            }
            other => panic!("expected processing, got {other:?}"),
        }
    }

    #[test]
    fn test_video_response_empty_falls_back_to_submitted_id() {
        let resp: RunwareResponse = serde_json::from_str("{}").unwrap();
        let result = resp
            .into_result(MediaKind::Video, "mine", &FallbackTemplate::default())
            .unwrap();
        assert!(
            matches!(result, GenerationResult::Processing { ref task_id, .. } if task_id == "mine")
        );
    }

    #[test]
    fn test_video_response_blank_echoed_id_falls_back_to_submitted_id() {
        let json = r#"{"data":[{"taskUUID":"","status":"processing"}]}"#;
        let resp: RunwareResponse = serde_json::from_str(json).unwrap();
        let result = resp
            .into_result(MediaKind::Video, "mine", &FallbackTemplate::default())
            .unwrap();
        match result {
            GenerationResult::Processing { task_id, fallback } => {
                assert_eq!(task_id, "mine");
                assert_eq!(
                    fallback.derive(&task_id),
                    "https://vm.runware.ai/video/ws/2/vi/mine.mp4"
                );
            }
            other => panic!("expected processing, got {other:?}"),
        }
    }

    #[test]
    fn test_errors_become_failed() {
        let json = r#"{"errors":[{"code":"invalidModel","message":"Model not found"}]}"#;
        let resp: RunwareResponse = serde_json::from_str(json).unwrap();
        let result = resp
            .into_result(MediaKind::Video, "t", &FallbackTemplate::default())
            .unwrap();
        assert_eq!(
            result,
            GenerationResult::Failed {
                reason: "Model not found".into()
            }
        );
    }

    #[test]
    fn test_parse_error_statuses() {
        let headers = HeaderMap::new();
        assert!(matches!(
            parse_error(401, "unauthorized", &headers),
            AvatarGenError::Auth(_)
        ));

        let mut limited = HeaderMap::new();
        limited.insert(RETRY_AFTER, HeaderValue::from_static("12"));
        assert!(matches!(
            parse_error(429, "", &limited),
            AvatarGenError::RateLimited {
                retry_after: Some(d)
            } if d == Duration::from_secs(12)
        ));

        let body = r#"{"errors":[{"message":"NSFW content detected"}]}"#;
        assert!(matches!(
            parse_error(400, body, &headers),
            AvatarGenError::ContentBlocked(ref m) if m == "NSFW content detected"
        ));

        assert!(matches!(
            parse_error(502, "upstream down", &headers),
            AvatarGenError::Api { status: 502, ref message } if message == "upstream down"
        ));
    }
}
