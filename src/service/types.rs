//! Results returned by a generation service.

use crate::error::{AvatarGenError, Result};
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the task id in a [`FallbackTemplate`].
pub const TASK_ID_PLACEHOLDER: &str = "{task_id}";

/// Default CDN location of a Runware video, keyed by task id.
pub const DEFAULT_FALLBACK_TEMPLATE: &str = "https://vm.runware.ai/video/ws/2/vi/{task_id}.mp4";

/// URL template from which a media URL can be derived once a task id is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FallbackTemplate(String);

impl FallbackTemplate {
    /// Creates a template. It must contain `{task_id}`.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(TASK_ID_PLACEHOLDER) {
            return Err(AvatarGenError::Validation(format!(
                "fallback template {template:?} has no {TASK_ID_PLACEHOLDER} placeholder"
            )));
        }
        Ok(Self(template))
    }

    /// Derives the media URL for a task.
    pub fn derive(&self, task_id: &str) -> String {
        self.0.replace(TASK_ID_PLACEHOLDER, task_id)
    }

    /// The raw template.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FallbackTemplate {
    fn default() -> Self {
        Self(DEFAULT_FALLBACK_TEMPLATE.to_string())
    }
}

impl TryFrom<String> for FallbackTemplate {
    type Error = AvatarGenError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FallbackTemplate> for String {
    fn from(template: FallbackTemplate) -> Self {
        template.0
    }
}

/// Outcome of a single generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerationResult {
    /// The service returned a media URL directly.
    Ready {
        /// Media URL as issued by the service.
        url: String,
        /// Service-side id of the produced asset, reusable as a reference image.
        asset_id: Option<String>,
    },
    /// The service accepted the task but has not produced a URL yet.
    Processing {
        /// Task identifier.
        task_id: String,
        /// Template for deriving the eventual URL.
        fallback: FallbackTemplate,
    },
    /// The service reported the task as failed.
    Failed {
        /// Reason given by the service.
        reason: String,
    },
}

impl GenerationResult {
    /// Best URL available for this result: the issued one, else the one
    /// derived from the task id. `None` for failures.
    pub fn media_url(&self) -> Option<String> {
        match self {
            Self::Ready { url, .. } => Some(url.clone()),
            Self::Processing { task_id, fallback } => Some(fallback.derive(task_id)),
            Self::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_derive() {
        let template = FallbackTemplate::default();
        assert_eq!(
            template.derive("abc123"),
            "https://vm.runware.ai/video/ws/2/vi/abc123.mp4"
        );
    }

    #[test]
    fn test_template_requires_placeholder() {
        let err = FallbackTemplate::new("https://cdn.example/video.mp4").unwrap_err();
        assert!(matches!(err, AvatarGenError::Validation(_)));
        assert!(FallbackTemplate::new("https://cdn.example/video/{task_id}.mp4").is_ok());
    }

    #[test]
    fn test_media_url() {
        let ready = GenerationResult::Ready {
            url: "https://cdn.example/a.mp4".into(),
            asset_id: None,
        };
        assert_eq!(ready.media_url().as_deref(), Some("https://cdn.example/a.mp4"));

        let processing = GenerationResult::Processing {
            task_id: "t-1".into(),
            fallback: FallbackTemplate::new("https://cdn.example/video/{task_id}.mp4").unwrap(),
        };
        assert_eq!(
            processing.media_url().as_deref(),
            Some("https://cdn.example/video/t-1.mp4")
        );

        let failed = GenerationResult::Failed {
            reason: "nope".into(),
        };
        assert!(failed.media_url().is_none());
    }

    #[test]
    fn test_serialization_tags_status() {
        let json = serde_json::to_value(GenerationResult::Failed {
            reason: "nsfw".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "nsfw");
    }
}
