//! Core request types.

use crate::request::size::Size;
use serde::{Deserialize, Serialize};

/// Kind of media a request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A still avatar image.
    Image,
    /// A short animation of an avatar.
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Output container/format requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    /// JPEG image.
    Jpg,
    /// PNG image.
    Png,
    /// WebP image.
    Webp,
    /// MP4 video.
    Mp4,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Mp4 => "mp4",
        }
    }
}

/// Provider-specific generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Model identifier, e.g. `civitai:129218@141668`.
    pub model: String,
    /// Clip length in seconds (video only).
    pub duration_secs: Option<u32>,
    /// Output format.
    pub output_format: OutputFormat,
    /// Output quality, 1-100.
    pub output_quality: Option<u8>,
    /// Reference image: an asset id, URL or data URI.
    pub reference_image: Option<String>,
    /// Diffusion steps (image only).
    pub steps: Option<u32>,
    /// Classifier-free guidance scale (image only).
    pub cfg_scale: Option<f32>,
    /// Keep the camera still while animating.
    pub camera_fixed: Option<bool>,
}

/// An immutable generation request, built once per submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    kind: MediaKind,
    prompt: String,
    size: Size,
    params: GenerationParams,
}

impl GenerationRequest {
    /// Creates a request. Use [`crate::request::AvatarForm`] or
    /// [`crate::request::AnimationForm`] to build one from user fields.
    pub fn new(
        kind: MediaKind,
        prompt: impl Into<String>,
        size: Size,
        params: GenerationParams,
    ) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            size,
            params,
        }
    }

    /// What this request produces.
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// The full prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Target dimensions.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Target width in pixels.
    pub fn width(&self) -> u32 {
        self.size.width()
    }

    /// Target height in pixels.
    pub fn height(&self) -> u32 {
        self.size.height()
    }

    /// Provider-specific parameters.
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}
