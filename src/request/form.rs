//! Builders that turn user-supplied fields into [`GenerationRequest`]s.
//!
//! Everything here is pure and fails with
//! [`AvatarGenError::Validation`] before any network activity.

use crate::error::{AvatarGenError, Result};
use crate::request::size::{Size, DEFAULT_IMAGE_SIZE, DEFAULT_VIDEO_SIZE};
use crate::request::style::AnimeStyle;
use crate::request::types::{GenerationParams, GenerationRequest, MediaKind, OutputFormat};

/// Model used for avatar images (MasterAnime v1).
pub const DEFAULT_IMAGE_MODEL: &str = "civitai:129218@141668";

/// Model used for image-to-video animation (Seedance).
pub const DEFAULT_VIDEO_MODEL: &str = "bytedance:2@1";

/// Animation prompt used when the user keeps the suggestion.
pub const DEFAULT_ANIMATION_PROMPT: &str = "wind blowing through hair, character blinking slowly";

const PROMPT_SUFFIX: &str = "ultra-detailed, anime avatar, high quality";

/// Fields collected for a still avatar.
#[derive(Debug, Clone)]
pub struct AvatarForm {
    character_name: Option<String>,
    description: String,
    style: AnimeStyle,
    size: String,
}

impl AvatarForm {
    /// Creates a form with the given character description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            character_name: None,
            description: description.into(),
            style: AnimeStyle::default(),
            size: DEFAULT_IMAGE_SIZE.to_string(),
        }
    }

    /// Sets the optional character name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.character_name = Some(name.into());
        self
    }

    /// Sets the style.
    pub fn with_style(mut self, style: AnimeStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the `WIDTHxHEIGHT` size token.
    pub fn with_size(mut self, token: impl Into<String>) -> Self {
        self.size = token.into();
        self
    }

    /// Composes the prompt string.
    pub fn prompt(&self) -> Result<String> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(AvatarGenError::Validation(
                "avatar description is required".into(),
            ));
        }

        let name = self
            .character_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let mut prompt = String::new();
        if let Some(name) = name {
            prompt.push_str(name);
            prompt.push_str(", ");
        }
        prompt.push_str(description);
        prompt.push_str(", ");
        prompt.push_str(self.style.descriptor());
        prompt.push_str(", ");
        prompt.push_str(PROMPT_SUFFIX);
        Ok(prompt)
    }

    /// Builds the image request.
    pub fn build(&self) -> Result<GenerationRequest> {
        let prompt = self.prompt()?;
        let size: Size = self.size.parse()?;

        Ok(GenerationRequest::new(
            MediaKind::Image,
            prompt,
            size,
            GenerationParams {
                model: DEFAULT_IMAGE_MODEL.to_string(),
                duration_secs: None,
                output_format: OutputFormat::Jpg,
                output_quality: None,
                reference_image: None,
                steps: Some(30),
                cfg_scale: Some(7.5),
                camera_fixed: None,
            },
        ))
    }
}

/// Fields collected for animating an existing avatar.
#[derive(Debug, Clone)]
pub struct AnimationForm {
    prompt: String,
    reference_image: Option<String>,
    size: String,
    duration_secs: u32,
    model: String,
}

impl Default for AnimationForm {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_ANIMATION_PROMPT.to_string(),
            reference_image: None,
            size: DEFAULT_VIDEO_SIZE.to_string(),
            duration_secs: 5,
            model: DEFAULT_VIDEO_MODEL.to_string(),
        }
    }
}

impl AnimationForm {
    /// Creates a form with the default animation prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the animation prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Sets the first-frame reference image (asset id, URL or data URI).
    pub fn with_reference_image(mut self, image: impl Into<String>) -> Self {
        self.reference_image = Some(image.into());
        self
    }

    /// Sets the `WIDTHxHEIGHT` size token.
    pub fn with_size(mut self, token: impl Into<String>) -> Self {
        self.size = token.into();
        self
    }

    /// Sets the clip length in seconds.
    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Overrides the video model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builds the video request.
    pub fn build(&self) -> Result<GenerationRequest> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(AvatarGenError::Validation(
                "animation prompt is required".into(),
            ));
        }

        let reference = self
            .reference_image
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                AvatarGenError::Validation("a reference image is required to animate".into())
            })?;

        if self.duration_secs == 0 {
            return Err(AvatarGenError::Validation(
                "duration must be at least one second".into(),
            ));
        }

        let size: Size = self.size.parse()?;

        Ok(GenerationRequest::new(
            MediaKind::Video,
            prompt,
            size,
            GenerationParams {
                model: self.model.clone(),
                duration_secs: Some(self.duration_secs),
                output_format: OutputFormat::Mp4,
                output_quality: Some(95),
                reference_image: Some(reference.to_string()),
                steps: None,
                cfg_scale: None,
                camera_fixed: Some(true),
            },
        ))
    }
}
