//! Request building: user fields in, [`GenerationRequest`] out.

mod form;
mod size;
mod style;
mod types;

pub use form::{
    AnimationForm, AvatarForm, DEFAULT_ANIMATION_PROMPT, DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL,
};
pub use size::{Size, SizePreset, DEFAULT_IMAGE_SIZE, DEFAULT_VIDEO_SIZE, IMAGE_SIZES, VIDEO_SIZES};
pub use style::AnimeStyle;
pub use types::{GenerationParams, GenerationRequest, MediaKind, OutputFormat};
