//! Output dimensions and the `WIDTHxHEIGHT` size token.

use crate::error::{AvatarGenError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Output dimensions in pixels. Both sides are always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Size {
    width: u32,
    height: u32,
}

impl Size {
    /// Creates a size, rejecting zero on either side.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AvatarGenError::Validation(format!(
                "size must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl FromStr for Size {
    type Err = AvatarGenError;

    fn from_str(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AvatarGenError::Validation("size token is missing".into()));
        }

        let (w, h) = token
            .split_once(['x', 'X'])
            .ok_or_else(|| {
                AvatarGenError::Validation(format!(
                    "size token {token:?} must look like WIDTHxHEIGHT"
                ))
            })?;

        let parse = |side: &str, name: &str| -> Result<u32> {
            side.trim().parse::<u32>().map_err(|_| {
                AvatarGenError::Validation(format!("size token {token:?} has a non-numeric {name}"))
            })
        };

        Self::new(parse(w, "width")?, parse(h, "height")?)
    }
}

impl TryFrom<String> for Size {
    type Error = AvatarGenError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Size> for String {
    fn from(size: Size) -> Self {
        size.to_string()
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A labelled size offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePreset {
    /// Human-readable label.
    pub label: &'static str,
    /// The `WIDTHxHEIGHT` token sent to the service.
    pub token: &'static str,
}

/// Sizes offered for avatar images.
pub const IMAGE_SIZES: &[SizePreset] = &[
    SizePreset {
        label: "512x512",
        token: "512x512",
    },
    SizePreset {
        label: "512x768",
        token: "512x768",
    },
    SizePreset {
        label: "768x512",
        token: "768x512",
    },
];

/// Sizes offered for animations.
pub const VIDEO_SIZES: &[SizePreset] = &[
    SizePreset {
        label: "1:1 Square - 480p",
        token: "640x640",
    },
    SizePreset {
        label: "1:1 Square - 1080p",
        token: "1440x1440",
    },
    SizePreset {
        label: "16:9 Landscape - 480p",
        token: "864x480",
    },
    SizePreset {
        label: "16:9 Landscape - 1080p",
        token: "1920x1088",
    },
    SizePreset {
        label: "21:9 Ultra-Wide/Landscape - 480p",
        token: "960x416",
    },
    SizePreset {
        label: "21:9 Ultra-Wide/Landscape - 1080p",
        token: "2176x928",
    },
    SizePreset {
        label: "9:16 Tall/Portrait - 480p",
        token: "480x864",
    },
    SizePreset {
        label: "9:16 Tall/Portrait - 1080p",
        token: "1088x1920",
    },
];

/// Default avatar image size token.
pub const DEFAULT_IMAGE_SIZE: &str = "512x512";

/// Default animation size token.
pub const DEFAULT_VIDEO_SIZE: &str = "1440x1440";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_square() {
        let size: Size = "512x512".parse().unwrap();
        assert_eq!(size.width(), 512);
        assert_eq!(size.height(), 512);
    }

    #[test]
    fn test_parse_rectangular_and_uppercase() {
        let size: Size = " 1088X1920 ".parse().unwrap();
        assert_eq!((size.width(), size.height()), (1088, 1920));
    }

    #[test]
    fn test_missing_height_is_validation_error() {
        let err = "512".parse::<Size>().unwrap_err();
        assert!(matches!(err, AvatarGenError::Validation(_)));
    }

    #[test]
    fn test_rejects_bad_tokens() {
        for token in ["", "x512", "512x", "abcx512", "512x-1", "0x512", "512x0", "1.5x2"] {
            let result = token.parse::<Size>();
            assert!(
                matches!(result, Err(AvatarGenError::Validation(_))),
                "expected {token:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Size::new(768, 512).unwrap().to_string(), "768x512");
    }

    #[test]
    fn test_serde_uses_token_form() {
        let size = Size::new(640, 640).unwrap();
        assert_eq!(serde_json::to_value(size).unwrap(), "640x640");

        let parsed: Size = serde_json::from_str("\"960x416\"").unwrap();
        assert_eq!(parsed, Size::new(960, 416).unwrap());
        assert!(serde_json::from_str::<Size>("\"960\"").is_err());
    }

    #[test]
    fn test_presets_parse() {
        for preset in IMAGE_SIZES.iter().chain(VIDEO_SIZES) {
            assert!(preset.token.parse::<Size>().is_ok(), "{}", preset.label);
        }
        assert!(DEFAULT_IMAGE_SIZE.parse::<Size>().is_ok());
        assert!(DEFAULT_VIDEO_SIZE.parse::<Size>().is_ok());
    }
}
