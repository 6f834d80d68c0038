//! Anime style presets.

use serde::{Deserialize, Serialize};

/// Visual style appended to the avatar prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimeStyle {
    /// Soft pastel Studio Ghibli look.
    #[default]
    Ghibli,
    /// Shonen action anime.
    Shonen,
    /// Moe / kawaii.
    Moe,
    /// Neon cyberpunk.
    Cyberpunk,
    /// Medieval fantasy RPG.
    Fantasy,
    /// 90s cel anime with VHS grain.
    Retro90s,
}

impl AnimeStyle {
    /// All styles, in menu order.
    pub const ALL: [AnimeStyle; 6] = [
        Self::Ghibli,
        Self::Shonen,
        Self::Moe,
        Self::Cyberpunk,
        Self::Fantasy,
        Self::Retro90s,
    ];

    /// Label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ghibli => "Studio Ghibli",
            Self::Shonen => "Shonen / Action",
            Self::Moe => "Moe / Kawaii",
            Self::Cyberpunk => "Cyberpunk",
            Self::Fantasy => "Fantasy RPG",
            Self::Retro90s => "Retro 90s Anime",
        }
    }

    /// Descriptor inserted into the prompt.
    pub fn descriptor(&self) -> &'static str {
        match self {
            Self::Ghibli => "Ghibli-style, soft pastel tones, cinematic lighting",
            Self::Shonen => "shonen anime style, sharp lines, dramatic lighting",
            Self::Moe => "moe style, big eyes, soft colors, cutesy vibe",
            Self::Cyberpunk => "cyberpunk anime style, neon colors, futuristic design",
            Self::Fantasy => "fantasy anime style, medieval aesthetic, elven features",
            Self::Retro90s => "90s anime style, VHS grain, bold outlines",
        }
    }
}

impl std::fmt::Display for AnimeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ghibli() {
        assert_eq!(AnimeStyle::default(), AnimeStyle::Ghibli);
        assert_eq!(AnimeStyle::ALL[0], AnimeStyle::default());
    }

    #[test]
    fn test_descriptors_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for style in AnimeStyle::ALL {
            assert!(seen.insert(style.descriptor()));
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_value(AnimeStyle::Retro90s).unwrap(),
            "retro90s"
        );
        let style: AnimeStyle = serde_json::from_str("\"cyberpunk\"").unwrap();
        assert_eq!(style, AnimeStyle::Cyberpunk);
    }
}
