//! Server configuration, read from the environment.

use sd_core::Color;
use std::path::PathBuf;

/// Settings for the raster renderer behind the tool server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Relative background paths resolve against this directory.
    pub asset_root: PathBuf,
    /// Extra font directory loaded on top of system fonts.
    pub font_dir: Option<PathBuf>,
    /// Painted when a slide has no background or it fails to load.
    pub fallback_background: Color,
    /// Family used when a requested family is not installed.
    pub default_font: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            font_dir: None,
            fallback_background: Color::rgba(17.0 / 255.0, 17.0 / 255.0, 17.0 / 255.0, 1.0),
            default_font: "Inter".into(),
        }
    }
}

impl ServerConfig {
    /// `SD_ASSET_ROOT`, `SD_FONT_DIR`, `SD_FALLBACK_BG`, `SD_DEFAULT_FONT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let set = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        if let Some(root) = set("SD_ASSET_ROOT") {
            config.asset_root = PathBuf::from(root);
        }
        config.font_dir = set("SD_FONT_DIR").map(PathBuf::from);
        if let Some(hex) = set("SD_FALLBACK_BG") {
            match Color::from_hex(&hex) {
                Some(color) => config.fallback_background = color,
                None => log::warn!("SD_FALLBACK_BG `{hex}` is not a hex color; keeping default"),
            }
        }
        if let Some(family) = set("SD_DEFAULT_FONT") {
            config.default_font = family;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(ServerConfig::from_lookup(lookup(&[])), ServerConfig::default());
    }

    #[test]
    fn reads_every_key() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("SD_ASSET_ROOT", "/srv/decks"),
            ("SD_FONT_DIR", "/srv/fonts"),
            ("SD_FALLBACK_BG", "#000"),
            ("SD_DEFAULT_FONT", "Roboto"),
        ]));
        assert_eq!(config.asset_root, PathBuf::from("/srv/decks"));
        assert_eq!(config.font_dir, Some(PathBuf::from("/srv/fonts")));
        assert_eq!(config.fallback_background, Color::BLACK);
        assert_eq!(config.default_font, "Roboto");
    }

    #[test]
    fn bad_color_keeps_default() {
        let config = ServerConfig::from_lookup(lookup(&[("SD_FALLBACK_BG", "navy")]));
        assert_eq!(config.fallback_background, ServerConfig::default().fallback_background);
    }
}
