use crate::render::{ColorMode, RenderMode};
use crate::scroll::ScrollStyle;
use serde::Deserialize;
use std::path::PathBuf;

/// User configuration loaded from config file.
/// All fields are optional — CLI flags override config, config overrides defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scene rotation for the player (use --list to see names)
    pub scenes: Option<Vec<String>>,
    /// Seconds each scene stays up before the cross-fade
    pub duration: Option<f64>,
    /// Default render mode
    pub render: Option<RenderModeConfig>,
    /// Default color mode
    pub color: Option<ColorModeConfig>,
    /// Target FPS (1-120)
    pub fps: Option<u32>,
    /// Scroll text file path
    pub text: Option<PathBuf>,
    /// Scroll render style
    pub scroll_style: Option<ScrollStyle>,
    /// Scroll speed in canvas px/s
    pub scroll_speed: Option<f64>,
    /// Roller effect preset (0-3)
    pub roller_preset: Option<u8>,
    /// Hide status bar
    pub clean: Option<bool>,
    /// Latitude for the weather kiosk
    pub latitude: Option<f64>,
    /// Longitude for the weather kiosk
    pub longitude: Option<f64>,
    /// Weather refresh period in seconds
    pub refresh: Option<u64>,
}

/// Render mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderModeConfig {
    Braille,
    HalfBlock,
    Ascii,
}

impl From<RenderModeConfig> for RenderMode {
    fn from(c: RenderModeConfig) -> Self {
        match c {
            RenderModeConfig::Braille => RenderMode::Braille,
            RenderModeConfig::HalfBlock => RenderMode::HalfBlock,
            RenderModeConfig::Ascii => RenderMode::Ascii,
        }
    }
}

/// Color mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorModeConfig {
    Mono,
    Ansi16,
    Ansi256,
    TrueColor,
}

impl From<ColorModeConfig> for ColorMode {
    fn from(c: ColorModeConfig) -> Self {
        match c {
            ColorModeConfig::Mono => ColorMode::Mono,
            ColorModeConfig::Ansi16 => ColorMode::Ansi16,
            ColorModeConfig::Ansi256 => ColorMode::Ansi256,
            ColorModeConfig::TrueColor => ColorMode::TrueColor,
        }
    }
}

/// Get the config file path: ~/.config/demoreel/config.toml
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("demoreel").join("config.toml"))
}

/// Load config from file. Returns default config if file doesn't exist.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let Ok(contents) = std::fs::read_to_string(&path) else {
        return Config::default();
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: failed to parse {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Generate a default config file with all options commented out
pub fn default_config_string() -> String {
    r#"# demoreel configuration
# Shared by the demoreel player and the skywatch kiosk.
# CLI flags override these settings.

# Scene rotation (use --list to see all)
# scenes = ["plasma", "cube", "tunnel"]

# Seconds per scene before the cross-fade
# duration = 10.0

# Default render mode: braille, half-block, ascii
# render = "half-block"

# Default color mode: mono, ansi16, ansi256, true-color
# color = "true-color"

# Target FPS (1-120)
# fps = 30

# Scroll text file
# text = "/path/to/scrolltext.txt"

# Scroll style: wave, classic, roller, bounce
# scroll_style = "wave"

# Scroll speed in canvas px/s
# scroll_speed = 40.0

# Roller effect preset: 0 plain, 1 outline, 2 +shadow, 3 +glow
# roller_preset = 1

# Hide status bar
# clean = false

# Weather kiosk location
# latitude = 59.3293
# longitude = 18.0686

# Weather refresh period, seconds
# refresh = 300
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            scenes = ["plasma", "cube"]
            duration = 8.5
            render = "braille"
            color = "ansi256"
            fps = 60
            scroll_style = "roller"
            scroll_speed = 55.0
            roller_preset = 2
            clean = true
            latitude = 59.3293
            longitude = 18.0686
            refresh = 600
            "#,
        )
        .unwrap();
        assert_eq!(config.scenes.as_deref(), Some(&["plasma".to_string(), "cube".to_string()][..]));
        assert_eq!(config.duration, Some(8.5));
        assert!(matches!(config.render, Some(RenderModeConfig::Braille)));
        assert!(matches!(config.color, Some(ColorModeConfig::Ansi256)));
        assert_eq!(config.scroll_style, Some(ScrollStyle::Roller));
        assert_eq!(config.roller_preset, Some(2));
        assert_eq!(config.refresh, Some(600));
    }

    #[test]
    fn test_empty_config_is_all_none() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.scenes.is_none());
        assert!(config.fps.is_none());
        assert!(config.latitude.is_none());
    }

    #[test]
    fn test_default_config_string_parses() {
        // The commented template must itself be valid TOML.
        let config: Config = toml::from_str(&default_config_string()).unwrap();
        assert!(config.scenes.is_none());
    }
}
