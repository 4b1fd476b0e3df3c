//! Configuration constants shared across all platforms
//!
//! These values control the appearance and behavior of the color picker.
//! [`PickerConfig`] groups the ones a user may override from a TOML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::Color;
use crate::error::ConfigError;

// =============================================================================
// SESSION
// =============================================================================

/// Delay after minimizing the host window, before capturing the screen
/// (in milliseconds). Lets the minimize animation finish so the host does
/// not appear in the screenshot.
pub const SETTLE_DELAY_MS: u64 = 100;

/// Magnifier refresh interval (in milliseconds), about 60 Hz
pub const TICK_INTERVAL_MS: u64 = 16;

// =============================================================================
// LOUPE / MAGNIFIER
// =============================================================================

/// Number of screen pixels captured by the magnifier (per side)
/// Must be ODD to have a single center pixel
pub const MAGNIFIER_SOURCE_PIXELS: u32 = 7;

/// Zoom factor of the magnifier
/// magnifier_size = MAGNIFIER_SOURCE_PIXELS * MAGNIFIER_ZOOM = 70px
pub const MAGNIFIER_ZOOM: u32 = 10;

/// Largest magnifier preview side (in pixels)
/// source_pixels * zoom must not exceed it
pub const MAGNIFIER_MAX_SIZE: u32 = 512;

/// Gap between the cursor and the magnifier preview (in pixels)
pub const MAGNIFIER_MARGIN: i32 = 20;

/// Thickness of the border drawn around the magnifier with the current color
pub const MAGNIFIER_BORDER_WIDTH: i32 = 3;

// =============================================================================
// RÉTICULE / CROSSHAIR
// =============================================================================

/// Total length of each crosshair stroke (in logical pixels)
pub const CROSSHAIR_LENGTH: f64 = 30.0;

/// Crosshair stroke thickness
pub const CROSSHAIR_THICKNESS: i32 = 2;

/// Crosshair color (DeepSkyBlue)
pub const CROSSHAIR_COLOR: Color = Color::new(0, 191, 255);

// =============================================================================
// CONFIGURATION UTILISATEUR
// USER CONFIGURATION
// =============================================================================

/// Réglages de la loupe / Magnifier settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnifierConfig {
    pub source_pixels: u32,
    pub zoom: u32,
    pub margin: i32,
}

impl Default for MagnifierConfig {
    fn default() -> Self {
        Self {
            source_pixels: MAGNIFIER_SOURCE_PIXELS,
            zoom: MAGNIFIER_ZOOM,
            margin: MAGNIFIER_MARGIN,
        }
    }
}

/// Réglages d'une session de sélection
/// Settings of a picking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub settle_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub magnifier: MagnifierConfig,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: SETTLE_DELAY_MS,
            tick_interval_ms: TICK_INTERVAL_MS,
            magnifier: MagnifierConfig::default(),
        }
    }
}

impl PickerConfig {
    /// Charge un fichier TOML; les clés absentes gardent leur valeur par défaut
    /// Loads a TOML file; missing keys keep their default value
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PickerConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let source = self.magnifier.source_pixels;
        if source == 0 || source % 2 == 0 {
            return Err(ConfigError::Invalid(format!(
                "magnifier.source_pixels must be odd and non-zero, got {source}"
            )));
        }
        let zoom = self.magnifier.zoom;
        if zoom == 0 {
            return Err(ConfigError::Invalid("magnifier.zoom must be at least 1".into()));
        }
        match source.checked_mul(zoom) {
            Some(size) if size <= MAGNIFIER_MAX_SIZE => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "magnifier preview {source} x {zoom} exceeds {MAGNIFIER_MAX_SIZE} pixels"
                )))
            }
        }
        // 0 ms would turn the session wait into a spin
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be at least 1".into()));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.settle_delay_ms)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = PickerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.magnifier.source_pixels * config.magnifier.zoom, 70);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "settle_delay_ms = 250\n[magnifier]\nzoom = 12").unwrap();

        let config = PickerConfig::load(file.path()).unwrap();
        assert_eq!(config.settle_delay_ms, 250);
        assert_eq!(config.tick_interval_ms, TICK_INTERVAL_MS);
        assert_eq!(config.magnifier.zoom, 12);
        assert_eq!(config.magnifier.source_pixels, MAGNIFIER_SOURCE_PIXELS);
    }

    #[test]
    fn test_load_rejects_even_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[magnifier]\nsource_pixels = 8").unwrap();
        assert!(matches!(
            PickerConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let config = PickerConfig {
            tick_interval_ms: 0,
            ..PickerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let one = PickerConfig {
            tick_interval_ms: 1,
            ..PickerConfig::default()
        };
        assert!(one.validate().is_ok());
    }

    #[test]
    fn test_validate_caps_magnifier_size() {
        let mut config = PickerConfig::default();
        config.magnifier.zoom = 1_000_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        // u32 overflow of source_pixels * zoom
        config.magnifier.source_pixels = 3;
        config.magnifier.zoom = u32::MAX;
        assert!(config.validate().is_err());

        // 7 x 73 = 511 fits, 7 x 74 = 518 does not
        config.magnifier.source_pixels = 7;
        config.magnifier.zoom = 73;
        assert!(config.validate().is_ok());
        config.magnifier.zoom = 74;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_zero_tick() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_interval_ms = 0").unwrap();
        assert!(matches!(
            PickerConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "settle_delay_ms = \"soon\"").unwrap();
        assert!(matches!(
            PickerConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            PickerConfig::load(&missing),
            Err(ConfigError::Io { .. })
        ));
    }
}
