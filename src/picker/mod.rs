// =============================================================================
// picker/mod.rs - Color picker module
// =============================================================================

/// Capture d'écran et buffers de pixels
/// Screen capture and pixel buffers
pub mod capture;

/// Conversion de coordonnées overlay → capture
/// Overlay → screenshot coordinate conversion
pub mod coords;

/// Tâche récurrente de la loupe
/// Recurring magnifier task
pub mod ticker;

/// Échantillonnage de la loupe
/// Magnifier sampling
pub mod magnifier;

/// Machine à états de l'overlay
/// Overlay state machine
pub mod overlay;

/// Orchestration d'une sélection
/// Orchestration of one pick
pub mod session;

#[cfg(test)]
pub(crate) mod mock;

/// Implémentation macOS
/// macOS implementation
#[cfg(target_os = "macos")]
pub mod macos;

/// Implémentation Windows
/// Windows implementation
#[cfg(target_os = "windows")]
pub mod windows;

/// Implémentation Linux (non implémentée)
/// Linux implementation (not implemented)
#[cfg(target_os = "linux")]
pub mod linux;

use crate::common::Color;
use crate::config::PickerConfig;
use crate::error::PickError;
use crate::geometry::ScreenPoint;
use session::PickOutcome;

// =============================================================================
// FONCTIONS PUBLIQUES
// PUBLIC FUNCTIONS
// =============================================================================

/// Lance une session de sélection native selon la plateforme
/// Launches a native picking session based on the platform
///
/// Blocks until the user clicks a pixel or cancels.
pub fn run(config: &PickerConfig) -> Result<PickOutcome, PickError> {
    config.validate()?;

    #[cfg(target_os = "macos")]
    {
        macos::run(config)
    }

    #[cfg(target_os = "windows")]
    {
        windows::run(config)
    }

    #[cfg(target_os = "linux")]
    {
        linux::run(config)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        Err(PickError::Unsupported("screen color picking"))
    }
}

/// Lit la couleur d'un point (ou sous le curseur si `at` vaut `None`)
/// Reads the color of one point (or under the cursor when `at` is `None`)
///
/// The host window is minimized for the settle delay, as for a full session.
pub fn pick_point(at: Option<ScreenPoint>, config: &PickerConfig) -> Result<Color, PickError> {
    config.validate()?;

    #[cfg(target_os = "macos")]
    {
        macos::capture_point(at, config)
    }

    #[cfg(target_os = "windows")]
    {
        windows::capture_point(at, config)
    }

    #[cfg(target_os = "linux")]
    {
        linux::capture_point(at, config)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        let _ = at;
        Err(PickError::Unsupported("screen capture"))
    }
}
