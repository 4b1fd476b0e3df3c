//! =============================================================================
//! SCREEN COLOR PICKER - Moteur de sélection de couleur à l'écran
//! SCREEN COLOR PICKER - On-screen color picking engine
//! =============================================================================
//!
//! Capture l'écran, affiche une surface plein écran avec réticule et loupe,
//! puis transforme un clic (ou ESC) en un résultat unique.
//!
//! Captures the screen, shows a full-screen surface with a crosshair and a
//! magnifier, then turns one click (or ESC) into a single outcome.
//!
//! # Flux / Flow
//! `ScreenCapturer` → `Screenshot` → `OverlayController` (+ `MagnifierSampler`,
//! `to_screenshot_space`) → `PickOutcome` → host.

// =============================================================================
// MODULES
// =============================================================================

/// Configuration partagée (constantes + fichier TOML)
/// Shared configuration (constants + TOML file)
pub mod config;

/// Couleurs et formatage texte
/// Colors and text formatting
pub mod common;

/// Types d'erreurs
/// Error types
pub mod error;

/// Points, tailles et rectangles des trois espaces de coordonnées
/// Points, sizes and rectangles of the three coordinate spaces
pub mod geometry;

/// Handles natifs à libération garantie
/// Native handles with guaranteed release
pub mod handle;

/// Moteur de sélection (capture, loupe, overlay, session) et plateformes
/// Picking engine (capture, magnifier, overlay, session) and platforms
pub mod picker;

// =============================================================================
// RÉEXPORTATIONS
// RE-EXPORTS
// =============================================================================

pub use common::{format_hex_color, format_rgb_color, parse_hex_color, ClipboardFormat, Color};
pub use config::PickerConfig;
pub use error::{
    CaptureError, ConfigError, PickError, ResourceError, SampleError, SessionConflictError,
};
pub use geometry::{LogicalPoint, LogicalSize, PixelPoint, PixelRect, PixelSize, ScreenPoint, ScreenRect};
pub use handle::{HandleTracker, NativeHandle};
pub use picker::capture::{PixelBuffer, ScreenCapturer, Screenshot};
pub use picker::coords::{screen_to_screenshot, to_screenshot_space};
pub use picker::magnifier::{MagnifiedView, MagnifierSampler, PointerSample};
pub use picker::overlay::{
    Key, OverlayController, OverlayEvent, OverlayObserver, OverlayRemote, OverlayState,
    OverlaySurface,
};
pub use picker::session::{sample_point, ColorPickSession, DetachedHost, HostWindow, PickOutcome, SessionSlot};
