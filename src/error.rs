//! Error types for capture, native resources, sessions and configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::{PixelSize, ScreenRect};

/// Échec de capture de l'écran
/// Screen capture failure
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Display surface cannot be read (locked session, permission denied...).
    #[error("display surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("capture region is empty")]
    EmptyRegion,

    #[error("capture region {region:?} is not inside display bounds {bounds:?}")]
    OutOfBounds { region: ScreenRect, bounds: ScreenRect },

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Échec d'acquisition ou de libération d'un handle natif
/// Native handle acquisition or release failure
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to acquire {kind}")]
    Acquire { kind: &'static str },

    #[error("failed to release {kind}: {detail}")]
    Release { kind: &'static str, detail: String },
}

/// Une session était déjà active
/// A session was already active
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("a color picking session is already active")]
pub struct SessionConflictError;

/// Per-tick magnifier failure. Never escalated past the overlay.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("no pointer position available")]
    NoPointer,

    #[error("screenshot {screenshot:?} is smaller than the {source_pixels}px magnifier square")]
    RegionTooSmall { screenshot: PixelSize, source_pixels: u32 },

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Erreur remontée par une session de sélection
/// Error reported by a picking session
#[derive(Debug, Error)]
pub enum PickError {
    #[error("screen capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("native resource failure: {0}")]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    SessionConflict(#[from] SessionConflictError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}
