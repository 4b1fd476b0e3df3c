// =============================================================================
// COLOR PICKER - VERSION MACOS
// =============================================================================
// Capture Core Graphics du bureau. L'overlay plein écran n'est pas porté sur
// macOS: seule la lecture d'un point est disponible.
// Core Graphics capture of the desktop. The full-screen overlay is not ported
// to macOS: only single-point reads are available.
// =============================================================================

// Core Graphics (capture d'écran et position du pointeur)
// Core Graphics (screen capture and pointer location)
use core_graphics::display::{CGDirectDisplayID, CGDisplay};
use core_graphics::event::CGEvent;
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::{CGPoint, CGRect, CGSize};
use core_graphics::window::{kCGNullWindowID, kCGWindowImageDefault, kCGWindowListOptionOnScreenOnly};

use crate::common::Color;
use crate::config::PickerConfig;
use crate::error::{CaptureError, PickError};
use crate::geometry::{ScreenPoint, ScreenRect};
use crate::picker::capture::{check_region, PixelBuffer, ScreenCapturer};
use crate::picker::session::{sample_point, DetachedHost, PickOutcome, SessionSlot};

/// Capture via `CGDisplay::screenshot`, en points globaux (origine en haut)
/// Capture through `CGDisplay::screenshot`, in global points (top-left origin)
///
/// On Retina displays the image holds more pixels than the region has
/// points; it is reduced to one pixel per point before returning.
#[derive(Debug, Default)]
pub struct CoreGraphicsCapturer;

impl CoreGraphicsCapturer {
    pub fn new() -> Self {
        Self
    }
}

fn to_screen_rect(rect: CGRect) -> ScreenRect {
    ScreenRect::new(
        rect.origin.x.floor() as i32,
        rect.origin.y.floor() as i32,
        rect.size.width.ceil().max(0.0) as u32,
        rect.size.height.ceil().max(0.0) as u32,
    )
}

impl ScreenCapturer for CoreGraphicsCapturer {
    fn virtual_bounds(&self) -> Result<ScreenRect, CaptureError> {
        let displays: Vec<CGDirectDisplayID> = CGDisplay::active_displays()
            .map_err(|code| CaptureError::SurfaceUnavailable(format!("CGGetActiveDisplayList error {code}")))?;
        // Union des écrans actifs / Union of the active displays
        let union = displays
            .into_iter()
            .map(|id| CGDisplay::new(id).bounds())
            .reduce(|a, b| {
                let x = a.origin.x.min(b.origin.x);
                let y = a.origin.y.min(b.origin.y);
                let right = (a.origin.x + a.size.width).max(b.origin.x + b.size.width);
                let bottom = (a.origin.y + a.size.height).max(b.origin.y + b.size.height);
                CGRect::new(&CGPoint::new(x, y), &CGSize::new(right - x, bottom - y))
            })
            .ok_or_else(|| CaptureError::SurfaceUnavailable("no active display".into()))?;
        Ok(to_screen_rect(union))
    }

    fn capture_region(&mut self, region: ScreenRect) -> Result<PixelBuffer, CaptureError> {
        check_region(region, self.virtual_bounds()?)?;
        let rect = CGRect::new(
            &CGPoint::new(region.x as f64, region.y as f64),
            &CGSize::new(region.width as f64, region.height as f64),
        );
        // None: permission d'enregistrement d'écran refusée ou session verrouillée
        // None: screen recording permission denied or session locked
        let image = CGDisplay::screenshot(
            rect,
            kCGWindowListOptionOnScreenOnly,
            kCGNullWindowID,
            kCGWindowImageDefault,
        )
        .ok_or_else(|| CaptureError::SurfaceUnavailable("CGWindowListCreateImage returned null".into()))?;

        if image.bits_per_pixel() != 32 {
            return Err(CaptureError::SurfaceUnavailable(format!(
                "unsupported pixel format: {} bits per pixel",
                image.bits_per_pixel()
            )));
        }
        let data = image.data();
        // Les données sont en format BGRA / Data is in BGRA format
        let buffer = PixelBuffer::from_bgra(
            image.width() as u32,
            image.height() as u32,
            image.bytes_per_row(),
            data.bytes(),
        )
        .ok_or(CaptureError::EmptyRegion)?;

        // Écran Retina: un pixel par point / Retina display: one pixel per point
        if buffer.size() == region.size() {
            Ok(buffer)
        } else {
            log::trace!(
                "scaling {}x{} capture to {}x{} points",
                buffer.width(),
                buffer.height(),
                region.width,
                region.height
            );
            Ok(buffer.scale_nearest(region.width, region.height))
        }
    }
}

/// Position actuelle du pointeur en points globaux
/// Current pointer location in global points
pub fn cursor_position() -> Option<ScreenPoint> {
    let source = CGEventSource::new(CGEventSourceStateID::CombinedSessionState).ok()?;
    let event = CGEvent::new(source).ok()?;
    let location = event.location();
    Some(ScreenPoint::new(location.x.floor() as i32, location.y.floor() as i32))
}

pub fn run(_config: &PickerConfig) -> Result<PickOutcome, PickError> {
    Err(PickError::Unsupported("the full-screen overlay"))
}

/// Couleur d'un point de l'écran, sans overlay
/// Color of one screen point, without overlay
///
/// The terminal window is not ours to hide; the settle delay still applies.
pub fn capture_point(at: Option<ScreenPoint>, config: &PickerConfig) -> Result<Color, PickError> {
    let mut capturer = CoreGraphicsCapturer::new();
    sample_point(
        SessionSlot::global(),
        &mut capturer,
        &mut DetachedHost,
        config,
        at,
        cursor_position,
    )
}
