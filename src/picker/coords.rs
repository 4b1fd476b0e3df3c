// =============================================================================
// picker/coords.rs - Conversion overlay logique → pixels de la capture
// picker/coords.rs - Logical overlay → screenshot pixel conversion
// =============================================================================
//
// L'overlay est rendu en unités logiques (mises à l'échelle DPI) alors que
// la capture est en pixels physiques: les deux tailles peuvent différer.
// The overlay renders in logical (DPI-scaled) units while the screenshot is
// in physical pixels: the two sizes may differ.

use crate::geometry::{LogicalPoint, LogicalSize, PixelPoint, PixelSize, ScreenPoint};
use crate::picker::capture::Screenshot;

/// Convertit un point de l'overlay en pixel de la capture, borné
/// Converts an overlay point into a screenshot pixel, clamped
///
/// `px = clamp(round(x * pixel.width / logical.width), 0, pixel.width - 1)`,
/// same for `y`.
pub fn to_screenshot_space(point: LogicalPoint, logical: LogicalSize, pixels: PixelSize) -> PixelPoint {
    PixelPoint::new(
        map_axis(point.x, logical.width, pixels.width),
        map_axis(point.y, logical.height, pixels.height),
    )
}

fn map_axis(value: f64, logical_len: f64, pixel_len: u32) -> u32 {
    let max = pixel_len.saturating_sub(1);
    if !(logical_len.is_finite() && logical_len > 0.0) || !value.is_finite() {
        return 0;
    }
    let scaled = (value * pixel_len as f64 / logical_len).round();
    if scaled <= 0.0 {
        0
    } else if scaled >= max as f64 {
        max
    } else {
        scaled as u32
    }
}

/// Convertit une position écran brute en pixel de la capture, borné
/// Converts a raw screen position into a screenshot pixel, clamped
///
/// Accounts for a negative desktop origin and for a buffer whose pixel size
/// differs from the captured screen rectangle.
pub fn screen_to_screenshot(point: ScreenPoint, screenshot: &Screenshot) -> PixelPoint {
    let bounds = screenshot.bounds();
    let local = LogicalPoint::new(
        point.x as f64 - bounds.x as f64,
        point.y as f64 - bounds.y as f64,
    );
    let logical = LogicalSize::new(bounds.width as f64, bounds.height as f64);
    to_screenshot_space(local, logical, screenshot.size())
}
