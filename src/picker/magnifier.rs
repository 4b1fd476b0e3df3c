// =============================================================================
// picker/magnifier.rs - Loupe
// picker/magnifier.rs - Magnifier
// =============================================================================
//
// À chaque tick: position du pointeur → pixel de la capture → carré source
// borné → agrandissement au plus proche voisin → position de l'aperçu.
// Each tick: pointer position → screenshot pixel → clamped source square →
// nearest-neighbor upscale → preview placement.

use crate::common::Color;
use crate::config::MagnifierConfig;
use crate::error::SampleError;
use crate::geometry::{LogicalPoint, LogicalSize, PixelPoint, PixelRect, PixelSize, ScreenPoint, ScreenRect};
use crate::picker::capture::{PixelBuffer, Screenshot};
use crate::picker::coords::to_screenshot_space;

/// Position du pointeur dans les deux espaces
/// Pointer position in both spaces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Logical overlay coordinates, used for the pixel lookup
    pub overlay: LogicalPoint,
    /// Screen coordinates, used for the edge test
    pub screen: ScreenPoint,
}

/// Vue agrandie calculée pour un tick (aucun historique conservé)
/// Magnified view computed for one tick (no history kept)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnifiedView {
    /// Source square in screenshot pixels, always inside the screenshot
    pub source: PixelRect,
    pub zoom: u32,
    /// Scaled pixels, `source * zoom` per side
    pub bitmap: PixelBuffer,
    /// Top-left corner of the preview, in screen coordinates
    pub placement: ScreenPoint,
    /// Color of the pixel under the cursor
    pub center: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagnifierSampler {
    source_pixels: u32,
    zoom: u32,
    margin: i32,
}

impl MagnifierSampler {
    pub fn new(config: &MagnifierConfig) -> Self {
        Self {
            source_pixels: config.source_pixels.max(1),
            zoom: config.zoom.max(1),
            margin: config.margin,
        }
    }

    pub fn source_pixels(&self) -> u32 {
        self.source_pixels
    }

    /// Côté de l'aperçu en pixels / Preview side in pixels
    pub fn output_size(&self) -> u32 {
        self.source_pixels.saturating_mul(self.zoom)
    }

    /// Carré source centré sur `center`, décalé pour rester dans la capture
    /// Source square centered on `center`, shifted to stay inside the screenshot
    pub fn source_rect(&self, center: PixelPoint, screenshot: PixelSize) -> Result<PixelRect, SampleError> {
        let side = self.source_pixels;
        if screenshot.width < side || screenshot.height < side {
            return Err(SampleError::RegionTooSmall {
                screenshot,
                source_pixels: side,
            });
        }
        let half = side / 2;
        let x = center.x.saturating_sub(half).min(screenshot.width - side);
        let y = center.y.saturating_sub(half).min(screenshot.height - side);
        Ok(PixelRect::new(x, y, side, side))
    }

    /// Coin haut-gauche de l'aperçu: en bas à droite du curseur, basculé
    /// de l'autre côté sur chaque axe qui déborderait de l'écran
    /// Top-left of the preview: lower-right of the cursor, flipped to the
    /// other side on each axis that would overflow the screen
    pub fn placement(&self, cursor: ScreenPoint, screen: ScreenRect) -> ScreenPoint {
        let size = self.output_size() as i64;
        let margin = self.margin as i64;
        let axis = |pos: i32, start: i32, end: i64| -> i32 {
            let mut p = pos as i64 + margin;
            if p + size > end {
                p = pos as i64 - margin - size;
            }
            p.max(start as i64) as i32
        };
        ScreenPoint::new(
            axis(cursor.x, screen.x, screen.right()),
            axis(cursor.y, screen.y, screen.bottom()),
        )
    }

    /// Calcule la vue pour un tick
    /// Computes the view for one tick
    pub fn sample(
        &self,
        screenshot: &Screenshot,
        pointer: PointerSample,
        overlay: LogicalSize,
    ) -> Result<MagnifiedView, SampleError> {
        let size = screenshot.size();
        let center = to_screenshot_space(pointer.overlay, overlay, size);
        let source = self.source_rect(center, size)?;
        let region = screenshot
            .buffer()
            .crop(source)
            .ok_or(SampleError::RegionTooSmall {
                screenshot: size,
                source_pixels: self.source_pixels,
            })?;
        let out = self.output_size();
        Ok(MagnifiedView {
            source,
            zoom: self.zoom,
            bitmap: region.scale_nearest(out, out),
            placement: self.placement(pointer.screen, screenshot.bounds()),
            center: screenshot.pixel(center).unwrap_or_default(),
        })
    }
}
