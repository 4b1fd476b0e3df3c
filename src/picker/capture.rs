// =============================================================================
// picker/capture.rs - Capture d'écran et buffers de pixels
// picker/capture.rs - Screen capture and pixel buffers
// =============================================================================

use crate::common::Color;
use crate::error::CaptureError;
use crate::geometry::{PixelPoint, PixelRect, PixelSize, ScreenPoint, ScreenRect};

// =============================================================================
// BUFFER DE PIXELS
// PIXEL BUFFER
// =============================================================================

/// Pixels en ordre ligne par ligne, exactement `width * height` couleurs
/// Row-major pixels, exactly `width * height` colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Returns `None` unless `pixels.len() == width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Option<Self> {
        if pixels.len() != PixelSize::new(width, height).area() {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; PixelSize::new(width, height).area()],
        }
    }

    /// Convertit des lignes BGRA 32 bits (haut vers bas)
    /// Converts top-down 32-bit BGRA rows
    ///
    /// `stride` is the byte length of one row, which may include padding.
    /// Returns `None` for an empty image or rows that do not fit in `data`.
    pub fn from_bgra(width: u32, height: u32, stride: usize, data: &[u8]) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let row_bytes = width as usize * 4;
        let needed = stride
            .checked_mul(height as usize - 1)
            .and_then(|n| n.checked_add(row_bytes))?;
        if stride < row_bytes || data.len() < needed {
            return None;
        }
        let mut pixels = Vec::with_capacity(PixelSize::new(width, height).area());
        for row in data.chunks(stride).take(height as usize) {
            pixels.extend(row[..row_bytes].chunks_exact(4).map(Color::from_bgra));
        }
        Some(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn get(&self, point: PixelPoint) -> Option<Color> {
        if point.x >= self.width || point.y >= self.height {
            return None;
        }
        self.pixels
            .get(point.y as usize * self.width as usize + point.x as usize)
            .copied()
    }

    /// Copie la zone `rect`, qui doit tenir dans le buffer
    /// Copies the `rect` area, which must fit inside the buffer
    pub fn crop(&self, rect: PixelRect) -> Option<PixelBuffer> {
        if rect.width == 0 || rect.height == 0 || !rect.fits_in(self.size()) {
            return None;
        }
        let mut pixels = Vec::with_capacity(rect.size().area());
        for y in rect.y..rect.y + rect.height {
            let start = y as usize * self.width as usize + rect.x as usize;
            pixels.extend_from_slice(&self.pixels[start..start + rect.width as usize]);
        }
        Some(PixelBuffer {
            width: rect.width,
            height: rect.height,
            pixels,
        })
    }

    /// Agrandissement au plus proche voisin
    /// Nearest-neighbor scaling
    pub fn scale_nearest(&self, width: u32, height: u32) -> PixelBuffer {
        if self.pixels.is_empty() || width == 0 || height == 0 {
            return PixelBuffer::filled(width, height, Color::default());
        }
        let mut pixels = Vec::with_capacity(PixelSize::new(width, height).area());
        for y in 0..height as u64 {
            let sy = (y * self.height as u64 / height as u64) as usize;
            let row = &self.pixels[sy * self.width as usize..(sy + 1) * self.width as usize];
            for x in 0..width as u64 {
                let sx = (x * self.width as u64 / width as u64) as usize;
                pixels.push(row[sx]);
            }
        }
        PixelBuffer { width, height, pixels }
    }

    /// Sérialise en BGRA 32 bits (pour StretchDIBits)
    /// Serializes to 32-bit BGRA (for StretchDIBits)
    pub fn to_bgra(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| [c.b, c.g, c.r, 0xFF])
            .collect()
    }
}

// =============================================================================
// CAPTURE D'ÉCRAN IMMUABLE
// IMMUTABLE SCREENSHOT
// =============================================================================

/// Capture du bureau virtuel, prise une fois par session
/// Capture of the virtual desktop, taken once per session
///
/// There is no way to mutate a screenshot after it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    bounds: ScreenRect,
    buffer: PixelBuffer,
}

impl Screenshot {
    /// `bounds` is the screen rectangle the buffer was captured from.
    /// Its size may differ from the buffer's under display scaling.
    pub fn new(bounds: ScreenRect, buffer: PixelBuffer) -> Result<Self, CaptureError> {
        if buffer.size().is_empty() {
            return Err(CaptureError::EmptyRegion);
        }
        Ok(Self { bounds, buffer })
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn size(&self) -> PixelSize {
        self.buffer.size()
    }

    pub fn bounds(&self) -> ScreenRect {
        self.bounds
    }

    pub fn pixel(&self, point: PixelPoint) -> Option<Color> {
        self.buffer.get(point)
    }
}

// =============================================================================
// CAPTURE D'ÉCRAN (contrat plateforme)
// SCREEN CAPTURE (platform contract)
// =============================================================================

/// Seul composant qui lit les pixels de l'écran
/// The only component that reads screen pixels
pub trait ScreenCapturer {
    /// Rectangle of the whole virtual desktop.
    fn virtual_bounds(&self) -> Result<ScreenRect, CaptureError>;

    /// Captures `region`, which must lie inside [`virtual_bounds`](Self::virtual_bounds).
    /// The buffer holds exactly `region.width * region.height` colors, even
    /// on scaled displays. Any native handle is released before returning,
    /// on success or error.
    fn capture_region(&mut self, region: ScreenRect) -> Result<PixelBuffer, CaptureError>;

    /// Couleur d'un seul pixel (capture 1×1)
    /// Color of a single pixel (1×1 capture)
    fn capture_point(&mut self, point: ScreenPoint) -> Result<Color, CaptureError> {
        let buffer = self.capture_region(ScreenRect::new(point.x, point.y, 1, 1))?;
        buffer
            .get(PixelPoint::new(0, 0))
            .ok_or(CaptureError::EmptyRegion)
    }

    /// Capture complète du bureau virtuel
    /// Full capture of the virtual desktop
    fn capture_screen(&mut self) -> Result<Screenshot, CaptureError> {
        let bounds = self.virtual_bounds()?;
        let buffer = self.capture_region(bounds)?;
        log::debug!(
            "captured {}x{} pixels from {:?}",
            buffer.width(),
            buffer.height(),
            bounds
        );
        Screenshot::new(bounds, buffer)
    }
}

/// Vérifie qu'une région est non vide et dans les limites
/// Checks that a region is non-empty and within bounds
pub fn check_region(region: ScreenRect, bounds: ScreenRect) -> Result<(), CaptureError> {
    if region.is_empty() {
        return Err(CaptureError::EmptyRegion);
    }
    if !bounds.contains_rect(&region) {
        return Err(CaptureError::OutOfBounds { region, bounds });
    }
    Ok(())
}
