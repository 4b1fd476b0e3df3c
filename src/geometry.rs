// =============================================================================
// geometry.rs - Espaces de coordonnées
// geometry.rs - Coordinate spaces
// =============================================================================
//
// Trois espaces coexistent / Three spaces coexist:
// - logique : positions rapportées par les événements de l'overlay (f64)
//   logical: positions reported by overlay pointer events (f64)
// - pixel : indices dans le buffer capturé (u32, origine en haut à gauche)
//   pixel: indices into the captured buffer (u32, top-left origin)
// - écran : bureau virtuel, l'origine peut être négative (i32)
//   screen: virtual desktop, origin may be negative (i32)

use serde::{Deserialize, Serialize};

// =============================================================================
// ESPACE LOGIQUE
// LOGICAL SPACE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LogicalPoint {
    pub x: f64,
    pub y: f64,
}

impl LogicalPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// =============================================================================
// ESPACE PIXEL (capture)
// PIXEL SPACE (screenshot)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

impl PixelPoint {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Nombre total de pixels / Total pixel count
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rectangle dans l'espace pixel / Rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// true si le rectangle tient entièrement dans `size`
    /// true if the rectangle fits entirely inside `size`
    pub fn fits_in(&self, size: PixelSize) -> bool {
        self.x as u64 + self.width as u64 <= size.width as u64
            && self.y as u64 + self.height as u64 <= size.height as u64
    }
}

// =============================================================================
// ESPACE ÉCRAN (bureau virtuel)
// SCREEN SPACE (virtual desktop)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Bord droit exclusif / Exclusive right edge
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Bord bas exclusif / Exclusive bottom edge
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains_point(&self, p: ScreenPoint) -> bool {
        p.x as i64 >= self.x as i64
            && (p.x as i64) < self.right()
            && p.y as i64 >= self.y as i64
            && (p.y as i64) < self.bottom()
    }

    pub fn contains_rect(&self, other: &ScreenRect) -> bool {
        other.x as i64 >= self.x as i64
            && other.y as i64 >= self.y as i64
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}
