//! =============================================================================
//! COMMON.RS - Code partagé entre les plateformes
//! COMMON.RS - Shared code between platforms
//! =============================================================================
//!
//! Ce module contient le type couleur et les fonctions de formatage texte.
//! This module contains the color type and text formatting functions.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// COULEUR
// COLOR
// =============================================================================

/// Couleur RGB 8 bits par canal
/// 8-bit per channel RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lit un pixel BGRA (format natif des captures GDI / Core Graphics)
    /// Reads a BGRA pixel (native format of GDI / Core Graphics captures)
    #[inline]
    pub fn from_bgra(px: &[u8]) -> Self {
        Self::new(px[2], px[1], px[0])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_hex_color(*self))
    }
}

// =============================================================================
// FONCTIONS DE CALCUL DE COULEUR
// COLOR CALCULATION FUNCTIONS
// =============================================================================

/// Calcule la luminance relative d'une couleur RGB
/// Calculates the relative luminance of an RGB color
///
/// Utilise la formule standard ITU-R BT.601:
/// Uses the standard ITU-R BT.601 formula:
/// Y = 0.299 * R + 0.587 * G + 0.114 * B
#[inline]
fn calculate_luminance(color: Color) -> f64 {
    0.299 * (color.r as f64) + 0.587 * (color.g as f64) + 0.114 * (color.b as f64)
}

/// Détermine si le texte doit être noir ou blanc selon la couleur de fond
/// Determines if text should be black or white based on background color
#[inline]
pub fn should_use_dark_text(background: Color) -> bool {
    calculate_luminance(background) > 128.0
}

// =============================================================================
// FONCTIONS DE FORMATAGE
// FORMATTING FUNCTIONS
// =============================================================================

/// Formate une couleur RGB en chaîne hexadécimale
/// Formats an RGB color as a hex string
///
/// # Returns
/// Chaîne au format "#RRGGBB" / String in "#RRGGBB" format
#[inline]
pub fn format_hex_color(color: Color) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

/// Formate une couleur en décimal "R, G, B"
/// Formats a color as decimal "R, G, B"
#[inline]
pub fn format_rgb_color(color: Color) -> String {
    format!("{}, {}, {}", color.r, color.g, color.b)
}

/// Analyse "#RRGGBB" ou "RRGGBB" (majuscules ou minuscules)
/// Parses "#RRGGBB" or "RRGGBB" (upper or lower case)
pub fn parse_hex_color(text: &str) -> Option<Color> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Texte remis au presse-papiers (écrit par l'hôte)
/// Text handed to the clipboard (written by the host)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipboardFormat {
    #[default]
    Hex,
    Rgb,
}

impl ClipboardFormat {
    pub fn render(self, color: Color) -> String {
        match self {
            ClipboardFormat::Hex => format_hex_color(color),
            ClipboardFormat::Rgb => format_rgb_color(color),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
