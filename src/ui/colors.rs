//! Centralized color constants and color-name parsing.
//!
//! Configuration files name colors the way matplotlib does (`green`, `k`,
//! `#1f77b4`), so the same spellings are accepted here.

use crate::error::{MapError, Result};
use eframe::egui::Color32;

/// Colors for chrome drawn around the map itself.
pub mod chrome {
    use super::Color32;

    /// Area outside the map boundary.
    pub const CANVAS: Color32 = Color32::WHITE;
    /// Map boundary outline.
    pub const BOUNDARY: Color32 = Color32::BLACK;
    /// Title text.
    pub const TITLE: Color32 = Color32::from_rgb(20, 20, 20);
}

/// Looks up a named color or a `#rgb`, `#rrggbb` or `#rrggbbaa` hex code.
pub fn parse_color(value: &str) -> Result<Color32> {
    let value = value.trim();
    if value.starts_with('#') {
        return Color32::from_hex(value).map_err(|_| invalid(value));
    }

    let color = match value.to_ascii_lowercase().as_str() {
        "k" | "black" => Color32::BLACK,
        "w" | "white" => Color32::WHITE,
        "r" | "red" => Color32::from_rgb(255, 0, 0),
        "g" | "green" => Color32::from_rgb(0, 128, 0),
        "b" | "blue" => Color32::from_rgb(0, 0, 255),
        "y" | "yellow" => Color32::from_rgb(255, 255, 0),
        "c" | "cyan" => Color32::from_rgb(0, 191, 191),
        "m" | "magenta" => Color32::from_rgb(191, 0, 191),
        "gray" | "grey" => Color32::from_rgb(128, 128, 128),
        "lightgray" | "lightgrey" => Color32::from_rgb(211, 211, 211),
        "orange" => Color32::from_rgb(255, 165, 0),
        "brown" => Color32::from_rgb(165, 42, 42),
        "tan" => Color32::from_rgb(210, 180, 140),
        "navy" => Color32::from_rgb(0, 0, 128),
        "aqua" => Color32::from_rgb(0, 255, 255),
        "lightblue" => Color32::from_rgb(173, 216, 230),
        "darkgreen" => Color32::from_rgb(0, 100, 0),
        "coral" => Color32::from_rgb(255, 127, 80),
        _ => return Err(invalid(value)),
    };
    Ok(color)
}

fn invalid(value: &str) -> MapError {
    MapError::InvalidConfig(format!("unknown color '{}'", value))
}
