//! Packed-RGB color type shared by the entity model and the wire format.

use serde::{Deserialize, Serialize};

/// A color packed as `0xRRGGBB`.
///
/// The scene blob stores colors as plain integers, so the packed form is
/// also the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

/// Default fill for newly drawn shapes.
pub const DEFAULT_FILL: Color = Color(0x4a90e2);

/// Default stroke for newly drawn shapes.
pub const DEFAULT_STROKE: Color = Color(0x2c5aa0);

/// Stroke override applied to the selected entity.
pub const SELECTION_STROKE: Color = Color(0xff0000);

/// Default stroke width for newly drawn shapes.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

impl Color {
    /// Create a color from 8-bit channels.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Red channel.
    pub fn r(&self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    /// Green channel.
    pub fn g(&self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    /// Blue channel.
    pub fn b(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// The raw packed value.
    pub fn packed(&self) -> u32 {
        self.0
    }
}
