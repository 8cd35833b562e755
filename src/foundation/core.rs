use crate::foundation::error::{PortadaError, PortadaResult};

pub use kurbo::{Point, Rect, Vec2};

/// Logical canvas size in CSS-like pixels.
///
/// All layer geometry lives in this space; device output is always `logical × scale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Logical width.
    pub width: u32,
    /// Logical height.
    pub height: u32,
}

impl Canvas {
    /// The 9:16 base canvas every cover is designed against.
    pub const COVER: Canvas = Canvas {
        width: 270,
        height: 480,
    };

    /// Create a validated canvas (both sides > 0).
    pub fn new(width: u32, height: u32) -> PortadaResult<Self> {
        if width == 0 || height == 0 {
            return Err(PortadaError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Full-canvas rectangle in logical coordinates.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Pixel size of a surface rendered at `scale` device pixels per logical pixel.
    pub fn device_size(self, scale: f64) -> PortadaResult<(u32, u32)> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PortadaError::validation("scale must be finite and > 0"));
        }
        let w = (f64::from(self.width) * scale).round().max(1.0) as u32;
        let h = (f64::from(self.height) * scale).round().max(1.0) as u32;
        Ok((w, h))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::COVER
    }
}

/// Straight (non-premultiplied) sRGB colour with a fractional alpha.
///
/// Layer paint parameters keep alpha as `f64` so resolved values such as `80 / 150` stay exact.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha in `[0, 1]`.
    pub a: f64,
}

impl Rgba {
    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    /// Opaque black.
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    /// Opaque white.
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    /// Same colour with a replaced alpha (clamped to `[0, 1]`).
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Alpha quantized to 8 bits.
    pub fn alpha_u8(self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Convert to premultiplied RGBA8.
    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.alpha_u8())
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Build from straight RGBA8 by multiplying color channels with alpha.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channels as an `[r, g, b, a]` array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
