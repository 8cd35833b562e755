use std::io::Cursor;

use anyhow::Context;

use crate::foundation::{
    error::{PortadaError, PortadaResult},
    math::unpremultiply_rgba8_in_place,
};

/// A rendered surface as RGBA8 pixels.
///
/// Rasterizer output is **premultiplied alpha**; the `premultiplied` flag makes this explicit at
/// API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// `[r, g, b, a]` at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    /// Encode as a lossless PNG with alpha.
    pub fn encode_png(&self) -> PortadaResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba8())
            .ok_or_else(|| PortadaError::render("frame buffer size does not match dimensions"))?;
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
