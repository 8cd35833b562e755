use std::sync::Arc;

use anyhow::Context;

use crate::{
    assets::encoded::EncodedImage,
    foundation::{
        error::{PortadaError, PortadaResult},
        math::premultiply_rgba8_in_place,
    },
};

// Avoid pathological allocations for oversized SVG targets.
const MAX_SVG_DIM: u32 = 16_384;

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode an encoded image into premultiplied RGBA8.
///
/// Raster payloads decode at their intrinsic size. SVG payloads are rasterized at `svg_target`
/// when given (so vector logos stay crisp at export density), otherwise at their intrinsic size.
pub fn decode_image(
    img: &EncodedImage,
    svg_target: Option<(u32, u32)>,
) -> PortadaResult<PreparedImage> {
    if img.is_svg() {
        let tree = parse_svg(img.bytes())?;
        let (w, h) = match svg_target {
            Some((w, h)) => (w.max(1), h.max(1)),
            None => {
                let s = tree.size();
                (s.width().ceil().max(1.0) as u32, s.height().ceil().max(1.0) as u32)
            }
        };
        let rgba8_premul = rasterize_svg_to_premul_rgba8(&tree, w, h)?;
        return Ok(PreparedImage {
            width: w,
            height: h,
            rgba8_premul: Arc::new(rgba8_premul),
        });
    }
    decode_raster(img.bytes())
}

/// Decode raster bytes (PNG/JPEG/GIF/WebP/BMP) and convert to premultiplied RGBA8.
pub(crate) fn decode_raster(bytes: &[u8]) -> PortadaResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a `usvg` tree.
pub(crate) fn parse_svg(bytes: &[u8]) -> PortadaResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Rasterize an SVG tree, stretched to `width × height`.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> PortadaResult<Vec<u8>> {
    if width > MAX_SVG_DIM || height > MAX_SVG_DIM {
        return Err(PortadaError::decode(format!(
            "svg raster size too large: {width}x{height} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PortadaError::decode("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
