use std::{collections::HashMap, sync::Arc};

use kurbo::Shape;

use crate::{
    assets::{
        decode::decode_image,
        encoded::EncodedImage,
        fonts::{FaceStyle, FontSet, TextBrushRgba8, TextLayoutEngine, TextShape},
    },
    cover::layers::{ImageFit, Layer, LayerContent, LayerKind, LayerStack, TextAnchor, TextRun},
    foundation::{
        core::{Point, Rect, Rgba, Vec2},
        error::{PortadaError, PortadaResult},
    },
    render::{backend::FrameRGBA, effects},
};

const IMAGE_CACHE_LIMIT: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ImageKey {
    hash: u64,
    target: Option<(u32, u32)>,
}

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

/// Font of a shaped run, keyed by the blob id and face index parley reports for it.
type RunFontKey = (u64, u32);

struct ShapedText {
    layout: parley::Layout<TextBrushRgba8>,
    fonts: Vec<(RunFontKey, vello_cpu::peniko::FontData)>,
    /// Block size in logical pixels.
    size: Vec2,
}

/// An image placed in logical space: the decoded paint, the image-to-logical transform and the
/// part of the image (in image pixels) that is visible.
struct PlacedImage {
    paint: ImagePaint,
    to_logical: vello_cpu::kurbo::Affine,
    visible: vello_cpu::kurbo::Rect,
}

/// CPU rasterizer for [`LayerStack`]s, built on `vello_cpu`.
///
/// Each layer is painted into a transparent scratch surface, shadowed if requested, then composited
/// source-over onto the accumulated frame. Contrast and the rounded card mask run last.
pub struct CpuRasterizer {
    fonts: FontSet,
    text: TextLayoutEngine,
    ctx: Option<vello_cpu::RenderContext>,
    images: HashMap<ImageKey, ImagePaint>,
    run_fonts: HashMap<RunFontKey, vello_cpu::peniko::FontData>,
}

impl CpuRasterizer {
    /// Create a rasterizer drawing text with `fonts`.
    pub fn new(fonts: FontSet) -> Self {
        Self {
            fonts,
            text: TextLayoutEngine::new(),
            ctx: None,
            images: HashMap::new(),
            run_fonts: HashMap::new(),
        }
    }

    /// Fonts used for text layers.
    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Flatten `stack` at `scale` device pixels per logical pixel.
    ///
    /// Layers that cannot be painted (undecodable image, no fonts) are skipped with a warning.
    #[tracing::instrument(skip(self, stack), fields(layers = stack.layers.len()))]
    pub fn render(&mut self, stack: &LayerStack, scale: f64) -> PortadaResult<FrameRGBA> {
        let (width, height) = stack.canvas.device_size(scale)?;
        let w16: u16 = width
            .try_into()
            .map_err(|_| PortadaError::render("surface width exceeds u16"))?;
        let h16: u16 = height
            .try_into()
            .map_err(|_| PortadaError::render("surface height exceeds u16"))?;

        let mut acc = vec![0u8; (width as usize) * (height as usize) * 4];
        let mut scratch = vello_cpu::Pixmap::new(w16, h16);
        let mut blocks: HashMap<LayerKind, Rect> = HashMap::new();

        for layer in &stack.layers {
            scratch.data_as_u8_slice_mut().fill(0);
            let painted = match self.paint_layer(layer, scale, &mut scratch, &mut blocks) {
                Ok(painted) => painted,
                Err(e) => {
                    tracing::warn!(kind = ?layer.kind, "layer skipped: {e}");
                    false
                }
            };
            if !painted {
                continue;
            }
            let src = scratch.data_as_u8_slice();
            let opacity = layer.opacity as f32;
            if let Some(shadow) = &layer.shadow {
                let cast = effects::drop_shadow(src, width, height, shadow, scale)?;
                effects::premul_over_in_place_opacity(&mut acc, &cast, opacity)?;
            }
            effects::premul_over_in_place_opacity(&mut acc, src, opacity)?;
        }

        if (stack.contrast - 1.0).abs() > f64::EPSILON {
            effects::color_matrix_rgba8_premul_in_place(
                &mut acc,
                effects::contrast_matrix(stack.contrast.max(0.0) as f32),
            );
        }
        effects::round_corners_in_place(&mut acc, width, height, stack.corner_radius * scale);

        Ok(FrameRGBA {
            width,
            height,
            data: acc,
            premultiplied: true,
        })
    }

    fn paint_layer(
        &mut self,
        layer: &Layer,
        scale: f64,
        scratch: &mut vello_cpu::Pixmap,
        blocks: &mut HashMap<LayerKind, Rect>,
    ) -> PortadaResult<bool> {
        let (width, height) = (u32::from(scratch.width()), u32::from(scratch.height()));
        match &layer.content {
            LayerContent::Fill { rect, color } => {
                let mut ctx = self.take_ctx(scratch);
                fill_rect(&mut ctx, scale, *rect, *color);
                self.finish(ctx, scratch);
                Ok(true)
            }
            LayerContent::Image { image, frame, fit } => {
                let placed = self.place_image(image, *frame, *fit, scale)?;
                let mut ctx = self.take_ctx(scratch);
                draw_image(&mut ctx, scale, placed);
                self.finish(ctx, scratch);
                Ok(true)
            }
            LayerContent::LinearGradient(g) => {
                effects::paint_linear_gradient(
                    scratch.data_as_u8_slice_mut(),
                    width,
                    height,
                    scale,
                    g,
                );
                Ok(true)
            }
            LayerContent::RadialGradients { rect, gradients } => {
                effects::paint_radial_gradients(
                    scratch.data_as_u8_slice_mut(),
                    width,
                    height,
                    scale,
                    *rect,
                    gradients,
                );
                Ok(true)
            }
            LayerContent::Text {
                run,
                anchor,
                max_width,
            } => {
                let shaped = self.shape(run, *max_width, scale)?;
                let size = shaped.as_ref().map_or(Vec2::ZERO, |s| s.size);
                let origin = match *anchor {
                    TextAnchor::TopLeft(p) => p,
                    TextAnchor::Below { of, x, gap } => {
                        Point::new(x, blocks.get(&of).map_or(0.0, |r| r.y1) + gap)
                    }
                    TextAnchor::Center(c) => c - size / 2.0,
                };
                blocks.insert(layer.kind, Rect::from_origin_size(origin, size.to_size()));
                let Some(shaped) = shaped else {
                    return Ok(false);
                };
                let mut ctx = self.take_ctx(scratch);
                draw_text(&mut ctx, scale, origin, &shaped);
                self.finish(ctx, scratch);
                Ok(true)
            }
            LayerContent::Placeholder {
                rect,
                color,
                prompt,
            } => {
                let shaped = self.shape(prompt, Some(rect.width()), scale)?;
                let mut ctx = self.take_ctx(scratch);
                fill_rect(&mut ctx, scale, *rect, *color);
                if let Some(shaped) = &shaped {
                    draw_text(&mut ctx, scale, rect.center() - shaped.size / 2.0, shaped);
                }
                self.finish(ctx, scratch);
                Ok(true)
            }
            LayerContent::Signature {
                corner,
                gap,
                logo,
                run,
            } => {
                let shaped = self.shape(run, None, scale)?;
                let text_size = shaped.as_ref().map_or(Vec2::ZERO, |s| s.size);
                let logo_side = logo.as_ref().map_or(0.0, |l| l.size_px.max(0.0));
                if shaped.is_none() && logo_side <= 0.0 {
                    return Ok(false);
                }
                let row_h = text_size.y.max(logo_side);
                let top = corner.y - row_h;
                let text_origin = Point::new(
                    corner.x - text_size.x,
                    top + (row_h - text_size.y) / 2.0,
                );
                let logo_right = if shaped.is_some() {
                    text_origin.x - gap
                } else {
                    corner.x
                };
                let placed_logo = match logo {
                    Some(mark) if logo_side > 0.0 => {
                        let square = Rect::new(
                            logo_right - logo_side,
                            top + (row_h - logo_side) / 2.0,
                            logo_right,
                            top + (row_h + logo_side) / 2.0,
                        );
                        match self.place_image(&mark.image, square, ImageFit::Contain, scale) {
                            Ok(p) => Some(p),
                            Err(e) => {
                                tracing::warn!("logo skipped: {e}");
                                None
                            }
                        }
                    }
                    _ => None,
                };

                let mut ctx = self.take_ctx(scratch);
                if let Some(p) = placed_logo {
                    draw_image(&mut ctx, scale, p);
                }
                if let Some(shaped) = &shaped {
                    draw_text(&mut ctx, scale, text_origin, shaped);
                }
                self.finish(ctx, scratch);
                Ok(true)
            }
            LayerContent::Tag {
                corner,
                padding,
                radius,
                fill,
                run,
            } => {
                let Some(shaped) = self.shape(run, None, scale)? else {
                    return Ok(false);
                };
                let pill = Rect::new(
                    corner.x,
                    corner.y - shaped.size.y - 2.0 * padding.y,
                    corner.x + shaped.size.x + 2.0 * padding.x,
                    corner.y,
                );
                let mut ctx = self.take_ctx(scratch);
                ctx.set_transform(vello_cpu::kurbo::Affine::scale(scale));
                ctx.set_paint(rgba_to_color(*fill));
                let mut path = vello_cpu::kurbo::BezPath::new();
                let rr = kurbo::RoundedRect::from_rect(pill, *radius);
                for el in rr.path_elements(0.1) {
                    path.push(el);
                }
                ctx.fill_path(&path);
                draw_text(
                    &mut ctx,
                    scale,
                    Point::new(pill.x0 + padding.x, pill.y0 + padding.y),
                    &shaped,
                );
                self.finish(ctx, scratch);
                Ok(true)
            }
        }
    }

    fn take_ctx(&mut self, scratch: &vello_cpu::Pixmap) -> vello_cpu::RenderContext {
        let (w, h) = (scratch.width(), scratch.height());
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx
    }

    fn finish(&mut self, mut ctx: vello_cpu::RenderContext, scratch: &mut vello_cpu::Pixmap) {
        ctx.flush();
        ctx.render_to_pixmap(scratch);
        self.ctx = Some(ctx);
    }

    fn shape(
        &mut self,
        run: &TextRun,
        max_width: Option<f64>,
        scale: f64,
    ) -> PortadaResult<Option<ShapedText>> {
        if run.text.is_empty() || run.size_px <= 0.0 {
            return Ok(None);
        }
        let Some(face) = self.fonts.face(run.face) else {
            return Ok(None);
        };
        let shape = TextShape {
            size_px: (run.size_px * scale) as f32,
            weight: run.weight as f32,
            italic: run.face == FaceStyle::Italic,
            max_width_px: max_width.map(|w| (w * scale).max(1.0) as f32),
            brush: TextBrushRgba8 {
                r: run.color.r,
                g: run.color.g,
                b: run.color.b,
                a: run.color.alpha_u8(),
            },
        };
        let layout = self
            .text
            .layout(&run.text, face, self.fonts.emoji(), shape)?;
        let size = Vec2::new(
            f64::from(layout.width()) / scale,
            f64::from(layout.height()) / scale,
        );

        // Runs falling back to another face carry glyph ids of that face.
        let mut fonts: Vec<(RunFontKey, vello_cpu::peniko::FontData)> = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let font = glyph_run.run().font();
                let key = (font.data.id(), font.index);
                if fonts.iter().any(|(k, _)| *k == key) {
                    continue;
                }
                let data = self
                    .run_fonts
                    .entry(key)
                    .or_insert_with(|| {
                        vello_cpu::peniko::FontData::new(
                            vello_cpu::peniko::Blob::from(font.data.data().to_vec()),
                            font.index,
                        )
                    })
                    .clone();
                fonts.push((key, data));
            }
        }
        Ok(Some(ShapedText {
            layout,
            fonts,
            size,
        }))
    }

    fn image_paint(
        &mut self,
        image: &EncodedImage,
        target: Option<(u32, u32)>,
    ) -> PortadaResult<ImagePaint> {
        let key = ImageKey {
            hash: image.content_hash(),
            target,
        };
        if let Some(p) = self.images.get(&key) {
            return Ok(p.clone());
        }
        let prepared = decode_image(image, target)?;
        let pixmap =
            pixmap_from_premul_bytes(&prepared.rgba8_premul, prepared.width, prepared.height)?;
        let paint = ImagePaint {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            w: prepared.width,
            h: prepared.height,
        };
        if self.images.len() >= IMAGE_CACHE_LIMIT {
            self.images.clear();
        }
        self.images.insert(key, paint.clone());
        Ok(paint)
    }

    fn place_image(
        &mut self,
        image: &EncodedImage,
        frame: Rect,
        fit: ImageFit,
        scale: f64,
    ) -> PortadaResult<PlacedImage> {
        let (fw, fh) = (frame.width(), frame.height());
        if fw <= 0.0 || fh <= 0.0 {
            return Err(PortadaError::render("image frame is empty"));
        }

        // Vector payloads are rasterized at the size they are drawn at.
        let (paint, iw, ih) = if image.is_svg() {
            let (iw, ih) = image
                .dimensions()
                .map_or((fw, fh), |(w, h)| (f64::from(w), f64::from(h)));
            let s = fit_scale(fit, fw, fh, iw, ih);
            let target = (
                (iw * s * scale).ceil().max(1.0) as u32,
                (ih * s * scale).ceil().max(1.0) as u32,
            );
            (self.image_paint(image, Some(target))?, iw, ih)
        } else {
            let p = self.image_paint(image, None)?;
            let (iw, ih) = (f64::from(p.w), f64::from(p.h));
            (p, iw, ih)
        };

        let s = fit_scale(fit, fw, fh, iw, ih);
        let (dw, dh) = (iw * s, ih * s);
        let ox = frame.x0 + (fw - dw) / 2.0;
        let oy = frame.y0 + (fh - dh) / 2.0;
        let (sx, sy) = (dw / f64::from(paint.w), dh / f64::from(paint.h));

        // Visible part of the drawn image, in paint pixels.
        let clip = Rect::new(
            frame.x0.max(ox),
            frame.y0.max(oy),
            frame.x1.min(ox + dw),
            frame.y1.min(oy + dh),
        );
        let visible = vello_cpu::kurbo::Rect::new(
            (clip.x0 - ox) / sx,
            (clip.y0 - oy) / sy,
            (clip.x1 - ox) / sx,
            (clip.y1 - oy) / sy,
        );
        Ok(PlacedImage {
            paint,
            to_logical: vello_cpu::kurbo::Affine::translate((ox, oy))
                * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy),
            visible,
        })
    }
}

fn fit_scale(fit: ImageFit, fw: f64, fh: f64, iw: f64, ih: f64) -> f64 {
    let (sx, sy) = (fw / iw.max(1e-9), fh / ih.max(1e-9));
    match fit {
        ImageFit::Cover => sx.max(sy),
        ImageFit::Contain => sx.min(sy),
    }
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, scale: f64, rect: Rect, color: Rgba) {
    ctx.set_transform(vello_cpu::kurbo::Affine::scale(scale));
    ctx.set_paint(rgba_to_color(color));
    ctx.fill_rect(&rect_to_cpu(rect));
}

fn draw_image(ctx: &mut vello_cpu::RenderContext, scale: f64, placed: PlacedImage) {
    ctx.set_transform(vello_cpu::kurbo::Affine::scale(scale) * placed.to_logical);
    ctx.set_paint(placed.paint.paint);
    ctx.fill_rect(&placed.visible);
}

fn draw_text(ctx: &mut vello_cpu::RenderContext, scale: f64, origin: Point, t: &ShapedText) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((
        origin.x * scale,
        origin.y * scale,
    )));
    for line in t.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let font = run.run().font();
            let key = (font.data.id(), font.index);
            let Some((_, font)) = t.fonts.iter().find(|(k, _)| *k == key) else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn rgba_to_color(c: Rgba) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.alpha_u8())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PortadaResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PortadaError::decode("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PortadaError::decode("image height exceeds u16"))?;
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(PortadaError::decode("image byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
