use crate::{
    assets::fonts::FaceStyle,
    cover::{
        config::{ComposerConfig, SparkGradientDef, ToneRecipe},
        layers::{
            DropShadow, GradientStop, ImageFit, Layer, LayerContent, LayerKind, LayerStack,
            LinearGradient, LogoMark, RadialGradient, TextAnchor, TextRun,
        },
        state::CoverState,
    },
    foundation::core::{Point, Rect, Rgba, Vec2},
};

/// Inset of text blocks and the bottom groups from the canvas edges.
pub const EDGE_MARGIN: f64 = 12.0;

/// Prompt painted where the background photo goes.
pub const PLACEHOLDER_PROMPT: &str = "Sube la foto del emprendedor";

const PHOTO_OPACITY: f64 = 0.8;
const PORTRAIT_WIDTH_FRACTION: f64 = 0.7;
const SUBHEAD_GAP: f64 = 4.0;
const SIGNATURE_GAP: f64 = 8.0;
const TAG_SIZE_PX: f64 = 12.0;
const PROMPT_SIZE_PX: f64 = 14.0;

/// Resolve a cover state into its layer stack.
///
/// Total: absent images become a placeholder (background) or are omitted (portrait, logo), and
/// numeric parameters are used as given.
#[tracing::instrument(skip_all, fields(theme = %state.theme, tone = state.tone_key.as_str()))]
pub fn compose(state: &CoverState, config: &ComposerConfig) -> LayerStack {
    let full = config.canvas.rect();
    let (w, h) = (full.width(), full.height());
    let (headline_color, subhead_color) = config.text_scheme.colors();
    let text_shadow = DropShadow {
        offset: Vec2::new(0.0, 2.0),
        blur: 8.0,
        color: Rgba::BLACK.with_alpha(0.8),
    };

    let mut layers = Vec::with_capacity(9);
    layers.push(plain(
        LayerKind::BackgroundFill,
        LayerContent::Fill {
            rect: full,
            color: Rgba::BLACK,
        },
    ));

    layers.push(match &state.entrepreneur_image {
        Some(image) => Layer {
            opacity: PHOTO_OPACITY,
            ..plain(
                LayerKind::BackgroundPhoto,
                LayerContent::Image {
                    image: image.clone(),
                    frame: full,
                    fit: ImageFit::Cover,
                },
            )
        },
        None => plain(
            LayerKind::BackgroundPlaceholder,
            LayerContent::Placeholder {
                rect: full,
                color: config.placeholder_color.to_rgba(),
                prompt: TextRun {
                    text: PLACEHOLDER_PROMPT.to_string(),
                    size_px: PROMPT_SIZE_PX,
                    face: FaceStyle::Regular,
                    weight: 400.0,
                    color: Rgba::WHITE.with_alpha(0.6),
                },
            },
        ),
    });

    layers.push(plain(
        LayerKind::ToneOverlay,
        LayerContent::LinearGradient(tone_gradient(full, config.tones.recipe(state.tone_key))),
    ));

    if state.spark_intensity_pct > 0 {
        let intensity = f64::from(state.spark_intensity_pct);
        layers.push(plain(
            LayerKind::SparkOverlay,
            LayerContent::RadialGradients {
                rect: full,
                gradients: vec![
                    spark_gradient(full, &config.spark.primary, intensity),
                    spark_gradient(full, &config.spark.secondary, intensity),
                ],
            },
        ));
    }

    layers.push(Layer {
        shadow: Some(text_shadow),
        ..plain(
            LayerKind::Headline,
            LayerContent::Text {
                run: TextRun {
                    text: state.headline.to_uppercase(),
                    size_px: f64::from(state.title_size_px),
                    face: FaceStyle::Bold,
                    weight: 800.0,
                    color: headline_color,
                },
                anchor: TextAnchor::TopLeft(Point::new(EDGE_MARGIN, EDGE_MARGIN)),
                max_width: Some(w - 2.0 * EDGE_MARGIN),
            },
        )
    });

    layers.push(Layer {
        shadow: Some(text_shadow),
        ..plain(
            LayerKind::Subhead,
            LayerContent::Text {
                run: TextRun {
                    text: state.subhead.to_uppercase(),
                    size_px: f64::from(state.subtitle_size_px),
                    face: FaceStyle::Bold,
                    weight: 800.0,
                    color: subhead_color,
                },
                anchor: TextAnchor::Below {
                    of: LayerKind::Headline,
                    x: EDGE_MARGIN,
                    gap: SUBHEAD_GAP,
                },
                max_width: Some(w - 2.0 * EDGE_MARGIN),
            },
        )
    });

    if let Some(image) = &state.criss_face_image {
        let pw = w * PORTRAIT_WIDTH_FRACTION;
        let ph = pw / image.aspect_ratio();
        layers.push(Layer {
            shadow: Some(DropShadow {
                offset: Vec2::new(0.0, 10.0),
                blur: 30.0,
                color: Rgba::BLACK.with_alpha(0.6),
            }),
            ..plain(
                LayerKind::Portrait,
                LayerContent::Image {
                    image: image.clone(),
                    frame: Rect::new(0.0, h - ph, pw, h),
                    fit: ImageFit::Contain,
                },
            )
        });
    }

    layers.push(plain(
        LayerKind::LogoSignature,
        LayerContent::Signature {
            corner: Point::new(w - EDGE_MARGIN, h - EDGE_MARGIN),
            gap: SIGNATURE_GAP,
            logo: state.logo_image.as_ref().map(|image| LogoMark {
                image: image.clone(),
                size_px: f64::from(state.logo_size_px),
            }),
            run: TextRun {
                text: state.signature.clone(),
                size_px: f64::from(state.signature_size_px),
                face: FaceStyle::Italic,
                weight: 600.0,
                color: Rgba::WHITE.with_alpha(0.9),
            },
        },
    ));

    layers.push(Layer {
        shadow: Some(DropShadow {
            offset: Vec2::new(0.0, 1.0),
            blur: 3.0,
            color: Rgba::BLACK.with_alpha(0.1),
        }),
        ..plain(
            LayerKind::BusinessTag,
            LayerContent::Tag {
                corner: Point::new(EDGE_MARGIN, h - EDGE_MARGIN),
                padding: Vec2::new(8.0, 4.0),
                radius: 8.0,
                fill: Rgba::WHITE.with_alpha(0.9),
                run: TextRun {
                    text: format!("{} • {}", state.business_name, state.city),
                    size_px: TAG_SIZE_PX,
                    face: FaceStyle::Regular,
                    weight: 400.0,
                    color: Rgba::BLACK,
                },
            },
        )
    });

    tracing::debug!(layers = layers.len(), "composed layer stack");
    LayerStack {
        canvas: config.canvas,
        contrast: f64::from(state.contrast_pct) / 100.0,
        corner_radius: config.corner_radius,
        business_name: state.business_name.clone(),
        layers,
    }
}

fn plain(kind: LayerKind, content: LayerContent) -> Layer {
    Layer {
        kind,
        opacity: 1.0,
        shadow: None,
        content,
    }
}

/// "To bottom right" gradient line: `t = ½(x/w + y/h)` over `rect`.
fn tone_gradient(rect: Rect, recipe: &ToneRecipe) -> LinearGradient {
    let (w, h) = (rect.width(), rect.height());
    let c = rect.center();
    let half = Vec2::new(h, w) * (w * h / (w * w + h * h));
    LinearGradient {
        rect,
        start: c - half,
        end: c + half,
        stops: recipe
            .stops
            .iter()
            .map(|s| GradientStop {
                offset: s.offset,
                color: s.color.to_rgba(),
            })
            .collect(),
    }
}

fn spark_gradient(rect: Rect, def: &SparkGradientDef, intensity: f64) -> RadialGradient {
    let center = Point::new(
        rect.x0 + def.center[0] * rect.width(),
        rect.y0 + def.center[1] * rect.height(),
    );
    let radius = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x0, rect.y1),
        Point::new(rect.x1, rect.y1),
    ]
    .into_iter()
    .map(|corner| corner.distance(center))
    .fold(0.0, f64::max);

    let mut stops: Vec<GradientStop> = def
        .stops
        .iter()
        .map(|s| GradientStop {
            offset: s.offset,
            color: s.color.to_rgba().with_alpha(intensity / s.scale),
        })
        .collect();
    let fade = stops
        .last()
        .map(|s| s.color.with_alpha(0.0))
        .unwrap_or(Rgba::TRANSPARENT);
    stops.push(GradientStop {
        offset: def.fade_at,
        color: fade,
    });

    RadialGradient {
        center,
        radius,
        stops,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cover/compose.rs"]
mod tests;
