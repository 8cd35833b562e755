use super::*;
use crate::{
    assets::encoded::EncodedImage,
    cover::{state::ToneKey, theme::ThemeKey},
};

fn png(w: u32, h: u32) -> EncodedImage {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 100, 50, 255]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    EncodedImage::new("image/png", bytes)
}

fn spark_alphas(stack: &LayerStack) -> Vec<[f64; 2]> {
    let layer = stack.get(LayerKind::SparkOverlay).expect("spark layer");
    let LayerContent::RadialGradients { gradients, .. } = &layer.content else {
        panic!("spark layer is not radial gradients");
    };
    gradients
        .iter()
        .map(|g| [g.stops[0].color.a, g.stops[1].color.a])
        .collect()
}

#[test]
fn compose_is_idempotent() {
    let mut state = CoverState::default();
    state.entrepreneur_image = Some(png(4, 4));
    let cfg = ComposerConfig::default();
    let a = compose(&state, &cfg);
    let b = compose(&state, &cfg);
    assert_eq!(a, b);
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn all_slots_empty_yields_full_stack_with_placeholder() {
    let stack = compose(&CoverState::default(), &ComposerConfig::default());
    assert_eq!(
        stack.kinds(),
        vec![
            LayerKind::BackgroundFill,
            LayerKind::BackgroundPlaceholder,
            LayerKind::ToneOverlay,
            LayerKind::SparkOverlay,
            LayerKind::Headline,
            LayerKind::Subhead,
            LayerKind::LogoSignature,
            LayerKind::BusinessTag,
        ]
    );
    let placeholder = stack.get(LayerKind::BackgroundPlaceholder).unwrap();
    let LayerContent::Placeholder { prompt, color, .. } = &placeholder.content else {
        panic!("placeholder content");
    };
    assert_eq!(prompt.text, PLACEHOLDER_PROMPT);
    assert_eq!(*color, Rgba::rgb(0x26, 0x26, 0x26));
}

#[test]
fn images_fill_their_layers_in_fixed_order() {
    let mut state = CoverState::default();
    state.entrepreneur_image = Some(png(8, 8));
    state.criss_face_image = Some(png(100, 200));
    state.logo_image = Some(png(10, 10));
    let stack = compose(&state, &ComposerConfig::default());
    assert_eq!(
        stack.kinds(),
        vec![
            LayerKind::BackgroundFill,
            LayerKind::BackgroundPhoto,
            LayerKind::ToneOverlay,
            LayerKind::SparkOverlay,
            LayerKind::Headline,
            LayerKind::Subhead,
            LayerKind::Portrait,
            LayerKind::LogoSignature,
            LayerKind::BusinessTag,
        ]
    );

    let photo = stack.get(LayerKind::BackgroundPhoto).unwrap();
    assert_eq!(photo.opacity, 0.8);

    let portrait = stack.get(LayerKind::Portrait).unwrap();
    let LayerContent::Image { frame, fit, .. } = &portrait.content else {
        panic!("portrait content");
    };
    assert_eq!(*fit, ImageFit::Contain);
    assert_eq!(frame.x0, 0.0);
    assert_eq!(frame.y1, 480.0);
    assert!((frame.width() - 189.0).abs() < 1e-9);
    assert!((frame.height() - 378.0).abs() < 1e-9);

    let sig = stack.get(LayerKind::LogoSignature).unwrap();
    let LayerContent::Signature { logo, corner, .. } = &sig.content else {
        panic!("signature content");
    };
    assert_eq!(logo.as_ref().unwrap().size_px, 40.0);
    assert_eq!(*corner, Point::new(258.0, 468.0));
}

#[test]
fn zero_spark_means_no_layer() {
    let mut state = CoverState::default();
    state.spark_intensity_pct = 0;
    let stack = compose(&state, &ComposerConfig::default());
    assert!(!stack.contains(LayerKind::SparkOverlay));
}

#[test]
fn full_spark_resolves_four_alphas() {
    let mut state = CoverState::default();
    state.spark_intensity_pct = 100;
    let stack = compose(&state, &ComposerConfig::default());
    assert_eq!(
        spark_alphas(&stack),
        vec![[100.0 / 150.0, 100.0 / 200.0], [100.0 / 180.0, 100.0 / 300.0]]
    );

    let LayerContent::RadialGradients { gradients, .. } =
        &stack.get(LayerKind::SparkOverlay).unwrap().content
    else {
        panic!("spark content");
    };
    let c = gradients[0].center;
    assert!((c.x - 189.0).abs() < 1e-9 && (c.y - 336.0).abs() < 1e-9);
    // Farthest corner from (189, 336) is (0, 0).
    assert!((gradients[0].radius - 189f64.hypot(336.0)).abs() < 1e-9);
    assert_eq!(gradients[0].stops[2].offset, 0.4);
    assert_eq!(gradients[0].stops[2].color.a, 0.0);
}

#[test]
fn tone_gradient_runs_corner_to_corner_diagonal() {
    let mut state = CoverState::default();
    state.tone_key = ToneKey::Cool;
    let stack = compose(&state, &ComposerConfig::default());
    let LayerContent::LinearGradient(g) = &stack.get(LayerKind::ToneOverlay).unwrap().content
    else {
        panic!("tone content");
    };
    let t = |p: Point| {
        let d = g.end - g.start;
        (p - g.start).dot(d) / d.hypot2()
    };
    assert!(t(Point::new(0.0, 0.0)).abs() < 1e-9);
    assert!((t(Point::new(270.0, 480.0)) - 1.0).abs() < 1e-9);
    assert!((t(Point::new(270.0, 0.0)) - 0.5).abs() < 1e-9);
    assert_eq!(g.stops[0].color.a, 0.15);
    assert_eq!((g.stops[0].color.r, g.stops[0].color.g), (0x38, 0xBD));
}

#[test]
fn text_is_uppercased_and_sized_from_state() {
    let mut state = CoverState::default();
    state.apply_theme(ThemeKey::Historia);
    state.title_size_px = 26;
    state.subtitle_size_px = 11;
    let stack = compose(&state, &ComposerConfig::default());

    let LayerContent::Text { run, anchor, max_width } =
        &stack.get(LayerKind::Headline).unwrap().content
    else {
        panic!("headline content");
    };
    assert_eq!(run.text, "DE SHUSHUFINDI PARA EL MUNDO 🌎");
    assert_eq!(run.size_px, 26.0);
    assert_eq!(run.color, Rgba::rgb(0xFD, 0xE0, 0x47));
    assert_eq!(*anchor, TextAnchor::TopLeft(Point::new(12.0, 12.0)));
    assert_eq!(*max_width, Some(246.0));

    let LayerContent::Text { run, anchor, .. } = &stack.get(LayerKind::Subhead).unwrap().content
    else {
        panic!("subhead content");
    };
    assert_eq!(run.text, "UN ECUATORIANO QUE NO SE RINDE");
    assert_eq!(run.size_px, 11.0);
    assert!(matches!(
        anchor,
        TextAnchor::Below {
            of: LayerKind::Headline,
            ..
        }
    ));
}

#[test]
fn tag_text_and_contrast() {
    let mut state = CoverState::default();
    state.contrast_pct = 130;
    let stack = compose(&state, &ComposerConfig::default());
    assert_eq!(stack.contrast, 1.3);
    assert_eq!(stack.business_name, "Cerrajería Totti");
    let LayerContent::Tag { run, corner, .. } = &stack.get(LayerKind::BusinessTag).unwrap().content
    else {
        panic!("tag content");
    };
    assert_eq!(run.text, "Cerrajería Totti • Shushufindi");
    assert_eq!(run.size_px, 12.0);
    assert_eq!(*corner, Point::new(12.0, 468.0));
}

#[test]
fn overlong_and_empty_text_still_composes() {
    let mut state = CoverState::default();
    state.headline = "A".repeat(5_000);
    state.subhead.clear();
    state.business_name.clear();
    let stack = compose(&state, &ComposerConfig::default());
    assert!(stack.contains(LayerKind::Headline));
    assert!(stack.contains(LayerKind::Subhead));
}
