use super::*;
use crate::{
    assets::fonts::FontSources,
    cover::{
        compose::compose,
        config::ComposerConfig,
        state::{CoverState, ToneKey},
    },
};

fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> EncodedImage {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    EncodedImage::new("image/png", bytes)
}

fn plain_state() -> CoverState {
    CoverState {
        contrast_pct: 100,
        spark_intensity_pct: 0,
        tone_key: ToneKey::Neutral,
        ..CoverState::default()
    }
}

fn render(state: &CoverState, scale: f64) -> FrameRGBA {
    let stack = compose(state, &ComposerConfig::default());
    CpuRasterizer::new(FontSet::empty())
        .render(&stack, scale)
        .unwrap()
}

#[test]
fn output_size_follows_scale_and_corners_are_clear() {
    let frame = render(&CoverState::default(), 2.0);
    assert_eq!((frame.width, frame.height), (540, 960));
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(frame.pixel(539, 959).unwrap()[3], 0);
    assert_eq!(frame.pixel(270, 480).unwrap()[3], 255);

    let frame = render(&CoverState::default(), 1.0);
    assert_eq!((frame.width, frame.height), (270, 480));
}

#[test]
fn placeholder_fills_background_without_photo() {
    let frame = render(&plain_state(), 1.0);
    let px = frame.pixel(135, 300).unwrap();
    assert_eq!(px[3], 255);
    for c in &px[..3] {
        assert!((i32::from(*c) - 0x26).abs() <= 3, "{px:?}");
    }
}

#[test]
fn background_photo_is_painted_at_eighty_percent() {
    let mut state = plain_state();
    state.entrepreneur_image = Some(solid_png(16, 9, [255, 0, 0, 255]));
    let px = render(&state, 1.0).pixel(135, 240).unwrap();
    assert!((200..=208).contains(&px[0]), "{px:?}");
    assert!(px[1] <= 4 && px[2] <= 4, "{px:?}");
    assert_eq!(px[3], 255);
}

#[test]
fn contrast_is_applied_to_the_flattened_frame() {
    let mut state = plain_state();
    state.entrepreneur_image = Some(solid_png(4, 4, [255, 0, 0, 255]));
    state.contrast_pct = 200;
    let px = render(&state, 1.0).pixel(135, 240).unwrap();
    assert_eq!(px[0], 255);
    assert_eq!(px[1], 0);
}

#[test]
fn spark_brightens_its_focal_area() {
    let mut state = plain_state();
    let dark = render(&state, 1.0).pixel(189, 336).unwrap();
    state.spark_intensity_pct = 100;
    let lit = render(&state, 1.0).pixel(189, 336).unwrap();
    assert!(lit[0] > dark[0] + 40, "{dark:?} -> {lit:?}");
    assert!(lit[0] > lit[2]);
}

#[test]
fn portrait_is_anchored_bottom_left() {
    let mut state = plain_state();
    state.criss_face_image = Some(solid_png(10, 20, [0, 0, 255, 255]));
    let frame = render(&state, 1.0);
    let inside = frame.pixel(90, 400).unwrap();
    assert!(inside[2] > 240 && inside[0] < 10, "{inside:?}");
    let outside = frame.pixel(250, 200).unwrap();
    assert!(outside[2] < 100, "{outside:?}");
}

#[test]
fn svg_logo_is_rasterized_next_to_the_corner() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#00ff00"/></svg>"##;
    let mut state = plain_state();
    state.logo_image = Some(EncodedImage::sniff(svg.to_vec()).unwrap());
    let frame = render(&state, 2.0);
    // No fonts: the 40px logo square sits flush with the bottom-right margin.
    let px = frame.pixel(2 * 238, 2 * 448).unwrap();
    assert!(px[1] > 240 && px[0] < 10, "{px:?}");
}

#[test]
fn undecodable_image_skips_only_its_layer() {
    let mut state = plain_state();
    state.entrepreneur_image = Some(EncodedImage::new("image/png", vec![1, 2, 3]));
    let frame = render(&state, 1.0);
    assert_eq!(frame.pixel(135, 240).unwrap(), [0, 0, 0, 255]);
}

fn system_fonts() -> Option<FontSet> {
    let set = FontSet::load(&FontSources::default());
    if set.is_empty() {
        eprintln!("skipping: no system fonts installed");
        return None;
    }
    Some(set)
}

fn block_size(cpu: &mut CpuRasterizer, run: &TextRun, max_width: Option<f64>) -> Vec2 {
    cpu.shape(run, max_width, 1.0).unwrap().unwrap().size
}

/// Bounding box `(x0, y0, x1, y1)` of pixels matching `pred` inside `area`.
fn bounds(
    frame: &FrameRGBA,
    area: Rect,
    pred: impl Fn([u8; 4]) -> bool,
) -> Option<(u32, u32, u32, u32)> {
    let mut found: Option<(u32, u32, u32, u32)> = None;
    for y in area.y0.max(0.0) as u32..(area.y1 as u32).min(frame.height) {
        for x in area.x0.max(0.0) as u32..(area.x1 as u32).min(frame.width) {
            if !pred(frame.pixel(x, y).unwrap()) {
                continue;
            }
            found = Some(match found {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }
    found
}

fn is_accent(px: [u8; 4]) -> bool {
    px[0] > 150 && px[1] > 120 && u16::from(px[2]) * 2 < u16::from(px[0])
}

fn is_white(px: [u8; 4]) -> bool {
    px[0] > 200 && px[1] > 200 && px[2] > 200
}

#[test]
fn text_blocks_land_where_their_anchors_put_them() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let mut state = plain_state();
    state.headline = "LE REGALAMOS SU PROPIA WEB".to_string();
    let stack = compose(&state, &ComposerConfig::default());
    let mut cpu = CpuRasterizer::new(fonts);

    let LayerContent::Text { run, max_width, .. } =
        &stack.get(LayerKind::Headline).unwrap().content
    else {
        panic!("headline is not a text layer");
    };
    let headline = block_size(&mut cpu, run, *max_width);
    let title_px = run.size_px;
    let LayerContent::Text { run, max_width, .. } =
        &stack.get(LayerKind::Subhead).unwrap().content
    else {
        panic!("subhead is not a text layer");
    };
    let subhead = block_size(&mut cpu, run, *max_width);

    let frame = cpu.render(&stack, 1.0).unwrap();
    let full = Rect::new(0.0, 0.0, 270.0, 480.0);

    let (x0, y0, x1, y1) = bounds(&frame, full, is_accent).expect("headline not painted");
    let headline_bottom = 12.0 + headline.y;
    assert!(y0 >= 11, "headline starts above its block: y0={y0}");
    assert!(
        f64::from(y1) <= headline_bottom + 1.0,
        "y1={y1} block={headline:?}"
    );
    assert!(x0 >= 11 && x1 <= 259, "x0={x0} x1={x1}");
    assert!(
        f64::from(x1 - x0) > 2.0 * title_px,
        "glyphs piled up: {x0}..{x1}"
    );

    let top = Rect::new(12.0, 0.0, 258.0, 200.0);
    let (_, sy0, _, sy1) = bounds(&frame, top, is_white).expect("subhead not painted");
    assert!(
        f64::from(sy0) >= headline_bottom - 1.0,
        "subhead at {sy0}, headline ends {headline_bottom}"
    );
    assert!(f64::from(sy1) <= headline_bottom + 4.0 + subhead.y + 1.0);
}

#[test]
fn tag_text_sits_inside_its_pill() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let stack = compose(&plain_state(), &ComposerConfig::default());
    let mut cpu = CpuRasterizer::new(fonts);
    let LayerContent::Tag {
        corner,
        padding,
        run,
        ..
    } = &stack.get(LayerKind::BusinessTag).unwrap().content
    else {
        panic!("business tag is not a tag layer");
    };
    let text = block_size(&mut cpu, run, None);
    let pill = Rect::new(
        corner.x,
        corner.y - text.y - 2.0 * padding.y,
        corner.x + text.x + 2.0 * padding.x,
        corner.y,
    );
    let frame = cpu.render(&stack, 1.0).unwrap();

    // Light pill edge above the text line.
    let edge = frame
        .pixel(pill.center().x as u32, (pill.y0 + 2.0) as u32)
        .unwrap();
    assert!(edge[0] > 180, "pill not painted: {edge:?}");

    let inner = Rect::new(
        pill.x0 + padding.x - 1.0,
        pill.y0 + padding.y - 1.0,
        pill.x1 - padding.x + 1.0,
        pill.y1 - padding.y + 1.0,
    );
    let (x0, _, x1, _) =
        bounds(&frame, inner, |px| px[0] < 100).expect("tag text not inside its pill");
    assert!(
        f64::from(x1 - x0) > text.x / 2.0,
        "tag glyphs piled up: {x0}..{x1}"
    );
}

#[test]
fn signature_is_right_aligned_at_the_bottom_margin() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let mut state = plain_state();
    state.business_name = "Totti".to_string();
    state.city = "Quito".to_string();
    let frame = CpuRasterizer::new(fonts)
        .render(&compose(&state, &ComposerConfig::default()), 1.0)
        .unwrap();
    // Right of the (short) business tag pill.
    let corner = Rect::new(215.0, 400.0, 270.0, 480.0);
    let (_, _, x1, y1) = bounds(&frame, corner, is_white).expect("signature not painted");
    assert!(x1 <= 259 && x1 >= 240, "x1={x1}");
    assert!(y1 <= 469, "y1={y1}");
}
