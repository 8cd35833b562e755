use super::*;
use crate::cover::{compose::compose, config::ComposerConfig, state::CoverState};

#[test]
fn fingerprint_tracks_content_changes() {
    let cfg = ComposerConfig::default();
    let mut state = CoverState::default();
    let a = compose(&state, &cfg).fingerprint();
    state.city = "Quito".to_string();
    let b = compose(&state, &cfg).fingerprint();
    assert_ne!(a, b);
}

#[test]
fn serialized_stack_summarizes_images() {
    let img = image::RgbaImage::from_pixel(3, 5, image::Rgba([0, 0, 0, 255]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    let mut state = CoverState::default();
    state.criss_face_image = Some(EncodedImage::new("image/png", bytes));

    let stack = compose(&state, &ComposerConfig::default());
    let json = serde_json::to_value(&stack).unwrap();
    let portrait = json["layers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["kind"] == "portrait")
        .unwrap();
    assert_eq!(portrait["content"]["type"], "image");
    assert_eq!(portrait["content"]["image"]["width"], 3);
    assert_eq!(portrait["content"]["image"]["mime"], "image/png");
    assert!(!json.to_string().contains("base64"));
}

#[test]
fn lookup_helpers() {
    let stack = compose(&CoverState::default(), &ComposerConfig::default());
    assert_eq!(stack.kinds().first(), Some(&LayerKind::BackgroundFill));
    assert!(stack.contains(LayerKind::BusinessTag));
    assert!(!stack.contains(LayerKind::Portrait));
    assert_eq!(stack.get(LayerKind::BackgroundFill).unwrap().opacity, 1.0);
}
