use super::*;

fn tiny_png() -> EncodedImage {
    let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    EncodedImage::new("image/png", bytes)
}

#[test]
fn defaults_match_the_stock_cover() {
    let s = CoverState::default();
    assert_eq!(s.business_name, "Cerrajería Totti");
    assert_eq!(s.city, "Shushufindi");
    assert_eq!(s.signature, "Criss Lombeida");
    assert_eq!(s.tone_key, ToneKey::Warm);
    assert_eq!(s.contrast_pct, 95);
    assert_eq!(s.spark_intensity_pct, 80);
    assert_eq!(s.theme, ThemeKey::Regalo);
    assert_eq!(s.duration_class, DurationClass::Short);
    assert!(ImageSlot::ALL.iter().all(|slot| s.image(*slot).is_none()));
}

#[test]
fn apply_theme_overwrites_only_headline_subhead_and_theme() {
    let mut s = CoverState::default();
    s.business_name = "Taller X".to_string();
    s.city = "Quito".to_string();
    s.signature = "Firma".to_string();
    s.apply_theme(ThemeKey::Historia);

    assert_eq!(s.theme, ThemeKey::Historia);
    assert_eq!(s.headline, "DE SHUSHUFINDI PARA EL MUNDO 🌎");
    assert_eq!(s.subhead, "Un ecuatoriano que no se rinde");
    assert_eq!(s.business_name, "Taller X");
    assert_eq!(s.city, "Quito");
    assert_eq!(s.signature, "Firma");

    s.headline = "editado".to_string();
    assert_eq!(s.theme, ThemeKey::Historia);
}

#[test]
fn unknown_tone_deserializes_to_warm() {
    let s: CoverState = serde_json::from_str(r#"{"toneKey":"purple"}"#).unwrap();
    assert_eq!(s.tone_key, ToneKey::Warm);
    let s: CoverState = serde_json::from_str(r#"{"toneKey":"cool"}"#).unwrap();
    assert_eq!(s.tone_key, ToneKey::Cool);
    assert_eq!("NEUTRAL".parse::<ToneKey>().unwrap(), ToneKey::Neutral);
}

#[test]
fn duration_class_accepts_seconds_and_names() {
    assert_eq!("45".parse::<DurationClass>().unwrap(), DurationClass::Short);
    assert_eq!(
        "extended".parse::<DurationClass>().unwrap(),
        DurationClass::Extended
    );
    assert!("60".parse::<DurationClass>().is_err());
    let s: CoverState = serde_json::from_str(r#"{"durationClass":"120"}"#).unwrap();
    assert_eq!(s.duration_class, DurationClass::Extended);
    assert_eq!(DurationClass::Extended.total_seconds(), 120);
}

#[test]
fn partial_document_keeps_defaults() {
    let s = CoverState::from_reader(r#"{"businessName":"Taller X","contrastPct":130}"#.as_bytes())
        .unwrap();
    assert_eq!(s.business_name, "Taller X");
    assert_eq!(s.contrast_pct, 130);
    assert_eq!(s.city, "Shushufindi");
}

#[test]
fn image_slots_round_trip_through_json() {
    let mut s = CoverState::default();
    s.set_image(ImageSlot::Logo, Some(tiny_png()));
    let json = serde_json::to_string(&s).unwrap();
    assert!(json.contains("\"logoImage\":\"data:image/png;base64,"));
    let back = CoverState::from_reader(json.as_bytes()).unwrap();
    assert_eq!(back, s);
    assert_eq!(
        back.image(ImageSlot::Logo).unwrap().dimensions(),
        Some((2, 3))
    );
}

#[test]
fn slot_names_parse() {
    assert_eq!("face".parse::<ImageSlot>().unwrap(), ImageSlot::CrissFace);
    assert_eq!("Logo".parse::<ImageSlot>().unwrap(), ImageSlot::Logo);
    assert_eq!(
        "background".parse::<ImageSlot>().unwrap(),
        ImageSlot::Entrepreneur
    );
    assert!("banner".parse::<ImageSlot>().is_err());
}

#[test]
fn malformed_document_is_a_serde_error() {
    let err = CoverState::from_reader("{".as_bytes()).unwrap_err();
    assert!(err.to_string().starts_with("serialization error:"));
}
