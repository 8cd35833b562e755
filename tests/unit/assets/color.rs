use super::*;
use serde_json::json;

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: ColorDef = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, ColorDef::rgba(1.0, 0.0, 0.0, 1.0));

    let c: ColorDef = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);
}

#[test]
fn parses_rgba_object_and_array() {
    let c: ColorDef = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, ColorDef::rgba(0.25, 0.5, 0.75, 1.0));

    let c: ColorDef = serde_json::from_value(json!([0.25, 0.5, 0.75, 0.9])).unwrap();
    assert_eq!(c, ColorDef::rgba(0.25, 0.5, 0.75, 0.9));

    assert!(serde_json::from_value::<ColorDef>(json!([0.1, 0.2])).is_err());
}

#[test]
fn rejects_malformed_hex() {
    assert!(parse_hex("#12345").is_err());
    assert!(parse_hex("#zzzzzz").is_err());
    assert!(parse_hex("#ééé").is_err());
}

#[test]
fn serializes_back_to_hex() {
    let c: ColorDef = serde_json::from_value(json!("#FDE047")).unwrap();
    assert_eq!(serde_json::to_value(c).unwrap(), json!("#FDE047FF"));
    let rgba = c.to_rgba();
    assert_eq!((rgba.r, rgba.g, rgba.b), (0xFD, 0xE0, 0x47));
    assert_eq!(ColorDef::from(rgba).to_rgba(), rgba);
}
