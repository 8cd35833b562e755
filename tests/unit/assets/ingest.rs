use std::io::Cursor;
use std::path::PathBuf;

use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_ingest").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn ingest_file_accepts_png() {
    let dir = scratch_dir("png");
    let path = dir.join("face.png");
    let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([1, 2, 3, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(&path, &buf).unwrap();

    let enc = ingest_file(&path).unwrap();
    assert_eq!(enc.mime(), "image/png");
    assert_eq!(enc.dimensions(), Some((4, 2)));
    assert_eq!(enc.bytes(), buf.as_slice());
}

#[test]
fn ingest_file_missing_path_errors() {
    let dir = scratch_dir("missing");
    assert!(ingest_file(dir.join("nope.png")).is_err());
}

#[test]
fn ingest_bytes_rejects_empty_and_truncated() {
    assert!(ingest_bytes(Vec::new()).is_err());
    assert!(ingest_bytes(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]).is_err());
    assert!(ingest_bytes(b"<svg".to_vec()).is_err());
}
