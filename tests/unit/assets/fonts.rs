use super::*;

#[test]
fn empty_set_has_no_faces() {
    let set = FontSet::empty();
    assert!(set.is_empty());
    assert!(set.face(FaceStyle::Bold).is_none());
}

#[test]
fn missing_files_without_system_fallback_degrade_to_empty() {
    let sources = FontSources {
        regular: Some(PathBuf::from("target/definitely/missing.ttf")),
        bold: None,
        italic: None,
        emoji: Some(PathBuf::from("target/definitely/missing_emoji.ttf")),
        system_fallback: false,
    };
    let set = FontSet::load(&sources);
    assert!(set.is_empty());
    assert!(set.emoji().is_none());
}

#[test]
fn face_lookup_falls_back_to_regular() {
    let regular = FontFace::from_bytes(vec![1, 2, 3], 0);
    let set = FontSet::from_faces(Some(regular), None, None);
    let bold = set.face(FaceStyle::Bold).unwrap();
    assert_eq!(bold.bytes(), &[1, 2, 3]);
    let italic = set.face(FaceStyle::Italic).unwrap();
    assert_eq!(italic.bytes(), &[1, 2, 3]);
}

#[test]
fn font_sources_default_enables_system_fallback() {
    let s: FontSources = serde_json::from_str("{}").unwrap();
    assert!(s.system_fallback);
    assert_eq!(s, FontSources::default());
}

#[test]
fn layout_rejects_invalid_size() {
    let mut engine = TextLayoutEngine::new();
    let face = FontFace::from_bytes(vec![0; 4], 0);
    let shape = TextShape {
        size_px: 0.0,
        weight: 400.0,
        italic: false,
        max_width_px: None,
        brush: TextBrushRgba8::default(),
    };
    assert!(engine.layout("x", &face, None, shape).is_err());
}

#[test]
fn emoji_face_alone_does_not_count_as_text() {
    let set = FontSet::empty().with_emoji(FontFace::from_bytes(vec![9, 9], 0));
    assert!(set.is_empty());
    assert!(set.face(FaceStyle::Regular).is_none());
    assert_eq!(set.emoji().unwrap().bytes(), &[9, 9]);
}

#[test]
fn missing_glyphs_are_shaped_with_the_emoji_face() {
    let set = FontSet::load(&FontSources::default());
    let (Some(face), Some(emoji)) = (set.face(FaceStyle::Regular), set.emoji()) else {
        eprintln!("skipping: no system text or emoji face installed");
        return;
    };
    let shape = TextShape {
        size_px: 20.0,
        weight: 400.0,
        italic: false,
        max_width_px: None,
        brush: TextBrushRgba8::default(),
    };
    let mut engine = TextLayoutEngine::new();
    let layout = engine.layout("WEB 💻", face, Some(emoji), shape).unwrap();

    let mut blobs = Vec::new();
    for line in layout.lines() {
        for item in line.items() {
            if let parley::layout::PositionedLayoutItem::GlyphRun(run) = item {
                let id = run.run().font().data.id();
                if !blobs.contains(&id) {
                    blobs.push(id);
                }
            }
        }
    }
    assert!(blobs.len() >= 2, "emoji was not shaped with a second face");
}
