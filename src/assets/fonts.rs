use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::{
    error::{PortadaError, PortadaResult},
    math::Fnv1a64,
};

/// Where to find the fonts used by text layers.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontSources {
    /// Regular face (signature, business tag, placeholder prompt).
    pub regular: Option<PathBuf>,
    /// Heavy face for headline/subhead; falls back to `regular`.
    pub bold: Option<PathBuf>,
    /// Italic face for the signature; falls back to `regular`.
    pub italic: Option<PathBuf>,
    /// Emoji face used for glyphs the text faces lack.
    pub emoji: Option<PathBuf>,
    /// Query installed system fonts for faces not given explicitly.
    pub system_fallback: bool,
}

impl Default for FontSources {
    fn default() -> Self {
        Self {
            regular: None,
            bold: None,
            italic: None,
            emoji: None,
            system_fallback: true,
        }
    }
}

/// Which face of a [`FontSet`] a text layer asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceStyle {
    /// Upright, normal weight.
    Regular,
    /// Upright, heavy weight.
    Bold,
    /// Italic.
    Italic,
}

/// Font bytes (one face of a TTF/OTF/TTC file) registered with the text layout engine.
#[derive(Clone)]
pub struct FontFace {
    bytes: Arc<Vec<u8>>,
    index: u32,
    hash: u64,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("len", &self.bytes.len())
            .field("index", &self.index)
            .field("hash", &self.hash)
            .finish()
    }
}

impl FontFace {
    /// Wrap raw font bytes (TTF/OTF, or a TTC with face `index`).
    pub fn from_bytes(bytes: Vec<u8>, index: u32) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(&bytes);
        h.write_u64(u64::from(index));
        Self {
            bytes: Arc::new(bytes),
            index,
            hash: h.finish(),
        }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// The resolved faces available for text rendering.
///
/// Loading never fails: missing faces degrade to "text layers are skipped", which keeps
/// rasterization total on machines without fonts.
#[derive(Clone, Debug, Default)]
pub struct FontSet {
    regular: Option<FontFace>,
    bold: Option<FontFace>,
    italic: Option<FontFace>,
    emoji: Option<FontFace>,
}

impl FontSet {
    /// A font set with no faces; every text layer is skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from explicit faces.
    pub fn from_faces(
        regular: Option<FontFace>,
        bold: Option<FontFace>,
        italic: Option<FontFace>,
    ) -> Self {
        Self {
            regular,
            bold,
            italic,
            emoji: None,
        }
    }

    /// Use `face` for glyphs missing from the text faces.
    pub fn with_emoji(mut self, face: FontFace) -> Self {
        self.emoji = Some(face);
        self
    }

    /// Resolve configured font files, then system fonts for anything still missing.
    #[tracing::instrument(skip_all)]
    pub fn load(sources: &FontSources) -> Self {
        let mut set = Self {
            regular: sources.regular.as_deref().and_then(read_face),
            bold: sources.bold.as_deref().and_then(read_face),
            italic: sources.italic.as_deref().and_then(read_face),
            emoji: sources.emoji.as_deref().and_then(read_face),
        };

        let missing = set.regular.is_none()
            || set.bold.is_none()
            || set.italic.is_none()
            || set.emoji.is_none();
        if missing && sources.system_fallback {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            if set.regular.is_none() {
                set.regular = system_face(&db, 400, usvg::fontdb::Style::Normal);
            }
            if set.bold.is_none() {
                set.bold = system_face(&db, 800, usvg::fontdb::Style::Normal);
            }
            if set.italic.is_none() {
                set.italic = system_face(&db, 600, usvg::fontdb::Style::Italic);
            }
            if set.emoji.is_none() {
                set.emoji = system_emoji_face(&db);
            }
        }

        if set.is_empty() {
            tracing::warn!("no usable fonts found; text layers will not be painted");
        }
        set
    }

    /// Emoji fallback face, if one was found.
    pub fn emoji(&self) -> Option<&FontFace> {
        self.emoji.as_ref()
    }

    /// `true` when no text face is available (an emoji face alone does not count).
    pub fn is_empty(&self) -> bool {
        self.regular.is_none() && self.bold.is_none() && self.italic.is_none()
    }

    /// Face for `style`, falling back to regular, then to any available face.
    pub fn face(&self, style: FaceStyle) -> Option<&FontFace> {
        let preferred = match style {
            FaceStyle::Regular => self.regular.as_ref(),
            FaceStyle::Bold => self.bold.as_ref(),
            FaceStyle::Italic => self.italic.as_ref(),
        };
        preferred
            .or(self.regular.as_ref())
            .or(self.bold.as_ref())
            .or(self.italic.as_ref())
    }
}

fn read_face(path: &Path) -> Option<FontFace> {
    match std::fs::read(path) {
        Ok(bytes) => Some(FontFace::from_bytes(bytes, 0)),
        Err(e) => {
            tracing::warn!(path = %path.display(), "font file unreadable: {e}");
            None
        }
    }
}

fn system_face(
    db: &usvg::fontdb::Database,
    weight: u16,
    style: usvg::fontdb::Style,
) -> Option<FontFace> {
    let families = [
        usvg::fontdb::Family::SansSerif,
        usvg::fontdb::Family::Name("DejaVu Sans"),
        usvg::fontdb::Family::Name("Liberation Sans"),
        usvg::fontdb::Family::Name("Noto Sans"),
    ];
    let query = usvg::fontdb::Query {
        families: &families,
        weight: usvg::fontdb::Weight(weight),
        stretch: usvg::fontdb::Stretch::Normal,
        style,
    };
    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))?;
    db.with_face_data(id, |data, index| FontFace::from_bytes(data.to_vec(), index))
}

fn system_emoji_face(db: &usvg::fontdb::Database) -> Option<FontFace> {
    let families = [
        usvg::fontdb::Family::Name("Noto Color Emoji"),
        usvg::fontdb::Family::Name("Apple Color Emoji"),
        usvg::fontdb::Family::Name("Segoe UI Emoji"),
        usvg::fontdb::Family::Name("Twemoji"),
        usvg::fontdb::Family::Name("Noto Emoji"),
    ];
    let query = usvg::fontdb::Query {
        families: &families,
        weight: usvg::fontdb::Weight::NORMAL,
        stretch: usvg::fontdb::Stretch::Normal,
        style: usvg::fontdb::Style::Normal,
    };
    let id = db.query(&query)?;
    db.with_face_data(id, |data, index| FontFace::from_bytes(data.to_vec(), index))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// Shaping parameters for one text block.
#[derive(Clone, Copy, Debug)]
pub struct TextShape {
    /// Font size in device pixels.
    pub size_px: f32,
    /// CSS-like weight (400 regular, 800 extra-bold).
    pub weight: f32,
    /// Request the italic style from the family.
    pub italic: bool,
    /// Wrap width in device pixels; `None` lays out a single line.
    pub max_width_px: Option<f32>,
    /// Glyph colour.
    pub brush: TextBrushRgba8,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<u64, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, face: &FontFace) -> PortadaResult<String> {
        if let Some(name) = self.families.get(&face.hash) {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(face.bytes().to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PortadaError::render("no font families registered from font bytes"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PortadaError::render("registered font family has no name"))?
            .to_string();
        self.families.insert(face.hash, name.clone());
        Ok(name)
    }

    /// Shape and lay out plain text with `face`, using `fallback` for glyphs `face` lacks.
    pub fn layout(
        &mut self,
        text: &str,
        face: &FontFace,
        fallback: Option<&FontFace>,
        shape: TextShape,
    ) -> PortadaResult<parley::Layout<TextBrushRgba8>> {
        if !shape.size_px.is_finite() || shape.size_px <= 0.0 {
            return Err(PortadaError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let mut stack = format!("\"{}\"", self.family_for(face)?);
        if let Some(fallback) = fallback {
            let name = self.family_for(fallback)?;
            stack.push_str(&format!(", \"{name}\""));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(stack)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(shape.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(shape.weight),
        ));
        if shape.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(shape.brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        match shape.max_width_px {
            Some(w) => {
                layout.break_all_lines(Some(w));
                layout.align(
                    Some(w),
                    parley::Alignment::Start,
                    parley::AlignmentOptions::default(),
                );
            }
            None => layout.break_all_lines(None),
        }
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
