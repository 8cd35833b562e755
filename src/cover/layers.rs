//! Resolved, paintable layers.
//!
//! Everything here is expressed in logical canvas pixels. Geometry that depends on measured text
//! (the subhead below a wrapped headline, the logo+signature row, the tag pill) is described by
//! anchors the rasterizer resolves once glyphs are shaped.

use crate::{
    assets::{encoded::EncodedImage, fonts::FaceStyle},
    foundation::{
        core::{Canvas, Point, Rect, Rgba, Vec2},
        math::Fnv1a64,
    },
};

/// Role of a layer within the fixed back-to-front order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Constant black full-canvas fill.
    BackgroundFill,
    /// Uploaded background photo.
    BackgroundPhoto,
    /// Upload prompt standing in for a missing background photo.
    BackgroundPlaceholder,
    /// Diagonal tone gradient.
    ToneOverlay,
    /// Radial spark highlights.
    SparkOverlay,
    /// Headline text.
    Headline,
    /// Subhead text.
    Subhead,
    /// Foreground portrait cutout.
    Portrait,
    /// Logo and signature row.
    LogoSignature,
    /// Business/city pill.
    BusinessTag,
}

/// How an image is fitted into its frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFit {
    /// Fill the frame, cropping overflow.
    Cover,
    /// Fit entirely inside the frame.
    Contain,
}

/// A colour stop; `offset` is in `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct GradientStop {
    /// Stop position.
    pub offset: f64,
    /// Straight colour with exact alpha.
    pub color: Rgba,
}

/// Linear gradient between two points.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LinearGradient {
    /// Painted area.
    pub rect: Rect,
    /// Point where `t = 0`.
    pub start: Point,
    /// Point where `t = 1`.
    pub end: Point,
    /// Ascending stops.
    pub stops: Vec<GradientStop>,
}

/// Circular radial gradient.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RadialGradient {
    /// Focal point.
    pub center: Point,
    /// Radius at `t = 1`.
    pub radius: f64,
    /// Ascending stops.
    pub stops: Vec<GradientStop>,
}

/// Shaping and paint parameters of a text run.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextRun {
    /// Text exactly as painted.
    pub text: String,
    /// Font size.
    pub size_px: f64,
    /// Face requested from the font set.
    pub face: FaceStyle,
    /// CSS-like weight.
    pub weight: f64,
    /// Glyph colour.
    pub color: Rgba,
}

/// Where a text block is placed.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    /// Top-left corner of the block.
    TopLeft(Point),
    /// Left edge at `x`, top edge `gap` below the block painted by layer `of`.
    Below {
        /// Layer whose block bottom is the reference.
        of: LayerKind,
        /// Left edge.
        x: f64,
        /// Vertical gap.
        gap: f64,
    },
    /// Block centred on a point.
    Center(Point),
}

/// Logo shown in the signature row.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LogoMark {
    /// Logo payload.
    #[serde(serialize_with = "serialize_image_summary")]
    pub image: EncodedImage,
    /// Side of the square the logo is contained in.
    pub size_px: f64,
}

/// CSS-like drop shadow (`offset`, `blur` radius, colour).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct DropShadow {
    /// Shadow offset.
    pub offset: Vec2,
    /// Blur radius; the Gaussian sigma is half of it.
    pub blur: f64,
    /// Shadow colour.
    pub color: Rgba,
}

/// Paint content of a layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerContent {
    /// Solid rectangle.
    Fill {
        /// Area.
        rect: Rect,
        /// Colour.
        color: Rgba,
    },
    /// Encoded image fitted into a frame.
    Image {
        /// Payload.
        #[serde(serialize_with = "serialize_image_summary")]
        image: EncodedImage,
        /// Frame the image is fitted into (and clipped to).
        frame: Rect,
        /// Fit mode.
        fit: ImageFit,
    },
    /// Linear gradient.
    LinearGradient(LinearGradient),
    /// Radial gradients; the first entry is painted on top.
    RadialGradients {
        /// Painted area.
        rect: Rect,
        /// Gradients, topmost first.
        gradients: Vec<RadialGradient>,
    },
    /// A single text block.
    Text {
        /// Run.
        run: TextRun,
        /// Placement.
        anchor: TextAnchor,
        /// Wrap width, if any.
        max_width: Option<f64>,
    },
    /// Neutral fill with a centred prompt.
    Placeholder {
        /// Area.
        rect: Rect,
        /// Fill colour.
        color: Rgba,
        /// Prompt text.
        prompt: TextRun,
    },
    /// Logo and signature laid out right to left from `corner` (bottom-right).
    Signature {
        /// Bottom-right corner of the row.
        corner: Point,
        /// Gap between logo and text.
        gap: f64,
        /// Optional logo.
        logo: Option<LogoMark>,
        /// Signature text.
        run: TextRun,
    },
    /// Text on a rounded pill whose bottom-left corner is `corner`.
    Tag {
        /// Bottom-left corner of the pill.
        corner: Point,
        /// Horizontal/vertical padding.
        padding: Vec2,
        /// Pill corner radius.
        radius: f64,
        /// Pill colour.
        fill: Rgba,
        /// Tag text.
        run: TextRun,
    },
}

/// One paintable layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Layer {
    /// Role in the stack.
    pub kind: LayerKind,
    /// Layer opacity applied when compositing.
    pub opacity: f64,
    /// Shadow cast by everything the layer paints.
    pub shadow: Option<DropShadow>,
    /// What to paint.
    pub content: LayerContent,
}

/// Ordered, fully resolved layers of one cover, back to front.
///
/// Derived from a cover state on every change; never patched in place.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LayerStack {
    /// Logical canvas.
    pub canvas: Canvas,
    /// Post-composition contrast multiplier (1.0 = unchanged).
    pub contrast: f64,
    /// Card corner radius.
    pub corner_radius: f64,
    /// Business name the export filename is derived from.
    pub business_name: String,
    /// Layers, back to front.
    pub layers: Vec<Layer>,
}

impl LayerStack {
    /// Kinds in paint order.
    pub fn kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(|l| l.kind).collect()
    }

    /// First layer of `kind`.
    pub fn get(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    /// `true` if a layer of `kind` is present.
    pub fn contains(&self, kind: LayerKind) -> bool {
        self.get(kind).is_some()
    }

    /// Stable 64-bit digest of the whole stack (images by content hash).
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        match serde_json::to_vec(self) {
            Ok(bytes) => h.write_bytes(&bytes),
            Err(e) => {
                tracing::warn!("layer stack not serializable for fingerprinting: {e}");
                h.write_u64(self.layers.len() as u64);
            }
        }
        h.finish()
    }
}

#[derive(serde::Serialize)]
struct ImageSummary<'a> {
    mime: &'a str,
    width: Option<u32>,
    height: Option<u32>,
    hash: String,
}

fn serialize_image_summary<S>(image: &EncodedImage, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::Serialize;

    let dims = image.dimensions();
    ImageSummary {
        mime: image.mime(),
        width: dims.map(|d| d.0),
        height: dims.map(|d| d.1),
        hash: format!("{:016x}", image.content_hash()),
    }
    .serialize(serializer)
}

#[cfg(test)]
#[path = "../../tests/unit/cover/layers.rs"]
mod tests;
