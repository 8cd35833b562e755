use std::{path::Path, str::FromStr};

use anyhow::Context;

use crate::{
    assets::encoded::EncodedImage,
    cover::theme::ThemeKey,
    foundation::error::{PortadaError, PortadaResult},
};

/// Gradient overlay recipe selector.
///
/// Unknown keys in serialized input fall back to [`ToneKey::Warm`] instead of failing.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ToneKey {
    /// Amber to orange.
    #[default]
    Warm,
    /// Sky to blue.
    Cool,
    /// Faint white.
    Neutral,
}

impl ToneKey {
    /// Lowercase key.
    pub fn as_str(self) -> &'static str {
        match self {
            ToneKey::Warm => "warm",
            ToneKey::Cool => "cool",
            ToneKey::Neutral => "neutral",
        }
    }

    /// Lenient parse: anything unrecognised is [`ToneKey::Warm`].
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "cool" => ToneKey::Cool,
            "neutral" => ToneKey::Neutral,
            _ => ToneKey::Warm,
        }
    }
}

impl From<String> for ToneKey {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

impl FromStr for ToneKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

/// Script timing template.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DurationClass {
    /// 45 second cut.
    #[default]
    #[serde(alias = "45")]
    Short,
    /// 120 second cut.
    #[serde(alias = "120")]
    Extended,
}

impl DurationClass {
    /// Total length in seconds.
    pub fn total_seconds(self) -> u32 {
        match self {
            DurationClass::Short => 45,
            DurationClass::Extended => 120,
        }
    }
}

impl FromStr for DurationClass {
    type Err = PortadaError;

    fn from_str(s: &str) -> PortadaResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" | "45" => Ok(DurationClass::Short),
            "extended" | "120" => Ok(DurationClass::Extended),
            other => Err(PortadaError::validation(format!(
                "unknown duration class '{other}' (expected short|extended|45|120)"
            ))),
        }
    }
}

/// One of the three image slots of a cover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageSlot {
    /// Foreground portrait cutout; mirrored to durable storage.
    CrissFace,
    /// Background photo; session only.
    Entrepreneur,
    /// Brand logo; mirrored to durable storage.
    Logo,
}

impl ImageSlot {
    /// Every slot.
    pub const ALL: [ImageSlot; 3] = [
        ImageSlot::CrissFace,
        ImageSlot::Entrepreneur,
        ImageSlot::Logo,
    ];
}

impl FromStr for ImageSlot {
    type Err = PortadaError;

    fn from_str(s: &str) -> PortadaResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "face" | "crissface" | "portrait" => Ok(ImageSlot::CrissFace),
            "entrepreneur" | "background" | "photo" => Ok(ImageSlot::Entrepreneur),
            "logo" => Ok(ImageSlot::Logo),
            other => Err(PortadaError::validation(format!(
                "unknown image slot '{other}' (expected face|entrepreneur|logo)"
            ))),
        }
    }
}

/// Every user-editable field that drives composition.
///
/// Text fields are kept verbatim; no length or charset validation happens here. Numeric style
/// parameters are applied as-is by the composer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoverState {
    /// Last theme applied through [`CoverState::apply_theme`].
    pub theme: ThemeKey,
    /// Headline text.
    pub headline: String,
    /// Subhead text.
    pub subhead: String,
    /// Business shown in the tag and used for the export filename.
    pub business_name: String,
    /// City shown in the tag.
    pub city: String,
    /// Signature next to the logo.
    pub signature: String,
    /// Gradient overlay recipe.
    pub tone_key: ToneKey,
    /// Whole-canvas contrast in percent (100 = unchanged).
    pub contrast_pct: u32,
    /// Spark overlay intensity; 0 removes the layer.
    pub spark_intensity_pct: u32,
    /// Headline font size.
    pub title_size_px: u32,
    /// Subhead font size.
    pub subtitle_size_px: u32,
    /// Signature font size.
    pub signature_size_px: u32,
    /// Logo square size.
    pub logo_size_px: u32,
    /// Script timing template.
    pub duration_class: DurationClass,
    /// Foreground portrait.
    pub criss_face_image: Option<EncodedImage>,
    /// Background photo.
    pub entrepreneur_image: Option<EncodedImage>,
    /// Brand logo.
    pub logo_image: Option<EncodedImage>,
}

impl Default for CoverState {
    fn default() -> Self {
        Self {
            theme: ThemeKey::Regalo,
            headline: "LE REGALAMOS SU PROPIA WEB 💻".to_string(),
            subhead: "Y NO PUDO CREERLO…".to_string(),
            business_name: "Cerrajería Totti".to_string(),
            city: "Shushufindi".to_string(),
            signature: "Criss Lombeida".to_string(),
            tone_key: ToneKey::Warm,
            contrast_pct: 95,
            spark_intensity_pct: 80,
            title_size_px: 20,
            subtitle_size_px: 14,
            signature_size_px: 16,
            logo_size_px: 40,
            duration_class: DurationClass::Short,
            criss_face_image: None,
            entrepreneur_image: None,
            logo_image: None,
        }
    }
}

impl CoverState {
    /// Overwrite headline/subhead with the canned pair of `key` and remember the selection.
    ///
    /// Nothing else changes; later edits to headline/subhead keep `theme` as is.
    pub fn apply_theme(&mut self, key: ThemeKey) {
        let theme = key.theme();
        self.theme = key;
        self.headline = theme.title.to_string();
        self.subhead = theme.subtitle.to_string();
    }

    /// Image currently held in `slot`.
    pub fn image(&self, slot: ImageSlot) -> Option<&EncodedImage> {
        match slot {
            ImageSlot::CrissFace => self.criss_face_image.as_ref(),
            ImageSlot::Entrepreneur => self.entrepreneur_image.as_ref(),
            ImageSlot::Logo => self.logo_image.as_ref(),
        }
    }

    /// Replace the content of `slot`.
    pub fn set_image(&mut self, slot: ImageSlot, image: Option<EncodedImage>) {
        let target = match slot {
            ImageSlot::CrissFace => &mut self.criss_face_image,
            ImageSlot::Entrepreneur => &mut self.entrepreneur_image,
            ImageSlot::Logo => &mut self.logo_image,
        };
        *target = image;
    }

    /// Read a cover state document (JSON). Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(reader: R) -> PortadaResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| PortadaError::serde(format!("invalid cover state json: {e}")))
    }

    /// Read a cover state document from a file.
    pub fn from_path(path: impl AsRef<Path>) -> PortadaResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open cover state '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cover/state.rs"]
mod tests;
