use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    assets::{color::ColorDef, fonts::FontSources},
    cover::state::ToneKey,
    foundation::{
        core::{Canvas, Rgba},
        error::{PortadaError, PortadaResult},
    },
};

/// Headline/subhead colour scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextScheme {
    /// Yellow headline, white subhead.
    #[default]
    Accent,
    /// White headline and subhead.
    Mono,
}

impl TextScheme {
    /// `(headline, subhead)` colours.
    pub fn colors(self) -> (Rgba, Rgba) {
        match self {
            TextScheme::Accent => (Rgba::rgb(0xFD, 0xE0, 0x47), Rgba::WHITE),
            TextScheme::Mono => (Rgba::WHITE, Rgba::WHITE),
        }
    }
}

/// One intensity-scaled stop of a spark gradient.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SparkStopDef {
    /// Position as a fraction of the gradient radius.
    pub offset: f64,
    /// Stop colour; its alpha is replaced by `intensity / scale`.
    pub color: ColorDef,
    /// Divisor turning the intensity percentage into an alpha.
    pub scale: f64,
}

/// One radial spark gradient.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SparkGradientDef {
    /// Focal point as fractions of the canvas size.
    pub center: [f64; 2],
    /// The two intensity-scaled stops.
    pub stops: [SparkStopDef; 2],
    /// Offset at which the gradient becomes fully transparent.
    pub fade_at: f64,
}

/// The two spark gradients, first painted on top.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SparkTable {
    /// Lower-right glow.
    pub primary: SparkGradientDef,
    /// Right-side highlight.
    pub secondary: SparkGradientDef,
}

impl Default for SparkTable {
    fn default() -> Self {
        Self {
            primary: SparkGradientDef {
                center: [0.7, 0.7],
                stops: [
                    SparkStopDef {
                        offset: 0.0,
                        color: Rgba::rgb(0xFF, 0xB4, 0x50).into(),
                        scale: 150.0,
                    },
                    SparkStopDef {
                        offset: 0.2,
                        color: Rgba::rgb(0xFF, 0x8C, 0x00).into(),
                        scale: 200.0,
                    },
                ],
                fade_at: 0.4,
            },
            secondary: SparkGradientDef {
                center: [0.8, 0.6],
                stops: [
                    SparkStopDef {
                        offset: 0.0,
                        color: Rgba::rgb(0xFF, 0xDC, 0x78).into(),
                        scale: 180.0,
                    },
                    SparkStopDef {
                        offset: 0.25,
                        color: Rgba::rgb(0xFF, 0xDC, 0x78).into(),
                        scale: 300.0,
                    },
                ],
                fade_at: 0.5,
            },
        }
    }
}

/// A stop of a tone overlay gradient.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToneStopDef {
    /// Position along the diagonal, `0..=1`.
    pub offset: f64,
    /// Stop colour including alpha.
    pub color: ColorDef,
}

/// Diagonal gradient recipe for one tone.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToneRecipe {
    /// Stops in ascending offset order.
    pub stops: Vec<ToneStopDef>,
}

impl ToneRecipe {
    fn three(from: Rgba, via: Rgba) -> Self {
        Self {
            stops: vec![
                ToneStopDef {
                    offset: 0.0,
                    color: from.into(),
                },
                ToneStopDef {
                    offset: 0.5,
                    color: via.into(),
                },
                ToneStopDef {
                    offset: 1.0,
                    color: Rgba::TRANSPARENT.into(),
                },
            ],
        }
    }
}

/// Recipes keyed by [`ToneKey`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ToneTable {
    /// Amber to orange.
    pub warm: ToneRecipe,
    /// Sky to blue.
    pub cool: ToneRecipe,
    /// Faint white.
    pub neutral: ToneRecipe,
}

impl ToneTable {
    /// Recipe for `key`.
    pub fn recipe(&self, key: ToneKey) -> &ToneRecipe {
        match key {
            ToneKey::Warm => &self.warm,
            ToneKey::Cool => &self.cool,
            ToneKey::Neutral => &self.neutral,
        }
    }
}

impl Default for ToneTable {
    fn default() -> Self {
        Self {
            warm: ToneRecipe::three(
                Rgba::rgb(0xFC, 0xD3, 0x4D).with_alpha(0.20),
                Rgba::rgb(0xFB, 0x92, 0x3C).with_alpha(0.10),
            ),
            cool: ToneRecipe::three(
                Rgba::rgb(0x38, 0xBD, 0xF8).with_alpha(0.15),
                Rgba::rgb(0x3B, 0x82, 0xF6).with_alpha(0.10),
            ),
            neutral: ToneRecipe::three(Rgba::WHITE.with_alpha(0.10), Rgba::WHITE.with_alpha(0.0)),
        }
    }
}

/// Design parameters shared by the composer, the preview and the exporter.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Logical canvas every layer is laid out against.
    pub canvas: Canvas,
    /// Card corner radius in logical pixels; 0 disables rounding.
    pub corner_radius: f64,
    /// Device pixels per logical pixel for the live preview.
    pub preview_scale: f64,
    /// Device pixels per logical pixel for the exported PNG.
    pub export_density: f64,
    /// Headline/subhead colours.
    pub text_scheme: TextScheme,
    /// Spark overlay gradients.
    pub spark: SparkTable,
    /// Tone overlay recipes.
    pub tones: ToneTable,
    /// Fill used when no background photo is present.
    pub placeholder_color: ColorDef,
    /// Font files and system fallback.
    pub fonts: FontSources,
    /// JSON file backing the mirrored image slots; `None` keeps them in memory.
    pub store_path: Option<PathBuf>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::COVER,
            corner_radius: 16.0,
            preview_scale: 1.0,
            export_density: 2.0,
            text_scheme: TextScheme::Accent,
            spark: SparkTable::default(),
            tones: ToneTable::default(),
            placeholder_color: Rgba::rgb(0x26, 0x26, 0x26).into(),
            fonts: FontSources::default(),
            store_path: None,
        }
    }
}

impl ComposerConfig {
    /// Parse and validate a JSON config.
    pub fn from_reader<R: std::io::Read>(reader: R) -> PortadaResult<Self> {
        let cfg: Self = serde_json::from_reader(reader)
            .map_err(|e| PortadaError::serde(format!("invalid composer config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> PortadaResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open composer config '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Reject sizes and scales the renderer cannot honour.
    pub fn validate(&self) -> PortadaResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        if !self.corner_radius.is_finite() || self.corner_radius < 0.0 {
            return Err(PortadaError::validation(
                "corner_radius must be finite and >= 0",
            ));
        }
        for (name, v) in [
            ("preview_scale", self.preview_scale),
            ("export_density", self.export_density),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(PortadaError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        for g in [&self.spark.primary, &self.spark.secondary] {
            if !(0.0..=1.0).contains(&g.center[0]) || !(0.0..=1.0).contains(&g.center[1]) {
                return Err(PortadaError::validation("spark center must lie in [0,1]"));
            }
            let mut last = 0.0;
            for stop in &g.stops {
                if !stop.scale.is_finite() || stop.scale <= 0.0 {
                    return Err(PortadaError::validation(
                        "spark stop scale must be finite and > 0",
                    ));
                }
                check_offset(stop.offset, last, "spark")?;
                last = stop.offset;
            }
            check_offset(g.fade_at, last, "spark fade_at")?;
        }
        for recipe in [&self.tones.warm, &self.tones.cool, &self.tones.neutral] {
            if recipe.stops.is_empty() {
                return Err(PortadaError::validation("tone recipe needs at least one stop"));
            }
            let mut last = 0.0;
            for stop in &recipe.stops {
                check_offset(stop.offset, last, "tone")?;
                last = stop.offset;
            }
        }
        Ok(())
    }
}

fn check_offset(offset: f64, min: f64, what: &str) -> PortadaResult<()> {
    if !offset.is_finite() || !(0.0..=1.0).contains(&offset) || offset < min {
        return Err(PortadaError::validation(format!(
            "{what} stop offsets must be ascending within [0,1]"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/cover/config.rs"]
mod tests;
