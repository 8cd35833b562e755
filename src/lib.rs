//! Portada composes vertical (9:16) cover thumbnails for short-form business videos.
//!
//! The editing surface is session-oriented:
//!
//! - Open a [`CoverSession`] (default [`CoverState`], mirrored images restored from a
//!   [`LocalStore`])
//! - Edit the state; every change recomputes the [`LayerStack`] through [`compose`]
//! - Mount the preview ([`PreviewSurface`]) and export it at 2x through an [`ExportSink`]
//! - Generate the matching voice-over [`Script`]
//!
//! Composition is pure: the same state and [`ComposerConfig`] always yield the same stack, and
//! the CPU rasterizer turns that stack into premultiplied RGBA8 pixels deterministically.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod cover;
mod export;
mod foundation;
mod persist;
mod render;
mod script;
mod session;

pub use crate::foundation::core::{Canvas, Rgba, Rgba8Premul};
pub use crate::foundation::error::{PortadaError, PortadaResult};

pub use crate::assets::color::ColorDef;
pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::encoded::{EncodedImage, SVG_MIME};
pub use crate::assets::fonts::{
    FaceStyle, FontFace, FontSet, FontSources, TextBrushRgba8, TextLayoutEngine, TextShape,
};
pub use crate::assets::ingest::{ingest_bytes, ingest_file};

pub use crate::cover::compose::{EDGE_MARGIN, PLACEHOLDER_PROMPT, compose};
pub use crate::cover::config::{
    ComposerConfig, SparkGradientDef, SparkStopDef, SparkTable, TextScheme, ToneRecipe,
    ToneStopDef, ToneTable,
};
pub use crate::cover::layers::{
    DropShadow, GradientStop, ImageFit, Layer, LayerContent, LayerKind, LayerStack,
    LinearGradient, LogoMark, RadialGradient, TextAnchor, TextRun,
};
pub use crate::cover::state::{CoverState, DurationClass, ImageSlot, ToneKey};
pub use crate::cover::theme::{Theme, ThemeKey};

pub use crate::render::backend::FrameRGBA;
pub use crate::render::cpu::CpuRasterizer;
pub use crate::render::surface::PreviewSurface;

pub use crate::export::filename::{EXPORT_SUFFIX, export_filename};
pub use crate::export::rasterizer::{ExportArtifact, Rasterizer};
pub use crate::export::sink::{DirectorySink, ExportSink, InMemorySink};

pub use crate::persist::store::{
    FACE_KEY, JsonFileStore, LOGO_KEY, LocalStore, MemoryStore, mirror, mirror_key,
    restore_mirrored,
};

pub use crate::script::generator::{Beat, BeatKind, Script, beat_windows, generate};

pub use crate::session::editor::{CoverSession, open_store};
