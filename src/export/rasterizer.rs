use crate::{
    export::{filename::export_filename, sink::ExportSink},
    foundation::error::{PortadaError, PortadaResult},
    render::{cpu::CpuRasterizer, surface::PreviewSurface},
};

/// A finished export: PNG bytes plus the suggested filename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested filename (`<business>_thumbnail.png`).
    pub filename: String,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Lossless PNG with alpha.
    pub png: Vec<u8>,
}

/// Flattens the mounted preview surface into a density-multiplied PNG.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rasterizer {
    density: f64,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self {
            density: Self::DEFAULT_DENSITY,
        }
    }
}

impl Rasterizer {
    /// Device pixels per logical pixel of an export.
    pub const DEFAULT_DENSITY: f64 = 2.0;

    /// Rasterizer with a custom density multiplier.
    pub fn new(density: f64) -> PortadaResult<Self> {
        if !density.is_finite() || density <= 0.0 {
            return Err(PortadaError::validation(
                "export density must be finite and > 0",
            ));
        }
        Ok(Self { density })
    }

    /// Density multiplier.
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Repaint what `surface` shows at export density and encode it.
    #[tracing::instrument(skip(self, cpu, surface), fields(density = self.density))]
    pub fn rasterize(
        &self,
        cpu: &mut CpuRasterizer,
        surface: &PreviewSurface,
    ) -> PortadaResult<ExportArtifact> {
        let stack = surface.stack();
        let frame = cpu.render(stack, self.density)?;
        let png = frame.encode_png()?;
        Ok(ExportArtifact {
            filename: export_filename(&stack.business_name),
            width: frame.width,
            height: frame.height,
            png,
        })
    }

    /// Rasterize and deliver to `sink`.
    ///
    /// Without a mounted surface, or if anything fails, nothing is delivered and `None` is
    /// returned; the failure is only logged.
    pub fn export(
        &self,
        cpu: &mut CpuRasterizer,
        surface: Option<&PreviewSurface>,
        sink: &mut dyn ExportSink,
    ) -> Option<ExportArtifact> {
        let Some(surface) = surface else {
            tracing::warn!("export requested before the preview surface was mounted; ignoring");
            return None;
        };
        let result = self.rasterize(cpu, surface).and_then(|artifact| {
            sink.deliver(&artifact.filename, &artifact.png)?;
            Ok(artifact)
        });
        match result {
            Ok(artifact) => {
                tracing::info!(
                    filename = %artifact.filename,
                    width = artifact.width,
                    height = artifact.height,
                    "cover exported"
                );
                Some(artifact)
            }
            Err(e) => {
                tracing::warn!("export failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/rasterizer.rs"]
mod tests;
