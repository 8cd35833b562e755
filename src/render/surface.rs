use crate::{
    cover::layers::LayerStack,
    foundation::error::PortadaResult,
    render::{backend::FrameRGBA, cpu::CpuRasterizer},
};

/// The mounted live preview: the layer stack it shows and the pixels painted for it.
#[derive(Clone, Debug)]
pub struct PreviewSurface {
    stack: LayerStack,
    frame: FrameRGBA,
    scale: f64,
    fingerprint: u64,
}

impl PreviewSurface {
    /// Paint `stack` at `scale` and keep the result.
    #[tracing::instrument(skip(rasterizer, stack))]
    pub fn paint(
        rasterizer: &mut CpuRasterizer,
        stack: LayerStack,
        scale: f64,
    ) -> PortadaResult<Self> {
        let frame = rasterizer.render(&stack, scale)?;
        let fingerprint = stack.fingerprint();
        tracing::debug!(
            fingerprint,
            width = frame.width,
            height = frame.height,
            "preview painted"
        );
        Ok(Self {
            stack,
            frame,
            scale,
            fingerprint,
        })
    }

    /// Stack currently shown.
    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    /// Pixels currently shown.
    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    /// Display scale the preview was painted at.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Fingerprint of the shown stack.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// `true` if the preview already shows `stack`.
    pub fn shows(&self, stack: &LayerStack) -> bool {
        self.fingerprint == stack.fingerprint()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
