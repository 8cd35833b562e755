use std::path::Path;

use crate::{
    assets::{
        encoded::EncodedImage,
        fonts::FontSet,
        ingest::{ingest_bytes, ingest_file},
    },
    cover::{
        compose::compose,
        config::ComposerConfig,
        layers::LayerStack,
        state::{CoverState, ImageSlot},
        theme::ThemeKey,
    },
    export::{
        rasterizer::{ExportArtifact, Rasterizer},
        sink::ExportSink,
    },
    foundation::error::PortadaResult,
    persist::store::{JsonFileStore, LocalStore, MemoryStore, mirror, restore_mirrored},
    render::{cpu::CpuRasterizer, surface::PreviewSurface},
    script::generator::{Script, generate},
};

type Subscriber = Box<dyn FnMut(&LayerStack, u64)>;

/// Store named by `config.store_path`, or a volatile one.
pub fn open_store(config: &ComposerConfig) -> PortadaResult<Box<dyn LocalStore>> {
    Ok(match &config.store_path {
        Some(path) => Box::new(JsonFileStore::open(path)?),
        None => Box::new(MemoryStore::new()),
    })
}

/// The single writer of a cover: owns the state, recomputes the layer stack after every edit and
/// keeps the mounted preview in sync.
///
/// Ingestion and export failures never escape: they are logged and reported as `false`/`None`.
pub struct CoverSession {
    config: ComposerConfig,
    state: CoverState,
    stack: LayerStack,
    revision: u64,
    store: Box<dyn LocalStore>,
    cpu: CpuRasterizer,
    rasterizer: Rasterizer,
    preview: Option<PreviewSurface>,
    subscribers: Vec<Subscriber>,
}

impl std::fmt::Debug for CoverSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverSession")
            .field("revision", &self.revision)
            .field("layers", &self.stack.layers.len())
            .field("mounted", &self.preview.is_some())
            .finish()
    }
}

impl CoverSession {
    /// Default cover, mirrored images restored from `store`, fonts from the config.
    pub fn open(config: ComposerConfig, store: Box<dyn LocalStore>) -> PortadaResult<Self> {
        let fonts = FontSet::load(&config.fonts);
        Self::with_fonts(config, store, fonts, CoverState::default())
    }

    /// Start from `state` with explicit fonts; empty mirrored slots are restored from `store`.
    #[tracing::instrument(skip_all)]
    pub fn with_fonts(
        config: ComposerConfig,
        store: Box<dyn LocalStore>,
        fonts: FontSet,
        mut state: CoverState,
    ) -> PortadaResult<Self> {
        config.validate()?;
        let rasterizer = Rasterizer::new(config.export_density)?;
        let restored = restore_mirrored(store.as_ref(), &mut state);
        tracing::debug!(restored, "session opened");
        let stack = compose(&state, &config);
        Ok(Self {
            config,
            state,
            stack,
            revision: 0,
            store,
            cpu: CpuRasterizer::new(fonts),
            rasterizer,
            preview: None,
            subscribers: Vec::new(),
        })
    }

    /// Current cover state.
    pub fn state(&self) -> &CoverState {
        &self.state
    }

    /// Layer stack derived from the current state.
    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    /// Number of applied state changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Design parameters.
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Durable store.
    pub fn store(&self) -> &dyn LocalStore {
        self.store.as_ref()
    }

    /// Call `f` with the new stack and revision after every change.
    pub fn subscribe(&mut self, f: impl FnMut(&LayerStack, u64) + 'static) {
        self.subscribers.push(Box::new(f));
    }

    /// Apply an edit. A change recomputes the stack, repaints a mounted preview and notifies
    /// subscribers; an edit that changes nothing is ignored.
    pub fn update(&mut self, edit: impl FnOnce(&mut CoverState)) {
        let mut next = self.state.clone();
        edit(&mut next);
        if next == self.state {
            return;
        }
        self.state = next;
        self.recompute();
    }

    /// Replace headline/subhead with the canned pair of `key`.
    pub fn apply_theme(&mut self, key: ThemeKey) {
        self.update(|s| s.apply_theme(key));
    }

    /// Ingest the file at `path` into `slot`.
    ///
    /// On success the slot is replaced (and mirrored for face/logo). On failure nothing changes
    /// and `false` is returned.
    #[tracing::instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn upload(&mut self, slot: ImageSlot, path: impl AsRef<Path>) -> bool {
        match ingest_file(path.as_ref()) {
            Ok(image) => self.accept_upload(slot, image),
            Err(e) => {
                tracing::warn!(?slot, "upload ignored: {e}");
                false
            }
        }
    }

    /// Same as [`CoverSession::upload`] for bytes already in memory.
    pub fn upload_bytes(&mut self, slot: ImageSlot, bytes: Vec<u8>) -> bool {
        match ingest_bytes(bytes) {
            Ok(image) => self.accept_upload(slot, image),
            Err(e) => {
                tracing::warn!(?slot, "upload ignored: {e}");
                false
            }
        }
    }

    fn accept_upload(&mut self, slot: ImageSlot, image: EncodedImage) -> bool {
        if let Err(e) = mirror(self.store.as_mut(), slot, &image) {
            tracing::warn!(?slot, "image kept for this session only: {e}");
        }
        self.update(|s| s.set_image(slot, Some(image)));
        true
    }

    /// Voice-over script for the current business, city, theme and duration.
    pub fn script(&self) -> Script {
        generate(
            &self.state.business_name,
            &self.state.city,
            self.state.theme.theme().title,
            self.state.duration_class,
        )
    }

    /// Paint the live preview at the configured preview scale.
    pub fn mount_preview(&mut self) -> PortadaResult<&PreviewSurface> {
        let surface =
            PreviewSurface::paint(&mut self.cpu, self.stack.clone(), self.config.preview_scale)?;
        Ok(self.preview.insert(surface))
    }

    /// Mounted preview, if any.
    pub fn preview(&self) -> Option<&PreviewSurface> {
        self.preview.as_ref()
    }

    /// Drop the preview; exports become no-ops until it is mounted again.
    pub fn unmount_preview(&mut self) {
        self.preview = None;
    }

    /// Export the mounted preview at export density into `sink`.
    ///
    /// `None` when no preview is mounted or the export failed.
    pub fn export(&mut self, sink: &mut dyn ExportSink) -> Option<ExportArtifact> {
        self.rasterizer
            .export(&mut self.cpu, self.preview.as_ref(), sink)
    }

    fn recompute(&mut self) {
        self.stack = compose(&self.state, &self.config);
        self.revision += 1;
        if self.preview.is_some() {
            match PreviewSurface::paint(
                &mut self.cpu,
                self.stack.clone(),
                self.config.preview_scale,
            ) {
                Ok(surface) => self.preview = Some(surface),
                Err(e) => {
                    tracing::warn!("preview repaint failed; unmounting: {e}");
                    self.preview = None;
                }
            }
        }
        tracing::debug!(revision = self.revision, "layer stack recomputed");
        for subscriber in &mut self.subscribers {
            subscriber(&self.stack, self.revision);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
