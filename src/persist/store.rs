use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    assets::encoded::EncodedImage,
    cover::state::{CoverState, ImageSlot},
    foundation::error::{PortadaError, PortadaResult},
};

/// Durable key of the mirrored portrait.
pub const FACE_KEY: &str = "crissFaceDataURL";
/// Durable key of the mirrored logo.
pub const LOGO_KEY: &str = "crissLogoDataURL";

/// String key/value storage surviving process restarts.
///
/// A missing key means "nothing saved", never an error.
pub trait LocalStore {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> PortadaResult<Option<String>>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> PortadaResult<()>;
}

/// Volatile store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> PortadaResult<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PortadaResult<()> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// A missing or corrupt file is an empty store; a corrupt file stays on disk until the next
/// successful write. Every write replaces the file atomically (temp file, then rename).
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    map: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> PortadaResult<Self> {
        let path = path.into();
        let map = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        "corrupt store ignored, starting empty: {e}"
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(PortadaError::storage(format!(
                    "read store '{}': {e}",
                    path.display()
                )));
            }
        };
        Ok(Self { path, map })
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> PortadaResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create store directory '{}'", parent.display()))?;
        }
        let bytes = serde_json::to_vec_pretty(&self.map)
            .map_err(|e| PortadaError::serde(format!("encode store: {e}")))?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, bytes)
            .with_context(|| format!("write store temp file '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace store '{}'", self.path.display()))?;
        Ok(())
    }
}

impl LocalStore for JsonFileStore {
    fn get(&self, key: &str) -> PortadaResult<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PortadaResult<()> {
        let previous = self.map.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            match previous {
                Some(v) => self.map.insert(key.to_string(), v),
                None => self.map.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

/// Durable key for `slot`; `None` for the session-only background photo.
pub fn mirror_key(slot: ImageSlot) -> Option<&'static str> {
    match slot {
        ImageSlot::CrissFace => Some(FACE_KEY),
        ImageSlot::Logo => Some(LOGO_KEY),
        ImageSlot::Entrepreneur => None,
    }
}

/// Save `image` for `slot` if the slot is mirrored. Returns whether anything was written.
pub fn mirror(
    store: &mut dyn LocalStore,
    slot: ImageSlot,
    image: &EncodedImage,
) -> PortadaResult<bool> {
    let Some(key) = mirror_key(slot) else {
        return Ok(false);
    };
    store.set(key, &image.to_data_url())?;
    tracing::debug!(key, mime = image.mime(), "image slot mirrored");
    Ok(true)
}

/// Fill the empty mirrored slots of `state` from `store`; returns how many were restored.
///
/// Unreadable or corrupt entries count as "no saved image".
pub fn restore_mirrored(store: &dyn LocalStore, state: &mut CoverState) -> usize {
    let mut restored = 0;
    for slot in ImageSlot::ALL {
        let Some(key) = mirror_key(slot) else {
            continue;
        };
        if state.image(slot).is_some() {
            continue;
        }
        let value = match store.get(key) {
            Ok(Some(v)) => v,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(key, "stored image unreadable: {e}");
                continue;
            }
        };
        match EncodedImage::from_data_url(&value) {
            Ok(image) => {
                state.set_image(slot, Some(image));
                restored += 1;
            }
            Err(e) => tracing::warn!(key, "stored image ignored: {e}"),
        }
    }
    restored
}

#[cfg(test)]
#[path = "../../tests/unit/persist/store.rs"]
mod tests;
