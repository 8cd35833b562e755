use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::PortadaResult;

/// Receiver of exported covers (the "download" side effect).
pub trait ExportSink {
    /// Hand over one finished PNG under its suggested filename.
    fn deliver(&mut self, filename: &str, png: &[u8]) -> PortadaResult<()>;
}

/// Writes exports into a directory, like a browser download folder.
///
/// Path separators in the suggested name are replaced with `_` on disk so a business name such as
/// `AC/DC` cannot escape the directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    last: Option<PathBuf>,
}

impl DirectorySink {
    /// Sink writing into `dir` (created on first delivery).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last: None,
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path written by the most recent delivery.
    pub fn last_path(&self) -> Option<&Path> {
        self.last.as_deref()
    }

    /// On-disk path used for a suggested filename.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        let safe: String = filename
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        let safe = match safe.as_str() {
            "" | "." | ".." => "_thumbnail.png".to_string(),
            _ => safe,
        };
        self.dir.join(safe)
    }
}

impl ExportSink for DirectorySink {
    fn deliver(&mut self, filename: &str, png: &[u8]) -> PortadaResult<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create export directory '{}'", self.dir.display())
        })?;
        let path = self.path_for(filename);
        std::fs::write(&path, png)
            .with_context(|| format!("failed to write export '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = png.len(), "export written");
        self.last = Some(path);
        Ok(())
    }
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    files: Vec<(String, Vec<u8>)>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries in order.
    pub fn files(&self) -> &[(String, Vec<u8>)] {
        &self.files
    }
}

impl ExportSink for InMemorySink {
    fn deliver(&mut self, filename: &str, png: &[u8]) -> PortadaResult<()> {
        self.files.push((filename.to_string(), png.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
