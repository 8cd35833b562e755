use std::path::Path;

use anyhow::Context;

use crate::{
    assets::{
        decode::{decode_raster, parse_svg},
        encoded::EncodedImage,
    },
    foundation::error::{PortadaError, PortadaResult},
};

/// Turn a user-selected file into an encoded-image payload.
///
/// The payload is fully validated (it must decode) so a bad upload never reaches the cover
/// state. Callers that follow the "nothing happened" contract log and drop the error.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn ingest_file(path: impl AsRef<Path>) -> PortadaResult<EncodedImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("read upload '{}'", path.display()))
        .map_err(PortadaError::from)?;
    ingest_bytes(bytes)
}

/// Validate an in-memory upload and wrap it as an [`EncodedImage`].
pub fn ingest_bytes(bytes: Vec<u8>) -> PortadaResult<EncodedImage> {
    if bytes.is_empty() {
        return Err(PortadaError::decode("upload is empty"));
    }
    let img = EncodedImage::sniff(bytes)?;
    if img.is_svg() {
        parse_svg(img.bytes())?;
    } else {
        decode_raster(img.bytes())?;
    }
    tracing::debug!(
        mime = img.mime(),
        len = img.bytes().len(),
        "upload accepted"
    );
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/ingest.rs"]
mod tests;
