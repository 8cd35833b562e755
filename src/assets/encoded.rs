use std::{io::Cursor, sync::Arc};

use base64::Engine as _;

use crate::foundation::{
    error::{PortadaError, PortadaResult},
    math::Fnv1a64,
};

/// MIME type used for vector uploads.
pub const SVG_MIME: &str = "image/svg+xml";

/// Opaque encoded-image handle: the binary payload plus its MIME type.
///
/// This is what the external file-picker/upload flow hands to the core, and what durable storage
/// mirrors (as a `data:` URL). Intrinsic pixel dimensions are read from the header once at
/// construction; `None` means the header could not be read.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    mime: String,
    bytes: Arc<Vec<u8>>,
    dims: Option<(u32, u32)>,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .field("dims", &self.dims)
            .finish()
    }
}

impl EncodedImage {
    /// Wrap a payload with an explicit MIME type.
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime = mime.into();
        let dims = header_dimensions(&mime, &bytes);
        Self {
            mime,
            bytes: Arc::new(bytes),
            dims,
        }
    }

    /// Detect the MIME type from the payload itself.
    pub fn sniff(bytes: Vec<u8>) -> PortadaResult<Self> {
        if looks_like_svg(&bytes) {
            return Ok(Self::new(SVG_MIME, bytes));
        }
        let format = image::guess_format(&bytes)
            .map_err(|e| PortadaError::decode(format!("unrecognized image payload: {e}")))?;
        Ok(Self::new(format.to_mime_type(), bytes))
    }

    /// Parse a `data:<mime>[;base64],<payload>` URL.
    pub fn from_data_url(url: &str) -> PortadaResult<Self> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| PortadaError::decode("data URL must start with 'data:'"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| PortadaError::decode("data URL is missing the ',' separator"))?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(PortadaError::decode(format!(
                "data URL is not an image (mime '{mime}')"
            )));
        }
        let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        let bytes = if is_base64 {
            base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| PortadaError::decode(format!("invalid base64 payload: {e}")))?
        } else {
            payload.as_bytes().to_vec()
        };
        Ok(Self::new(mime, bytes))
    }

    /// Encode as a self-describing `data:` URL (always base64).
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(self.bytes.as_slice())
        )
    }

    /// MIME type of the payload.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Raw encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether this payload is an SVG document.
    pub fn is_svg(&self) -> bool {
        self.mime == SVG_MIME
    }

    /// Intrinsic pixel size, if the header could be read.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dims
    }

    /// Width / height ratio; falls back to square for unreadable headers.
    pub fn aspect_ratio(&self) -> f64 {
        match self.dims {
            Some((w, h)) if w > 0 && h > 0 => f64::from(w) / f64::from(h),
            _ => 1.0,
        }
    }

    /// Stable content hash (MIME + bytes), used to fingerprint layer stacks.
    pub fn content_hash(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(self.mime.as_bytes());
        h.write_u8(0);
        h.write_bytes(&self.bytes);
        h.finish()
    }
}

impl serde::Serialize for EncodedImage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> serde::Deserialize<'de> for EncodedImage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_data_url(&s).map_err(serde::de::Error::custom)
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    let text = head.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

fn header_dimensions(mime: &str, bytes: &[u8]) -> Option<(u32, u32)> {
    if mime == SVG_MIME {
        let tree = usvg::Tree::from_data(bytes, &usvg::Options::default()).ok()?;
        let size = tree.size();
        return Some((
            size.width().ceil().max(1.0) as u32,
            size.height().ceil().max(1.0) as u32,
        ));
    }
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/encoded.rs"]
mod tests;
