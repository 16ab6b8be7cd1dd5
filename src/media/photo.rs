/// Photo references attached to comments
///
/// A reference is an opaque string handed over by the photo provider:
/// either a URI (`file://...`, `content://...`, an absolute path) or an
/// inline `data:<mime>;base64,<payload>` URI built from picked image bytes.

use std::fmt;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";
const FILE_URI_PREFIX: &str = "file://";

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("bytes are not a recognised image format")]
    UnsupportedImage,

    #[error("photo reference is not inline data")]
    NotInline,

    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Opaque reference to a captured or picked image
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhotoRef(String);

/// Where the referenced image lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource<'a> {
    /// Embedded image data; nothing to release on delete
    Inline { mime: &'a str },
    /// A file on this device
    File(PathBuf),
    /// Anything else (content://, ph://, http(s)://, ...)
    Remote(&'a str),
}

impl PhotoRef {
    /// Build an inline reference from raw image bytes.
    ///
    /// The mime type is sniffed from the bytes, so a PNG becomes
    /// `data:image/png;base64,...`.
    pub fn inline(bytes: &[u8]) -> Result<Self, PhotoError> {
        let format = image::guess_format(bytes).map_err(|_| PhotoError::UnsupportedImage)?;
        let encoded = STANDARD.encode(bytes);
        Ok(Self(format!(
            "{DATA_URI_PREFIX}{}{BASE64_MARKER}{encoded}",
            format.to_mime_type()
        )))
    }

    /// Reference a file on disk by `file://` URI
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self(format!("{FILE_URI_PREFIX}{}", path.into().display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn source(&self) -> PhotoSource<'_> {
        if let Some(rest) = self.0.strip_prefix(DATA_URI_PREFIX) {
            if let Some((mime, _)) = rest.split_once(BASE64_MARKER) {
                return PhotoSource::Inline { mime };
            }
        }
        if let Some(path) = self.0.strip_prefix(FILE_URI_PREFIX) {
            return PhotoSource::File(PathBuf::from(path));
        }
        if self.0.starts_with('/') {
            return PhotoSource::File(PathBuf::from(&self.0));
        }
        PhotoSource::Remote(&self.0)
    }

    /// Decode the bytes of an inline reference
    pub fn decode_inline(&self) -> Result<Vec<u8>, PhotoError> {
        let payload = self
            .0
            .strip_prefix(DATA_URI_PREFIX)
            .and_then(|rest| rest.split_once(BASE64_MARKER))
            .map(|(_, payload)| payload)
            .ok_or(PhotoError::NotInline)?;
        Ok(STANDARD.decode(payload)?)
    }
}

impl From<String> for PhotoRef {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl From<&str> for PhotoRef {
    fn from(uri: &str) -> Self {
        Self(uri.to_string())
    }
}

impl fmt::Display for PhotoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Inline payloads can be megabytes; only show the header
        match self.source() {
            PhotoSource::Inline { mime } => write!(f, "<inline {mime}, {} bytes>", self.0.len()),
            _ => f.write_str(&self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest valid PNG: signature + IHDR + IDAT + IEND for a 1x1 pixel
    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn test_inline_png() {
        let photo = PhotoRef::inline(PNG_1X1).unwrap();

        assert!(photo.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(photo.source(), PhotoSource::Inline { mime: "image/png" });
        assert_eq!(photo.decode_inline().unwrap(), PNG_1X1);
    }

    #[test]
    fn test_inline_rejects_unknown_bytes() {
        let err = PhotoRef::inline(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PhotoError::UnsupportedImage));
    }

    #[test]
    fn test_source_classification() {
        assert_eq!(
            PhotoRef::from("file:///sdcard/DCIM/fox.jpg").source(),
            PhotoSource::File(PathBuf::from("/sdcard/DCIM/fox.jpg"))
        );
        assert_eq!(
            PhotoRef::from("/tmp/panda.png").source(),
            PhotoSource::File(PathBuf::from("/tmp/panda.png"))
        );
        assert_eq!(
            PhotoRef::from("ph://8F2A-11").source(),
            PhotoSource::Remote("ph://8F2A-11")
        );
        assert!(matches!(
            PhotoRef::from("ph://8F2A-11").decode_inline(),
            Err(PhotoError::NotInline)
        ));
    }

    #[test]
    fn test_display_hides_inline_payload() {
        let photo = PhotoRef::inline(PNG_1X1).unwrap();
        let shown = photo.to_string();
        assert!(shown.starts_with("<inline image/png"));
        assert!(!shown.contains("base64"));
    }
}
