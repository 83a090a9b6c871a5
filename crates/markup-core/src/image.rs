//! PNG overlay images carried as data URIs.
//!
//! A page's accumulated ink is stored and transmitted as a full-page PNG
//! raster encoded into a `data:` URI string. The URI is the unit of
//! equality: two overlays are the same exactly when their encoded bytes are
//! identical, which is what the save-time change detection relies on.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::MarkupError;

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// PNG magic bytes: 89 50 4E 47 0D 0A 1A 0A
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// A full-page overlay raster, carried as a PNG data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayImage {
    uri: String,
}

impl OverlayImage {
    /// Parse a data URI, validating that the payload is a real PNG.
    pub fn from_data_uri(uri: &str) -> Result<Self, MarkupError> {
        let encoded = uri
            .strip_prefix(DATA_URI_PREFIX)
            .ok_or_else(|| MarkupError::InvalidImage("not a PNG data URI".to_string()))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| MarkupError::InvalidImage(format!("bad base64 payload: {}", e)))?;
        check_png_magic(&bytes)?;
        Ok(Self {
            uri: uri.to_string(),
        })
    }

    /// Wrap raw PNG bytes into a data URI.
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self, MarkupError> {
        check_png_magic(bytes)?;
        let uri = format!(
            "{}{}",
            DATA_URI_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(bytes)
        );
        Ok(Self { uri })
    }

    pub fn as_uri(&self) -> &str {
        &self.uri
    }

    pub fn into_uri(self) -> String {
        self.uri
    }

    /// Decode back to the raw PNG bytes.
    pub fn png_bytes(&self) -> Result<Vec<u8>, MarkupError> {
        // The prefix was validated on construction.
        let encoded = &self.uri[DATA_URI_PREFIX.len()..];
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| MarkupError::InvalidImage(format!("bad base64 payload: {}", e)))
    }

    /// Pixel dimensions read from the PNG header.
    pub fn dimensions(&self) -> Result<(u32, u32), MarkupError> {
        let bytes = self.png_bytes()?;
        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let reader = decoder
            .read_info()
            .map_err(|e| MarkupError::InvalidImage(format!("png header: {}", e)))?;
        let info = reader.info();
        Ok((info.width, info.height))
    }
}

fn check_png_magic(bytes: &[u8]) -> Result<(), MarkupError> {
    if !bytes.starts_with(&PNG_MAGIC) {
        return Err(MarkupError::InvalidImage(
            "missing PNG signature".to_string(),
        ));
    }
    Ok(())
}
