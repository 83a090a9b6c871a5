//! External document payloads and the overlay save request.
//!
//! The hosting application loads a document as JSON (`DocumentPayload`) and
//! persists changed overlays with a `SaveRequest`. Two historical overlay
//! encodings exist in stored documents; the shape is resolved once at load
//! time into an explicit `OverlayFormat` instead of being sniffed at each
//! use site.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::image::OverlayImage;
use crate::PageNumber;

/// Shape of a loaded document as delivered by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub page_count: u32,
    /// Current format: per-page overlays already embedded in the persisted
    /// document bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_overlays: Option<BTreeMap<PageNumber, String>>,
    /// Legacy single-tier format from documents saved before the
    /// baked/session split.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlays: Option<BTreeMap<PageNumber, String>>,
}

impl DocumentPayload {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Resolve which overlay encoding this payload carries.
    ///
    /// Entries that fail to decode are dropped; the affected page simply has
    /// no overlay.
    pub fn overlay_format(&self) -> OverlayFormat {
        if let Some(map) = &self.page_overlays {
            OverlayFormat::Tiered(decode_entries(map))
        } else if let Some(map) = &self.overlays {
            OverlayFormat::Legacy(decode_entries(map))
        } else {
            OverlayFormat::Empty
        }
    }
}

/// Overlay encoding carried by a loaded document, resolved once at the
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayFormat {
    /// Per-page overlays already baked into the persisted bytes.
    Tiered(BTreeMap<PageNumber, OverlayImage>),
    /// Pre-split data; everything is treated as unsaved session ink.
    Legacy(BTreeMap<PageNumber, OverlayImage>),
    /// No overlay data at all.
    Empty,
}

fn decode_entries(map: &BTreeMap<PageNumber, String>) -> BTreeMap<PageNumber, OverlayImage> {
    let mut decoded = BTreeMap::new();
    for (page, uri) in map {
        match OverlayImage::from_data_uri(uri) {
            Ok(image) => {
                decoded.insert(*page, image);
            }
            Err(e) => {
                tracing::warn!("Dropping undecodable overlay for page {}: {}", page, e);
            }
        }
    }
    decoded
}

/// Outbound persistence payload: changed overlays plus page metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub overlays: BTreeMap<PageNumber, String>,
    pub current_page: PageNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_status: Option<String>,
}

impl SaveRequest {
    pub fn new(
        overlays: BTreeMap<PageNumber, OverlayImage>,
        current_page: PageNumber,
        forced_status: Option<String>,
    ) -> Self {
        Self {
            overlays: overlays
                .into_iter()
                .map(|(page, image)| (page, image.into_uri()))
                .collect(),
            current_page,
            forced_status,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}
