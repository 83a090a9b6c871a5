//! Per-page snapshot history for undo.
//!
//! Undo is snapshot based: each committed stroke stores the full page raster
//! and a cursor walks those snapshots. A cursor of `None` means the page is
//! blank. Recording while the cursor sits behind the tip discards the
//! forward entries before appending.

use crate::image::OverlayImage;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageHistory {
    entries: Vec<OverlayImage>,
    cursor: Option<usize>,
}

impl PageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History seeded from an overlay that already exists when the document
    /// is opened.
    pub fn seeded(image: OverlayImage) -> Self {
        Self {
            entries: vec![image],
            cursor: Some(0),
        }
    }

    /// Append a new snapshot, discarding anything the cursor has stepped
    /// back over.
    pub fn record(&mut self, image: OverlayImage) {
        match self.cursor {
            Some(index) => self.entries.truncate(index + 1),
            None => self.entries.clear(),
        }
        self.entries.push(image);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step the cursor back one snapshot. Returns false when the page is
    /// already blank.
    pub fn undo(&mut self) -> bool {
        match self.cursor {
            None => false,
            Some(0) => {
                self.cursor = None;
                true
            }
            Some(index) => {
                self.cursor = Some(index - 1);
                true
            }
        }
    }

    /// The snapshot the cursor points at; `None` when the page is blank.
    pub fn current(&self) -> Option<&OverlayImage> {
        self.cursor.map(|index| &self.entries[index])
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
