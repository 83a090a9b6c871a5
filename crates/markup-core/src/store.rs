//! Single source of truth for per-page overlays and their baked/session
//! classification.
//!
//! "Baked" overlays are already embedded in the persisted document bytes;
//! "session" overlays were drawn since the last save. The effective overlay
//! for display follows a page's history cursor when one exists. Save
//! payloads transmit only the session/baked delta: a page whose session
//! image is byte-identical to its baked image is never sent again.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::document::OverlayFormat;
use crate::history::PageHistory;
use crate::image::OverlayImage;
use crate::PageNumber;

/// How long a view-reload backup stays restorable.
pub const BACKUP_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
pub struct OverlayStore {
    baked: BTreeMap<PageNumber, OverlayImage>,
    session: BTreeMap<PageNumber, OverlayImage>,
    histories: BTreeMap<PageNumber, PageHistory>,
    backup: Option<StateBackup>,
}

#[derive(Debug, Clone)]
struct StateBackup {
    baked: BTreeMap<PageNumber, OverlayImage>,
    session: BTreeMap<PageNumber, OverlayImage>,
    histories: BTreeMap<PageNumber, PageHistory>,
    page: PageNumber,
    taken_at: Instant,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset working state from a freshly loaded document.
    ///
    /// Tiered data seeds the baked tier; legacy data is treated as unsaved
    /// session ink. Either way each page with an overlay gets a one-entry
    /// history so undo can step back to blank. Any recent backup survives a
    /// load, since recovering from a view reload replays exactly this path.
    pub fn load(&mut self, format: OverlayFormat) {
        self.baked.clear();
        self.session.clear();
        self.histories.clear();
        match format {
            OverlayFormat::Tiered(map) => {
                for (page, image) in map {
                    self.histories.insert(page, PageHistory::seeded(image.clone()));
                    self.baked.insert(page, image);
                }
            }
            OverlayFormat::Legacy(map) => {
                for (page, image) in map {
                    self.histories.insert(page, PageHistory::seeded(image.clone()));
                    self.session.insert(page, image);
                }
            }
            OverlayFormat::Empty => {}
        }
    }

    /// Commit a completed stroke's snapshot for a page.
    pub fn record_snapshot(&mut self, page: PageNumber, image: OverlayImage) {
        self.histories
            .entry(page)
            .or_default()
            .record(image.clone());
        self.session.insert(page, image);
    }

    /// The overlay the page currently shows: the history cursor when a
    /// history exists, else session, else baked.
    pub fn effective_overlay(&self, page: PageNumber) -> Option<&OverlayImage> {
        if let Some(history) = self.histories.get(&page) {
            return history.current();
        }
        self.session.get(&page).or_else(|| self.baked.get(&page))
    }

    pub fn history(&self, page: PageNumber) -> Option<&PageHistory> {
        self.histories.get(&page)
    }

    /// Step a page's history back one snapshot and realign the session
    /// overlay. Returns false if there was nothing to undo.
    pub fn undo(&mut self, page: PageNumber) -> bool {
        let Some(history) = self.histories.get_mut(&page) else {
            return false;
        };
        if !history.undo() {
            return false;
        }
        match history.current().cloned() {
            Some(image) => {
                self.session.insert(page, image);
            }
            None => {
                self.session.remove(&page);
            }
        }
        true
    }

    /// Baked union session, session winning: everything currently visible.
    ///
    /// The production save path is `session_changes`; this form is kept as a
    /// diagnostic/fallback utility.
    pub fn merged_overlays(&self) -> BTreeMap<PageNumber, OverlayImage> {
        let mut merged = self.baked.clone();
        for (page, image) in &self.session {
            merged.insert(*page, image.clone());
        }
        merged
    }

    /// Session overlays that actually differ from their baked counterpart,
    /// or have none. This is the minimal payload a save needs to transmit.
    pub fn session_changes(&self) -> BTreeMap<PageNumber, OverlayImage> {
        let mut changed = BTreeMap::new();
        for (page, image) in &self.session {
            if self.baked.get(page) != Some(image) {
                changed.insert(*page, image.clone());
            }
        }
        changed
    }

    /// Mark overlays as embedded in the persisted document. Called only
    /// after the persistence layer confirms a save.
    pub fn promote_to_baked(&mut self, saved: &BTreeMap<PageNumber, OverlayImage>) {
        for (page, image) in saved {
            self.baked.insert(*page, image.clone());
        }
    }

    /// Wipe working overlays and history, e.g. after the server re-embedded
    /// all drawings into new master bytes.
    pub fn clear_all(&mut self) {
        self.baked.clear();
        self.session.clear();
        self.histories.clear();
        self.backup = None;
    }

    /// Snapshot the full in-memory state so a transient reload of the
    /// hosting view can recover unsaved ink.
    pub fn backup(&mut self, current_page: PageNumber) {
        self.backup = Some(StateBackup {
            baked: self.baked.clone(),
            session: self.session.clone(),
            histories: self.histories.clone(),
            page: current_page,
            taken_at: Instant::now(),
        });
    }

    /// Restore the most recent backup if it has not expired. Returns the
    /// page that was active when the backup was taken.
    pub fn restore(&mut self) -> Option<PageNumber> {
        self.restore_at(Instant::now())
    }

    fn restore_at(&mut self, now: Instant) -> Option<PageNumber> {
        let backup = self.backup.take()?;
        if now.saturating_duration_since(backup.taken_at) > BACKUP_TTL {
            tracing::debug!("Discarding expired state backup for page {}", backup.page);
            return None;
        }
        self.baked = backup.baked;
        self.session = backup.session;
        self.histories = backup.histories;
        Some(backup.page)
    }
}
