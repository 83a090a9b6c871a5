//! Editing session over a single open document.
//!
//! Owns the overlay store, drawing controller, pager, and idle queue, and is
//! the surface the hosting view drives: pointer events in, save payloads
//! out. One session exists per open document; all in-memory state dies with
//! it unless a backup was taken just before a transient view reload.

use std::collections::BTreeMap;

use crate::document::{DocumentPayload, SaveRequest};
use crate::image::OverlayImage;
use crate::pager::Pager;
use crate::scheduler::IdleScheduler;
use crate::store::OverlayStore;
use crate::surface::{run_idle, DrawSurface, Point, PointerId, SurfaceController};
use crate::PageNumber;

pub struct MarkupSession<S> {
    store: OverlayStore,
    controller: SurfaceController<S>,
    pager: Pager,
    scheduler: IdleScheduler,
    page_count: u32,
}

impl<S: DrawSurface> MarkupSession<S> {
    /// Open a document for markup. The overlay encoding is resolved once,
    /// here, at the boundary.
    pub fn open(surface: S, device_pixel_ratio: f64, payload: &DocumentPayload) -> Self {
        let mut store = OverlayStore::new();
        store.load(payload.overlay_format());
        Self {
            store,
            controller: SurfaceController::new(surface, device_pixel_ratio),
            pager: Pager::new(),
            scheduler: IdleScheduler::new(),
            page_count: payload.page_count,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn current_page(&self) -> PageNumber {
        self.pager.current()
    }

    pub fn store(&self) -> &OverlayStore {
        &self.store
    }

    pub fn surface(&self) -> &S {
        self.controller.surface()
    }

    /// Size the surface for the current page and paint its overlay.
    pub fn open_page(&mut self, display_width: f64, display_height: f64) {
        self.controller.initialize_surface(
            self.pager.current(),
            display_width,
            display_height,
            &self.store,
        );
    }

    pub fn set_drawing_enabled(&mut self, enabled: bool) {
        self.controller.set_enabled(enabled);
    }

    pub fn pointer_down(&mut self, pointer: PointerId, position: Point) {
        self.controller.pointer_down(pointer, position);
    }

    pub fn pointer_move(&mut self, pointer: PointerId, position: Point) {
        self.controller.pointer_move(pointer, position);
    }

    pub fn pointer_up(&mut self, pointer: PointerId) {
        self.controller.pointer_up(pointer, &mut self.scheduler);
    }

    pub fn pointer_cancel(&mut self, pointer: PointerId) {
        self.controller.pointer_cancel(pointer);
    }

    /// Drain deferred snapshot work; the host calls this when idle.
    pub fn run_idle(&mut self) {
        run_idle(&mut self.scheduler, &mut self.controller, &mut self.store);
    }

    /// Undo the last committed stroke on the current page.
    pub fn undo(&mut self) {
        let page = self.pager.current();
        self.controller.undo(page, &mut self.store);
    }

    pub fn goto_page(&mut self, target: PageNumber) -> bool {
        self.pager.goto_page(
            target,
            self.page_count,
            &mut self.controller,
            &mut self.store,
            &mut self.scheduler,
        )
    }

    pub fn next_page(&mut self) -> bool {
        self.pager.next(
            self.page_count,
            &mut self.controller,
            &mut self.store,
            &mut self.scheduler,
        )
    }

    pub fn previous_page(&mut self) -> bool {
        self.pager.previous(
            self.page_count,
            &mut self.controller,
            &mut self.store,
            &mut self.scheduler,
        )
    }

    pub fn first_page(&mut self) -> bool {
        self.pager.first(
            self.page_count,
            &mut self.controller,
            &mut self.store,
            &mut self.scheduler,
        )
    }

    pub fn last_page(&mut self) -> bool {
        self.pager.last(
            self.page_count,
            &mut self.controller,
            &mut self.store,
            &mut self.scheduler,
        )
    }

    /// Whether unsaved session ink exists.
    pub fn has_changes(&self) -> bool {
        !self.store.session_changes().is_empty()
    }

    /// Build the minimal save payload: changed overlays plus page metadata.
    /// Pending ink is flushed first so the payload matches the surface.
    pub fn save_request(&mut self, forced_status: Option<String>) -> SaveRequest {
        self.controller.flush_pending(&mut self.store);
        SaveRequest::new(
            self.store.session_changes(),
            self.pager.current(),
            forced_status,
        )
    }

    /// Promote transmitted overlays to baked once the persistence layer
    /// confirms the save.
    pub fn mark_saved(&mut self, saved: &BTreeMap<PageNumber, OverlayImage>) {
        self.store.promote_to_baked(saved);
    }

    /// Everything currently visible, independent of change detection.
    pub fn merged_overlays(&self) -> BTreeMap<PageNumber, OverlayImage> {
        self.store.merged_overlays()
    }

    /// Reset working state after the server re-embedded all drawings into
    /// new master bytes.
    pub fn clear_all(&mut self) {
        self.store.clear_all();
        self.controller.invalidate();
    }

    /// Snapshot in-memory state ahead of a transient view reload.
    pub fn backup(&mut self) {
        let page = self.pager.current();
        self.store.backup(page);
    }

    /// Recover a recent backup. Returns the page that was active when it was
    /// taken, or None once the backup expired.
    pub fn restore(&mut self) -> Option<PageNumber> {
        let page = self.store.restore()?;
        self.pager.set_current(page);
        self.controller.invalidate();
        Some(page)
    }
}
