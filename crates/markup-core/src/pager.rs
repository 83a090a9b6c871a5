//! Active-page navigation with flush-before-switch.
//!
//! Drawing state lives in a surface bound to a single page, so navigation is
//! the one place an uncommitted stroke could be silently lost. Every switch
//! captures outgoing ink into the page's history before the surface is
//! rebound.

use crate::scheduler::IdleScheduler;
use crate::store::OverlayStore;
use crate::surface::{DrawSurface, SurfaceController};
use crate::PageNumber;

#[derive(Debug)]
pub struct Pager {
    current: PageNumber,
}

impl Pager {
    pub fn new() -> Self {
        Self { current: 1 }
    }

    pub fn current(&self) -> PageNumber {
        self.current
    }

    pub(crate) fn set_current(&mut self, page: PageNumber) {
        self.current = page;
    }

    /// Switch to `target`, flushing outgoing ink first. Out-of-range targets
    /// are rejected as a no-op. After a switch the surface is invalidated;
    /// the host reinitializes it against the new page's dimensions and
    /// overlay.
    pub fn goto_page<S: DrawSurface>(
        &mut self,
        target: PageNumber,
        total_pages: PageNumber,
        controller: &mut SurfaceController<S>,
        store: &mut OverlayStore,
        scheduler: &mut IdleScheduler,
    ) -> bool {
        if target == 0 || target > total_pages {
            return false;
        }
        controller.reset_input();
        controller.flush_pending(store);
        scheduler.cancel_page(self.current);
        self.current = target;
        controller.invalidate();
        true
    }

    pub fn next<S: DrawSurface>(
        &mut self,
        total_pages: PageNumber,
        controller: &mut SurfaceController<S>,
        store: &mut OverlayStore,
        scheduler: &mut IdleScheduler,
    ) -> bool {
        if self.current >= total_pages {
            return false;
        }
        self.goto_page(self.current + 1, total_pages, controller, store, scheduler)
    }

    pub fn previous<S: DrawSurface>(
        &mut self,
        total_pages: PageNumber,
        controller: &mut SurfaceController<S>,
        store: &mut OverlayStore,
        scheduler: &mut IdleScheduler,
    ) -> bool {
        if self.current <= 1 {
            return false;
        }
        self.goto_page(self.current - 1, total_pages, controller, store, scheduler)
    }

    pub fn first<S: DrawSurface>(
        &mut self,
        total_pages: PageNumber,
        controller: &mut SurfaceController<S>,
        store: &mut OverlayStore,
        scheduler: &mut IdleScheduler,
    ) -> bool {
        if self.current == 1 {
            return false;
        }
        self.goto_page(1, total_pages, controller, store, scheduler)
    }

    pub fn last<S: DrawSurface>(
        &mut self,
        total_pages: PageNumber,
        controller: &mut SurfaceController<S>,
        store: &mut OverlayStore,
        scheduler: &mut IdleScheduler,
    ) -> bool {
        if total_pages == 0 || self.current == total_pages {
            return false;
        }
        self.goto_page(total_pages, total_pages, controller, store, scheduler)
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new()
    }
}
