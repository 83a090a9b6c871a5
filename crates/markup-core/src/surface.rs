//! Pointer input, stroke capture, and the drawing-surface capability trait.
//!
//! A surface shows exactly one page at a time. At most one pointer may draw
//! at once: the first pointer down claims the surface and every other
//! pointer is ignored until it releases or cancels (palm rejection). Strokes
//! render directly onto the surface; only the resulting full-page snapshot
//! is kept, deferred to the idle queue so commit work never delays the next
//! input frame.

use std::time::{Duration, Instant};

use crate::error::MarkupError;
use crate::image::OverlayImage;
use crate::scheduler::{IdleScheduler, IdleTask};
use crate::store::OverlayStore;
use crate::PageNumber;

/// Pointer identifier as reported by the host's input events.
pub type PointerId = u64;

/// A point in surface-local logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Minimum interval between intermediate stroke redraws (~60 Hz). Only the
/// redraw cadence is throttled; every point still lands in the final path.
const MOVE_REDRAW_INTERVAL: Duration = Duration::from_millis(16);

/// Capability interface over a platform 2D drawing surface.
pub trait DrawSurface {
    /// Size the backing store to `width`x`height` device pixels at the given
    /// device pixel ratio, clearing any existing content.
    fn resize(&mut self, width: u32, height: u32, scale: f64);

    fn clear(&mut self);

    /// Stroke a polyline through `points` in logical coordinates. A single
    /// point draws a dot.
    fn draw_path(&mut self, points: &[Point]);

    /// Paint a decoded overlay raster at the given logical size.
    fn draw_image(
        &mut self,
        image: &OverlayImage,
        width: f64,
        height: f64,
    ) -> Result<(), MarkupError>;

    /// Losslessly capture the full surface.
    fn snapshot(&self) -> Result<OverlayImage, MarkupError>;

    /// Whether the surface holds any ink at all.
    fn is_blank(&self) -> bool;
}

/// Translates raw pointer input into strokes on the active page and commits
/// one history snapshot per completed stroke.
#[derive(Debug)]
pub struct SurfaceController<S> {
    surface: S,
    page: Option<PageNumber>,
    display_width: f64,
    display_height: f64,
    device_pixel_ratio: f64,
    enabled: bool,
    active_pointer: Option<PointerId>,
    path: Vec<Point>,
    rendered: usize,
    last_redraw: Option<Instant>,
    pending_capture: bool,
}

impl<S: DrawSurface> SurfaceController<S> {
    pub fn new(surface: S, device_pixel_ratio: f64) -> Self {
        Self {
            surface,
            page: None,
            display_width: 0.0,
            display_height: 0.0,
            device_pixel_ratio,
            enabled: true,
            active_pointer: None,
            path: Vec::new(),
            rendered: 0,
            last_redraw: None,
            pending_capture: false,
        }
    }

    /// Size the surface for a page and paint its current overlay. A decode
    /// failure leaves the surface blank.
    pub fn initialize_surface(
        &mut self,
        page: PageNumber,
        display_width: f64,
        display_height: f64,
        store: &OverlayStore,
    ) {
        let device_width = (display_width * self.device_pixel_ratio).round() as u32;
        let device_height = (display_height * self.device_pixel_ratio).round() as u32;
        self.surface
            .resize(device_width, device_height, self.device_pixel_ratio);
        self.surface.clear();
        self.page = Some(page);
        self.display_width = display_width;
        self.display_height = display_height;
        self.active_pointer = None;
        self.path.clear();
        self.rendered = 0;
        self.pending_capture = false;
        if let Some(image) = store.effective_overlay(page) {
            if let Err(e) = self.surface.draw_image(image, display_width, display_height) {
                tracing::warn!(
                    "Overlay for page {} failed to decode, leaving surface blank: {}",
                    page,
                    e
                );
                self.surface.clear();
            }
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_ready(&self) -> bool {
        self.page.is_some()
    }

    pub fn page(&self) -> Option<PageNumber> {
        self.page
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn active_pointer(&self) -> Option<PointerId> {
        self.active_pointer
    }

    pub fn has_pending_capture(&self) -> bool {
        self.pending_capture
    }

    /// Claim the pointer and start a stroke. Pointers arriving while one is
    /// active are ignored.
    pub fn pointer_down(&mut self, pointer: PointerId, position: Point) {
        if !self.enabled || self.page.is_none() || self.active_pointer.is_some() {
            return;
        }
        self.active_pointer = Some(pointer);
        self.path.clear();
        self.path.push(position);
        // A tap with no movement still leaves visible ink.
        self.surface.draw_path(&self.path);
        self.rendered = 1;
        self.last_redraw = Some(Instant::now());
    }

    /// Extend the active stroke. Redraws are throttled; the recorded path is
    /// not.
    pub fn pointer_move(&mut self, pointer: PointerId, position: Point) {
        if self.active_pointer != Some(pointer) || self.path.is_empty() {
            return;
        }
        self.path.push(position);
        let due = self
            .last_redraw
            .map_or(true, |at| at.elapsed() >= MOVE_REDRAW_INTERVAL);
        if due {
            self.render_pending_segment();
            self.last_redraw = Some(Instant::now());
        }
    }

    /// Finish the stroke and defer its snapshot to the idle queue.
    pub fn pointer_up(&mut self, pointer: PointerId, scheduler: &mut IdleScheduler) {
        if self.active_pointer != Some(pointer) {
            return;
        }
        self.render_pending_segment();
        self.active_pointer = None;
        self.path.clear();
        self.rendered = 0;
        self.pending_capture = true;
        if let Some(page) = self.page {
            scheduler.defer_capture(page);
        }
    }

    /// Abort the stroke without committing a snapshot.
    pub fn pointer_cancel(&mut self, pointer: PointerId) {
        if self.active_pointer != Some(pointer) {
            return;
        }
        self.active_pointer = None;
        self.path.clear();
        self.rendered = 0;
    }

    /// Drop any in-flight pointer state (page switches, editor shutdown).
    pub fn reset_input(&mut self) {
        self.active_pointer = None;
        self.path.clear();
        self.rendered = 0;
    }

    /// Capture the surface into the page's history if a commit is due.
    pub fn capture_pending(&mut self, store: &mut OverlayStore) {
        if !self.pending_capture {
            return;
        }
        let Some(page) = self.page else { return };
        self.pending_capture = false;
        match self.surface.snapshot() {
            Ok(image) => store.record_snapshot(page, image),
            Err(e) => tracing::warn!("Snapshot capture for page {} failed: {}", page, e),
        }
    }

    /// Flush uncommitted ink before the surface moves to another page.
    pub fn flush_pending(&mut self, store: &mut OverlayStore) {
        if self.pending_capture && !self.surface.is_blank() {
            self.capture_pending(store);
        }
        self.pending_capture = false;
    }

    /// Step the page's history back and repaint the surface from the new
    /// cursor position.
    pub fn undo(&mut self, page: PageNumber, store: &mut OverlayStore) {
        if !store.undo(page) {
            return;
        }
        self.surface.clear();
        if let Some(image) = store.effective_overlay(page) {
            if let Err(e) =
                self.surface
                    .draw_image(image, self.display_width, self.display_height)
            {
                tracing::warn!("Repaint after undo failed for page {}: {}", page, e);
                self.surface.clear();
            }
        }
    }

    /// Forget the page binding; the host must reinitialize the surface
    /// before drawing resumes.
    pub fn invalidate(&mut self) {
        self.page = None;
        self.reset_input();
        self.pending_capture = false;
    }

    fn render_pending_segment(&mut self) {
        if self.path.len() > self.rendered {
            // Re-include the last rendered point so segments stay connected.
            let start = self.rendered.saturating_sub(1);
            self.surface.draw_path(&self.path[start..]);
            self.rendered = self.path.len();
        }
    }
}

/// Drain deferred idle work. Captures queued for a page the surface no
/// longer shows are dropped.
pub fn run_idle<S: DrawSurface>(
    scheduler: &mut IdleScheduler,
    controller: &mut SurfaceController<S>,
    store: &mut OverlayStore,
) {
    while let Some(task) = scheduler.pop() {
        match task {
            IdleTask::CaptureSnapshot { page } => {
                if controller.page() == Some(page) {
                    controller.capture_pending(store);
                } else {
                    tracing::debug!("Dropping stale snapshot capture for page {}", page);
                }
            }
        }
    }
}
