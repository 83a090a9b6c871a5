//! Freehand page markup over paged business documents.
//!
//! This crate is the drawing side of the document pipeline: a per-page
//! raster overlay model with snapshot-based undo, single-active-pointer
//! input arbitration, flush-safe page navigation, and a two-tier
//! (baked vs. session) overlay store so saves only transmit pages that
//! actually changed.
//!
//! Rendering is abstracted behind the [`surface::DrawSurface`] capability
//! trait; [`raster::SoftwareSurface`] is the in-memory reference
//! implementation used by tests and non-browser hosts.

pub mod document;
pub mod error;
pub mod history;
pub mod image;
pub mod pager;
pub mod raster;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod surface;

pub use document::{DocumentPayload, OverlayFormat, SaveRequest};
pub use error::MarkupError;
pub use history::PageHistory;
pub use image::OverlayImage;
pub use pager::Pager;
pub use raster::SoftwareSurface;
pub use scheduler::{IdleScheduler, IdleTask};
pub use session::MarkupSession;
pub use store::{OverlayStore, BACKUP_TTL};
pub use surface::{run_idle, DrawSurface, Point, PointerId, SurfaceController};

/// 1-indexed page number within the open document.
pub type PageNumber = u32;
