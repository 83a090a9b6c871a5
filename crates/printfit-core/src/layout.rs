//! Target page geometry for physical printing.
//!
//! Source pages of arbitrary size are refit onto a fixed physical page:
//! uniform scale-to-fit, horizontally centered, flush to the top edge so
//! annotation anchors near the top stay predictable across pages of varying
//! height.

/// Physical page size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// US Letter, 8.5 x 11 inches at 72 dpi.
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
}

/// Where a source page lands on the target page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

impl Placement {
    /// Fit a `source_width` x `source_height` page into `target` without
    /// cropping: uniform scale, centered horizontally, top aligned.
    pub fn compute(source_width: f64, source_height: f64, target: PageSize) -> Placement {
        let scale = (target.width / source_width).min(target.height / source_height);
        Placement {
            scale,
            x: (target.width - source_width * scale) / 2.0,
            y: target.height - source_height * scale,
        }
    }

    pub fn is_identity(&self) -> bool {
        (self.scale - 1.0).abs() < 1e-9 && self.x.abs() < 1e-9 && self.y.abs() < 1e-9
    }
}
