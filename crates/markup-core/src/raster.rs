//! In-memory RGBA implementation of the drawing-surface capability.
//!
//! The reference surface for tests and non-browser hosts: strokes are
//! stamped into a plain pixel buffer and snapshots round-trip through
//! lossless PNG encoding, so repeated undo and repaint never degrade the
//! image.

use crate::error::MarkupError;
use crate::image::OverlayImage;
use crate::surface::{DrawSurface, Point};

const INK: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    width: u32,
    height: u32,
    scale: f64,
    pixels: Vec<u8>,
}

impl SoftwareSurface {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            scale: 1.0,
            pixels: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn brush_radius(&self) -> i64 {
        (self.scale.ceil() as i64).max(1)
    }

    fn stamp(&mut self, x: f64, y: f64) {
        let cx = (x * self.scale).round() as i64;
        let cy = (y * self.scale).round() as i64;
        let radius = self.brush_radius();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let px = cx + dx;
                let py = cy + dy;
                if px < 0 || py < 0 || px >= i64::from(self.width) || py >= i64::from(self.height)
                {
                    continue;
                }
                let index = ((py as u32 * self.width + px as u32) * 4) as usize;
                self.pixels[index..index + 4].copy_from_slice(&INK);
            }
        }
    }

    fn stamp_segment(&mut self, from: Point, to: Point) {
        let span = (to.x - from.x).abs().max((to.y - from.y).abs()) * self.scale;
        let steps = span.ceil() as usize;
        if steps == 0 {
            self.stamp(to.x, to.y);
            return;
        }
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.stamp(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
        }
    }
}

impl Default for SoftwareSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawSurface for SoftwareSurface {
    fn resize(&mut self, width: u32, height: u32, scale: f64) {
        self.width = width;
        self.height = height;
        self.scale = scale;
        self.pixels = vec![0; width as usize * height as usize * 4];
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn draw_path(&mut self, points: &[Point]) {
        match points {
            [] => {}
            [single] => self.stamp(single.x, single.y),
            _ => {
                for pair in points.windows(2) {
                    self.stamp_segment(pair[0], pair[1]);
                }
            }
        }
    }

    fn draw_image(
        &mut self,
        image: &OverlayImage,
        width: f64,
        height: f64,
    ) -> Result<(), MarkupError> {
        let bytes = image.png_bytes()?;
        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let mut reader = decoder
            .read_info()
            .map_err(|e| MarkupError::InvalidImage(format!("png header: {}", e)))?;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut buf)
            .map_err(|e| MarkupError::InvalidImage(format!("png frame: {}", e)))?;
        let rgba = to_rgba(&buf[..info.buffer_size()], info.color_type)?;

        let src_width = info.width as usize;
        let src_height = info.height as usize;
        let dst_width = ((width * self.scale).round() as u32).min(self.width) as usize;
        let dst_height = ((height * self.scale).round() as u32).min(self.height) as usize;
        if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
            return Ok(());
        }
        for dy in 0..dst_height {
            let sy = dy * src_height / dst_height;
            for dx in 0..dst_width {
                let sx = dx * src_width / dst_width;
                let src = (sy * src_width + sx) * 4;
                let dst = (dy * self.width as usize + dx) * 4;
                self.pixels[dst..dst + 4].copy_from_slice(&rgba[src..src + 4]);
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<OverlayImage, MarkupError> {
        if self.width == 0 || self.height == 0 {
            return Err(MarkupError::SnapshotError(
                "surface has no backing store".to_string(),
            ));
        }
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| MarkupError::SnapshotError(e.to_string()))?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|e| MarkupError::SnapshotError(e.to_string()))?;
        }
        OverlayImage::from_png_bytes(&bytes)
    }

    fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }
}

fn to_rgba(data: &[u8], color_type: png::ColorType) -> Result<Vec<u8>, MarkupError> {
    match color_type {
        png::ColorType::Rgba => Ok(data.to_vec()),
        png::ColorType::Rgb => {
            let mut rgba = Vec::with_capacity(data.len() / 3 * 4);
            for px in data.chunks_exact(3) {
                rgba.extend_from_slice(px);
                rgba.push(255);
            }
            Ok(rgba)
        }
        other => Err(MarkupError::InvalidImage(format!(
            "unsupported png color type: {:?}",
            other
        ))),
    }
}
