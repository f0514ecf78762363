//! Tile artwork. The default rasterizer paints the card background and the
//! icon plate; glyph rendering belongs to whichever host owns a font stack.

use image::{Rgba as Pixel, RgbaImage};

pub const DEFAULT_TILE_PIXELS: u32 = 512;

const BACKGROUND_START: [f32; 4] = [18.0, 20.0, 22.0, 0.92];
const BACKGROUND_END: [f32; 4] = [24.0, 26.0, 28.0, 0.88];
const INNER_PANEL: [f32; 4] = [255.0, 255.0, 255.0, 0.02];
const PLATE_INNER: [f32; 4] = [143.0, 214.0, 203.0, 0.18];
const PLATE_OUTER: [f32; 4] = [143.0, 214.0, 203.0, 0.06];
const PLATE_RING: [f32; 4] = [143.0, 214.0, 203.0, 0.08];

pub trait TileRasterizer {
    fn rasterize(&self, icon: &str, label: &str) -> RgbaImage;
}

#[derive(Debug, Clone, Copy)]
pub struct PlateRasterizer {
    pub size: u32,
}

impl Default for PlateRasterizer {
    fn default() -> Self {
        Self {
            size: DEFAULT_TILE_PIXELS,
        }
    }
}

impl PlateRasterizer {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }
}

impl TileRasterizer for PlateRasterizer {
    fn rasterize(&self, _icon: &str, _label: &str) -> RgbaImage {
        let size = self.size.max(1);
        let extent = size as f32;
        let pad = (extent * 0.06).round();
        let corner = 22.0 * extent / DEFAULT_TILE_PIXELS as f32;
        let plate_center = (extent * 0.5, extent * 0.42);
        let plate_radius = extent * 0.24;
        let ring_width = (extent * 0.007).max(2.0);
        // radial gradient starts offset toward the upper left, like a lit plate
        let highlight = (
            plate_center.0 - plate_radius * 0.3,
            plate_center.1 - plate_radius * 0.3,
        );

        RgbaImage::from_fn(size, size, |x, y| {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;

            let t = ((px + py) / (2.0 * extent)).clamp(0.0, 1.0);
            let mut color = mix(BACKGROUND_START, BACKGROUND_END, t);

            if inside_rounded_rect(px, py, pad, pad, extent - pad * 2.0, extent - pad * 2.0, corner) {
                color = over(color, INNER_PANEL);
            }

            let distance = ((px - plate_center.0).powi(2) + (py - plate_center.1).powi(2)).sqrt();
            if distance <= plate_radius {
                let from_highlight = ((px - highlight.0).powi(2) + (py - highlight.1).powi(2)).sqrt();
                let inner = plate_radius * 0.2;
                let g = ((from_highlight - inner) / (plate_radius - inner)).clamp(0.0, 1.0);
                color = over(color, mix(PLATE_INNER, PLATE_OUTER, g));
            }
            if (distance - plate_radius).abs() <= ring_width * 0.5 {
                color = over(color, PLATE_RING);
            }

            to_pixel(color)
        })
    }
}

fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Source-over compositing with non-premultiplied colors.
fn over(dst: [f32; 4], src: [f32; 4]) -> [f32; 4] {
    let alpha = src[3] + dst[3] * (1.0 - src[3]);
    if alpha <= f32::EPSILON {
        return [0.0; 4];
    }
    let channel = |s: f32, d: f32| (s * src[3] + d * dst[3] * (1.0 - src[3])) / alpha;
    [
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        alpha,
    ]
}

fn to_pixel(color: [f32; 4]) -> Pixel<u8> {
    Pixel([
        color[0].round().clamp(0.0, 255.0) as u8,
        color[1].round().clamp(0.0, 255.0) as u8,
        color[2].round().clamp(0.0, 255.0) as u8,
        (color[3] * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

fn inside_rounded_rect(px: f32, py: f32, x: f32, y: f32, w: f32, h: f32, radius: f32) -> bool {
    if px < x || py < y || px > x + w || py > y + h {
        return false;
    }
    let r = radius.min(w * 0.5).min(h * 0.5).max(0.0);
    let cx = px.clamp(x + r, x + w - r);
    let cy = py.clamp(y + r, y + h - r);
    (px - cx).powi(2) + (py - cy).powi(2) <= r * r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_requested_size() {
        let image = PlateRasterizer::new(64).rasterize("🐳", "Docker");
        assert_eq!(image.dimensions(), (64, 64));
    }

    #[test]
    fn background_is_translucent_and_plate_is_tinted() {
        let image = PlateRasterizer::new(128).rasterize("JS", "JS / TS");
        let corner = image.get_pixel(0, 0);
        assert!(corner[3] > 200 && corner[3] < 255, "corner alpha {}", corner[3]);
        assert!(corner[0] < 40);

        let plate = image.get_pixel(64, (128.0 * 0.42) as u32);
        assert!(plate[1] > corner[1], "plate should pick up the mint tint");
    }

    #[test]
    fn rounded_rect_excludes_corners() {
        assert!(inside_rounded_rect(50.0, 50.0, 0.0, 0.0, 100.0, 100.0, 20.0));
        assert!(!inside_rounded_rect(1.0, 1.0, 0.0, 0.0, 100.0, 100.0, 20.0));
        assert!(!inside_rounded_rect(150.0, 50.0, 0.0, 0.0, 100.0, 100.0, 20.0));
    }
}
