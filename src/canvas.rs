use serde::{Deserialize, Serialize};

use crate::mask::AlphaMask;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const ORANGE: Rgba = Rgba::rgb(255, 153, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::rgba(0, 0, 0, 0); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// A zero-area canvas cannot be drawn to; frames skip it.
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, Rgba::rgba(0, 0, 0, 0));
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    fn blend(&mut self, x: usize, y: usize, color: Rgba, coverage: f32) {
        let alpha = color.a as f32 / 255.0 * coverage;
        if alpha <= 0.0 {
            return;
        }
        let dst = &mut self.pixels[y * self.width + x];
        let mix = |s: u8, d: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
        *dst = Rgba {
            r: mix(color.r, dst.r),
            g: mix(color.g, dst.g),
            b: mix(color.b, dst.b),
            a: (alpha * 255.0 + dst.a as f32 * (1.0 - alpha)).round().min(255.0) as u8,
        };
    }

    pub fn fill_square(&mut self, x: f32, y: f32, size: f32, color: Rgba) {
        if !(x.is_finite() && y.is_finite()) || size <= 0.0 {
            return;
        }
        let (x1, y1) = (x + size, y + size);
        let col_start = x.floor().max(0.0) as usize;
        let row_start = y.floor().max(0.0) as usize;
        let col_end = (x1.ceil().max(0.0) as usize).min(self.width);
        let row_end = (y1.ceil().max(0.0) as usize).min(self.height);

        for row in row_start..row_end {
            let cover_y = (y1.min(row as f32 + 1.0) - y.max(row as f32)).max(0.0);
            for col in col_start..col_end {
                let cover_x = (x1.min(col as f32 + 1.0) - x.max(col as f32)).max(0.0);
                self.blend(col, row, color, cover_x * cover_y);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        if !(cx.is_finite() && cy.is_finite()) || radius <= 0.0 {
            return;
        }
        let reach = radius + 0.5;
        let col_start = (cx - reach).floor().max(0.0) as usize;
        let row_start = (cy - reach).floor().max(0.0) as usize;
        let col_end = ((cx + reach).ceil().max(0.0) as usize).min(self.width);
        let row_end = ((cy + reach).ceil().max(0.0) as usize).min(self.height);

        // Circles under a pixel wide get their area as coverage instead.
        let area_scale = (std::f32::consts::PI * radius * radius).min(1.0);

        for row in row_start..row_end {
            for col in col_start..col_end {
                let dx = col as f32 + 0.5 - cx;
                let dy = row as f32 + 0.5 - cy;
                let distance = (dx * dx + dy * dy).sqrt();
                let coverage = (radius - distance + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(col, row, color, coverage * area_scale);
                }
            }
        }
    }

    pub fn blend_mask(&mut self, mask: &AlphaMask, color: Rgba, opacity: f32) {
        let width = self.width.min(mask.width());
        let height = self.height.min(mask.height());
        for y in 0..height {
            for x in 0..width {
                let coverage = mask.alpha(x, y) as f32 / 255.0;
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage * opacity);
                }
            }
        }
    }

    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_paints_every_pixel() {
        let mut canvas = Canvas::new(4, 3);
        canvas.clear(Rgba::BLACK);
        assert!(canvas.to_rgba8().chunks(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn opaque_square_covers_whole_pixels() {
        let mut canvas = Canvas::new(8, 8);
        canvas.clear(Rgba::BLACK);
        canvas.fill_square(2.0, 2.0, 2.0, Rgba::WHITE);
        assert_eq!(canvas.pixel(2, 2), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(3, 3), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(4, 4), Some(Rgba::BLACK));
    }

    #[test]
    fn subpixel_square_blends_partially() {
        let mut canvas = Canvas::new(4, 4);
        canvas.clear(Rgba::BLACK);
        canvas.fill_square(1.0, 1.0, 0.5, Rgba::WHITE);
        let p = canvas.pixel(1, 1).unwrap();
        assert!(p.r > 0 && p.r < 255, "got {p:?}");
    }

    #[test]
    fn offscreen_and_nan_shapes_are_ignored() {
        let mut canvas = Canvas::new(4, 4);
        canvas.clear(Rgba::BLACK);
        canvas.fill_square(-10.0, -10.0, 2.0, Rgba::WHITE);
        canvas.fill_square(f32::NAN, 1.0, 2.0, Rgba::WHITE);
        canvas.fill_circle(100.0, 100.0, 3.0, Rgba::WHITE);
        assert!(canvas.to_rgba8().chunks(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn circle_centre_is_solid() {
        let mut canvas = Canvas::new(10, 10);
        canvas.clear(Rgba::BLACK);
        canvas.fill_circle(5.0, 5.0, 3.0, Rgba::ORANGE);
        assert_eq!(canvas.pixel(5, 5), Some(Rgba::ORANGE));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::BLACK));
    }

    #[test]
    fn with_opacity_scales_alpha() {
        assert_eq!(Rgba::ORANGE.with_opacity(0.0).a, 0);
        assert_eq!(Rgba::ORANGE.with_opacity(2.0).a, 255);
        assert!((76..=77).contains(&Rgba::WHITE.with_opacity(0.3).a));
    }
}
