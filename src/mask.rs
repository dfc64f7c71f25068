use std::path::Path;

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use rayon::prelude::*;

use crate::config::TextConfig;
use crate::error::{SplashError, SplashResult};

/// Loads the face used for splash text: `path` when given, otherwise the
/// first proportional font egui ships with.
pub fn load_font(path: Option<&Path>) -> SplashResult<FontArc> {
    if let Some(path) = path {
        let bytes = std::fs::read(path).map_err(|source| SplashError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(FontArc::try_from_vec(bytes)?);
    }

    let definitions = eframe::egui::FontDefinitions::default();
    let name = definitions
        .families
        .get(&eframe::egui::FontFamily::Proportional)
        .and_then(|names| names.first())
        .ok_or(SplashError::NoDefaultFont)?;
    let data = definitions
        .font_data
        .get(name)
        .ok_or(SplashError::NoDefaultFont)?;
    Ok(FontArc::try_from_vec(data.font.to_vec())?)
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub font_size: f32,
    pub center_x: f32,
    pub line_centers: Vec<f32>,
}

impl TextLayout {
    /// Lines are stacked around the canvas centre, `spacing * font_size` apart.
    /// Viewports narrower than the breakpoint get the small font.
    pub fn for_viewport(text: &TextConfig, width: usize, height: usize, spacing: f32) -> Self {
        let font_size = if (width as f32) < text.breakpoint {
            text.narrow_font_size
        } else {
            text.wide_font_size
        };
        let center_y = height as f32 / 2.0;
        let middle = (text.lines.len() as f32 - 1.0) / 2.0;
        let line_centers = (0..text.lines.len())
            .map(|i| center_y + (i as f32 - middle) * font_size * spacing)
            .collect();

        Self {
            lines: text.lines.clone(),
            font_size,
            center_x: width as f32 / 2.0,
            line_centers,
        }
    }
}

pub struct AlphaMask {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
}

impl AlphaMask {
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, alpha: Vec<u8>) -> Option<Self> {
        (alpha.len() == width * height).then_some(Self { width, height, alpha })
    }

    /// Rasterises `layout` centred on each line, like canvas `fillText` with
    /// centre alignment and a middle baseline.
    pub fn from_text(font: &FontArc, layout: &TextLayout, width: usize, height: usize) -> Self {
        let mut mask = Self::empty(width, height);
        let scale = PxScale::from(layout.font_size);
        let scaled = font.as_scaled(scale);
        // ab_glyph descent is negative; this puts the em box centre on the line centre.
        let baseline_offset = (scaled.ascent() + scaled.descent()) / 2.0;

        for (line, &center_y) in layout.lines.iter().zip(&layout.line_centers) {
            let mut caret = 0.0f32;
            let mut previous: Option<GlyphId> = None;
            let mut placed = Vec::with_capacity(line.len());
            for ch in line.chars() {
                let id = scaled.glyph_id(ch);
                if let Some(prev) = previous {
                    caret += scaled.kern(prev, id);
                }
                placed.push((id, caret));
                caret += scaled.h_advance(id);
                previous = Some(id);
            }

            let left = layout.center_x - caret / 2.0;
            let baseline = center_y + baseline_offset;
            for (id, offset) in placed {
                let glyph = id.with_scale_and_position(scale, point(left + offset, baseline));
                let Some(outlined) = font.outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let x = bounds.min.x as i64 + gx as i64;
                    let y = bounds.min.y as i64 + gy as i64;
                    mask.accumulate(x, y, coverage);
                });
            }
        }

        mask
    }

    fn accumulate(&mut self, x: i64, y: i64, coverage: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
        let slot = &mut self.alpha[y as usize * self.width + x as usize];
        *slot = (*slot).max(value);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn alpha(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.alpha[y * self.width + x]
        } else {
            0
        }
    }

    pub fn is_covered(&self, x: usize, y: usize, threshold: u8) -> bool {
        self.alpha(x, y) > threshold
    }

    pub fn covered_count(&self, threshold: u8) -> usize {
        self.alpha.par_iter().filter(|&&a| a > threshold).count()
    }
}
