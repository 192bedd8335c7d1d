//! Word placement
//!
//! Sizes terms by count and packs them onto the canvas without overlap.
//!
//! Sizing: `(relative_scaling * count / max_count + 1 - relative_scaling) *
//! max_font_size`, shrunk until the term fits the canvas, and never larger
//! than the size given to the previous rank.
//!
//! Placement: an Archimedean spiral (radius grows 0.1px per 0.1rad step,
//! stretched horizontally by the canvas aspect ratio) starting from a seeded
//! random point around the centre. The first candidate box that stays inside
//! the canvas and keeps `margin` pixels from every placed box wins. If the
//! attempt budget runs out the term is dropped.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::font::{GlyphFace, TextExtent};
use crate::config::{CanvasConfig, LayoutConfig};
use crate::errors::Result;
use crate::terms::frequency::FrequencyEntry;

/// Spiral step, in radians (and tenths of a pixel of radius).
const SPIRAL_STEP: f32 = 0.1;

/// Axis-aligned pixel box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    fn inflate(&self, by: u32) -> Rect {
        Rect {
            x: self.x - by as i32,
            y: self.y - by as i32,
            width: self.width + 2 * by,
            height: self.height + 2 * by,
        }
    }

    fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    fn inside(&self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= width as i32 && self.bottom() <= height as i32
    }
}

/// A term that found a spot on the canvas.
#[derive(Debug, Clone)]
pub(crate) struct Placement {
    pub term: String,
    pub rank: usize,
    pub font_size: f32,
    pub bounds: Rect,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Layout {
    pub placements: Vec<Placement>,
    pub dropped: Vec<String>,
}

/// Glyph size for `count`, before fitting. Monotonically non-decreasing in
/// `count`, equal to `max_font` at `max_count`.
pub(crate) fn scaled_font_size(
    count: usize,
    max_count: usize,
    max_font: f32,
    relative_scaling: f32,
) -> f32 {
    if max_count == 0 {
        return max_font;
    }
    let ratio = count.min(max_count) as f32 / max_count as f32;
    (relative_scaling * ratio + (1.0 - relative_scaling)) * max_font
}

pub(crate) struct Layouter<'a, F: GlyphFace> {
    face: &'a F,
    canvas: &'a CanvasConfig,
    config: &'a LayoutConfig,
}

impl<'a, F: GlyphFace> Layouter<'a, F> {
    pub fn new(face: &'a F, canvas: &'a CanvasConfig, config: &'a LayoutConfig) -> Self {
        Self {
            face,
            canvas,
            config,
        }
    }

    /// Upper bound for any glyph size on this canvas.
    pub fn max_font_size(&self) -> f32 {
        let shorter = self.canvas.shorter_side() as f32;
        self.config.max_font_size.unwrap_or(shorter).min(shorter)
    }

    /// Place `entries` (already ranked and capped) on the canvas.
    pub fn layout(&self, entries: &[FrequencyEntry]) -> Result<Layout> {
        let mut layout = Layout::default();
        let Some(max_count) = entries.iter().map(|e| e.count).max() else {
            return Ok(layout);
        };

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let max_font = self.max_font_size();
        let mut previous_size = max_font;

        for (rank, entry) in entries.iter().enumerate() {
            let wanted = scaled_font_size(
                entry.count,
                max_count,
                max_font,
                self.config.relative_scaling,
            )
            .max(self.config.min_font_size)
            .min(previous_size);

            let Some((size, extent)) = self.fit(&entry.term, wanted)? else {
                tracing::debug!(term = %entry.term, "term does not fit the canvas");
                layout.dropped.push(entry.term.clone());
                continue;
            };
            previous_size = size;

            match self.search(extent, &layout.placements, &mut rng) {
                Some(bounds) => layout.placements.push(Placement {
                    term: entry.term.clone(),
                    rank,
                    font_size: size,
                    bounds,
                }),
                None => {
                    tracing::debug!(term = %entry.term, size, "no free position; dropping term");
                    layout.dropped.push(entry.term.clone());
                }
            }
        }

        Ok(layout)
    }

    /// Largest size ≤ `size` (and ≥ `min_font_size`) at which `term` fits
    /// inside the canvas with its margin.
    fn fit(&self, term: &str, mut size: f32) -> Result<Option<(f32, TextExtent)>> {
        let margin = 2 * self.config.margin;
        let (avail_w, avail_h) = (
            self.canvas.width.saturating_sub(margin) as f32,
            self.canvas.height.saturating_sub(margin) as f32,
        );

        while size >= self.config.min_font_size {
            let extent = self.face.measure(term, size)?;
            if extent.width as f32 <= avail_w && extent.height as f32 <= avail_h {
                return Ok(Some((size, extent)));
            }
            let shrink = (avail_w / extent.width.max(1) as f32)
                .min(avail_h / extent.height.max(1) as f32)
                .min(1.0);
            // Scale straight to the estimate, then creep down a pixel at a
            // time for rounding in the measured extent.
            let next = (size * shrink).floor();
            size = if next < size { next } else { size - 1.0 };
        }

        Ok(None)
    }

    fn search(&self, extent: TextExtent, placed: &[Placement], rng: &mut StdRng) -> Option<Rect> {
        let (width, height) = (self.canvas.width, self.canvas.height);
        let margin = self.config.margin;

        let jitter_x = (width / 4) as i32;
        let jitter_y = (height / 4) as i32;
        let center_x = (width / 2) as i32 + rng.gen_range(-jitter_x..=jitter_x);
        let center_y = (height / 2) as i32 + rng.gen_range(-jitter_y..=jitter_y);
        // Start inside the drawable area so the first step is always a legal
        // box; `fit` guarantees the range below is non-empty.
        let origin_x = (center_x - (extent.width / 2) as i32).clamp(
            margin as i32,
            (width - margin - extent.width) as i32,
        );
        let origin_y = (center_y - (extent.height / 2) as i32).clamp(
            margin as i32,
            (height - margin - extent.height) as i32,
        );

        let aspect = width as f32 / height.max(1) as f32;

        for step in 0..self.config.max_placement_attempts {
            let t = step as f32 * SPIRAL_STEP;
            let candidate = Rect {
                x: origin_x + (aspect * t * t.cos()).round() as i32,
                y: origin_y + (t * t.sin()).round() as i32,
                width: extent.width,
                height: extent.height,
            };
            let padded = candidate.inflate(margin);
            if !padded.inside(width, height) {
                continue;
            }
            if placed.iter().all(|p| !padded.intersects(&p.bounds)) {
                return Some(candidate);
            }
        }

        None
    }
}
