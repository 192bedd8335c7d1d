//! Word cloud rendering
//!
//! This module lays out a frequency table and rasterizes it into a single
//! RGB image. Layout state never leaves the module; callers only see the
//! finished [`RenderedImage`].

pub mod font;
pub(crate) mod layout;
pub mod palette;

use std::io::Cursor;

use base64::Engine as _;
use image::{ImageFormat, Rgb, RgbImage};

use crate::config::{CanvasConfig, LayoutConfig, MAX_WORDS_LIMIT};
use crate::errors::Result;
use crate::terms::frequency::FrequencyTable;
use font::GlyphFace;
use layout::Layouter;

pub use font::{FontResource, TextExtent};

/// A flattened word cloud raster.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    image: RgbImage,
    placed_terms: Vec<String>,
}

impl RenderedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGB bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    /// Terms that made it onto the canvas, in rank order.
    pub fn placed_terms(&self) -> &[String] {
        &self.placed_terms
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }

    /// PNG bytes as standard base64, the form the hosting sink accepts.
    pub fn to_base64_png(&self) -> Result<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.to_png()?))
    }
}

/// Lays out and rasterizes frequency tables.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    canvas: &'a CanvasConfig,
    layout: &'a LayoutConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(canvas: &'a CanvasConfig, layout: &'a LayoutConfig) -> Self {
        Self { canvas, layout }
    }

    /// Draw the top `max_words` terms of `table` with `face`, never more than
    /// [`MAX_WORDS_LIMIT`].
    ///
    /// Terms that cannot be placed are left out; a glyph the face cannot draw
    /// fails the whole render.
    pub fn render<F: GlyphFace>(&self, table: &FrequencyTable, face: &F) -> Result<RenderedImage> {
        let entries = table.top(self.layout.max_words.min(MAX_WORDS_LIMIT));
        let layout = Layouter::new(face, self.canvas, self.layout).layout(&entries)?;

        if !layout.dropped.is_empty() {
            tracing::debug!(
                placed = layout.placements.len(),
                dropped = layout.dropped.len(),
                "layout finished with dropped terms"
            );
        }

        let mut image = RgbImage::from_pixel(
            self.canvas.width,
            self.canvas.height,
            Rgb(self.canvas.background),
        );

        for placement in &layout.placements {
            let color = palette::color_for_rank(placement.rank);
            let (left, top) = (placement.bounds.x, placement.bounds.y);
            face.draw(&placement.term, placement.font_size, &mut |x, y, coverage| {
                blend(&mut image, left + x, top + y, color, coverage);
            })?;
        }

        Ok(RenderedImage {
            image,
            placed_terms: layout.placements.into_iter().map(|p| p.term).collect(),
        })
    }
}

/// Alpha-blend `color` into the pixel at `(x, y)`; out-of-bounds is ignored.
fn blend(image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= image.width() || y as u32 >= image.height() {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0);
    let pixel = image.get_pixel_mut(x as u32, y as u32);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = (*dst as f32 * (1.0 - alpha) + src as f32 * alpha).round() as u8;
    }
}
