//! Font resource
//!
//! Locates a CJK-capable font among a prioritized list of candidate paths and
//! exposes it to the layout and raster code through the [`GlyphFace`] trait.
//! The font is loaded once at startup and only read afterwards.

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, Glyph, GlyphId, PxScale, ScaleFont};

use crate::config::FontConfig;
use crate::errors::{Result, WordCloudError};

/// Character every usable font must cover.
pub const CJK_PROBE: char = '中';

/// Pixel size of a rendered term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

/// What the renderer needs from a font.
pub trait GlyphFace {
    /// Bounding box of `text` set on one line at `size` pixels.
    fn measure(&self, text: &str, size: f32) -> Result<TextExtent>;

    /// Rasterize `text` at `size` pixels.
    ///
    /// `plot(x, y, coverage)` is called for every touched pixel, with
    /// coordinates relative to the top-left of the measured box and coverage
    /// in `0.0..=1.0`.
    fn draw(&self, text: &str, size: f32, plot: &mut dyn FnMut(i32, i32, f32)) -> Result<()>;
}

/// A parsed TrueType/OpenType font.
pub struct FontResource {
    font: FontVec,
    path: PathBuf,
}

impl std::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResource")
            .field("path", &self.path)
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl FontResource {
    /// Load the first candidate that exists on disk.
    ///
    /// A candidate that exists but cannot be used is an error; it is not
    /// skipped in favour of later candidates.
    pub fn locate(config: &FontConfig) -> Result<Self> {
        let mut tried = Vec::with_capacity(config.candidates.len());
        for candidate in &config.candidates {
            if candidate.is_file() {
                let font = Self::load(candidate, config.collection_index)?;
                tracing::info!(path = %candidate.display(), "using font");
                return Ok(font);
            }
            tracing::debug!(path = %candidate.display(), "font candidate not found");
            tried.push(candidate.clone());
        }
        Err(WordCloudError::FontNotFound { tried })
    }

    /// Load a font file; `index` selects the face inside a collection.
    pub fn load(path: impl AsRef<Path>, index: u32) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| WordCloudError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(data, index, path)
    }

    /// Parse font bytes; `origin` is only used for error messages.
    pub fn from_bytes(data: Vec<u8>, index: u32, origin: impl Into<PathBuf>) -> Result<Self> {
        let path = origin.into();
        let font = match FontVec::try_from_vec_and_index(data, index) {
            Ok(font) => font,
            Err(_) => return Err(WordCloudError::FontInvalid { path }),
        };
        if font.glyph_id(CJK_PROBE).0 == 0 {
            return Err(WordCloudError::FontLacksCjk { path });
        }
        Ok(Self { font, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Position glyphs on a single baseline; returns them and the advance.
    fn layout_glyphs(&self, text: &str, size: f32) -> Result<(Vec<Glyph>, f32)> {
        let scale = PxScale::from(size);
        let scaled = self.font.as_scaled(scale);
        let ascent = scaled.ascent();

        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret = 0.0f32;
        let mut previous: Option<GlyphId> = None;

        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if id.0 == 0 {
                return Err(WordCloudError::MissingGlyph {
                    term: text.to_string(),
                    ch,
                });
            }
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(caret, ascent)));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }

        Ok((glyphs, caret))
    }
}

impl GlyphFace for FontResource {
    fn measure(&self, text: &str, size: f32) -> Result<TextExtent> {
        let (_, advance) = self.layout_glyphs(text, size)?;
        let scaled = self.font.as_scaled(PxScale::from(size));
        Ok(TextExtent {
            width: advance.ceil().max(0.0) as u32,
            height: (scaled.ascent() - scaled.descent()).ceil().max(0.0) as u32,
        })
    }

    fn draw(&self, text: &str, size: f32, plot: &mut dyn FnMut(i32, i32, f32)) -> Result<()> {
        let (glyphs, _) = self.layout_glyphs(text, size)?;
        for glyph in glyphs {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let (left, top) = (bounds.min.x as i32, bounds.min.y as i32);
                outlined.draw(|x, y, coverage| plot(left + x as i32, top + y as i32, coverage));
            }
        }
        Ok(())
    }
}

/// Square-glyph face for tests: every character is a solid `size × size`
/// block, and `'?'` is treated as missing.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BlockFace;

#[cfg(test)]
impl GlyphFace for BlockFace {
    fn measure(&self, text: &str, size: f32) -> Result<TextExtent> {
        if let Some(ch) = text.chars().find(|&c| c == '?') {
            return Err(WordCloudError::MissingGlyph {
                term: text.to_string(),
                ch,
            });
        }
        let side = size.ceil() as u32;
        Ok(TextExtent {
            width: side * text.chars().count() as u32,
            height: side,
        })
    }

    fn draw(&self, text: &str, size: f32, plot: &mut dyn FnMut(i32, i32, f32)) -> Result<()> {
        let extent = self.measure(text, size)?;
        for y in 0..extent.height as i32 {
            for x in 0..extent.width as i32 {
                plot(x, y, 1.0);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_locate_reports_every_missing_candidate() {
        let config = FontConfig {
            candidates: vec![
                PathBuf::from("/nonexistent/a.ttc"),
                PathBuf::from("/nonexistent/b.ttf"),
            ],
            ..FontConfig::default()
        };
        match FontResource::locate(&config) {
            Err(WordCloudError::FontNotFound { tried }) => assert_eq!(tried, config.candidates),
            other => panic!("expected FontNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_locate_with_no_candidates() {
        let config = FontConfig {
            candidates: vec![],
            ..FontConfig::default()
        };
        let err = FontResource::locate(&config).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Resource);
    }

    #[test]
    fn test_existing_but_invalid_font_is_not_skipped() {
        let mut bogus = tempfile::NamedTempFile::new().unwrap();
        bogus.write_all(b"not a font").unwrap();
        let config = FontConfig {
            candidates: vec![bogus.path().to_path_buf(), PathBuf::from("/nonexistent/b.ttf")],
            ..FontConfig::default()
        };
        let err = FontResource::locate(&config).unwrap_err();
        assert!(matches!(err, WordCloudError::FontInvalid { .. }));
        assert_eq!(err.kind(), crate::errors::ErrorKind::Resource);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = FontResource::from_bytes(vec![0u8; 64], 0, "memory").unwrap_err();
        assert!(matches!(err, WordCloudError::FontInvalid { .. }));
    }

    /// Font files under the usual system directories, sorted for a stable
    /// pick. Empty on machines without fonts; callers skip in that case.
    fn system_fonts() -> Vec<PathBuf> {
        fn walk(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    if depth > 0 {
                        walk(&path, depth - 1, out);
                    }
                    continue;
                }
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_ascii_lowercase);
                if matches!(ext.as_deref(), Some("ttf" | "otf" | "ttc")) {
                    out.push(path);
                }
            }
        }

        let mut fonts = Vec::new();
        for root in ["/usr/share/fonts", "/System/Library/Fonts", "C:/Windows/Fonts"] {
            walk(Path::new(root), 4, &mut fonts);
        }
        fonts.sort();
        fonts
    }

    /// First system font that covers every character the tests draw.
    fn cjk_system_font() -> Option<PathBuf> {
        system_fonts().into_iter().find(|path| {
            std::fs::read(path)
                .ok()
                .and_then(|data| FontVec::try_from_vec_and_index(data, 0).ok())
                .is_some_and(|font| "中空调".chars().all(|c| font.glyph_id(c).0 != 0))
        })
    }

    #[test]
    fn test_font_without_cjk_is_rejected() {
        let latin_only = system_fonts().into_iter().find(|path| {
            std::fs::read(path)
                .ok()
                .and_then(|data| FontVec::try_from_vec_and_index(data, 0).ok())
                .is_some_and(|font| font.glyph_id(CJK_PROBE).0 == 0)
        });
        let Some(path) = latin_only else {
            eprintln!("no non-CJK system font installed; skipping");
            return;
        };
        let err = FontResource::load(&path, 0).unwrap_err();
        assert!(matches!(err, WordCloudError::FontLacksCjk { .. }), "{err:?}");
        assert_eq!(err.kind(), crate::errors::ErrorKind::Resource);
    }

    #[test]
    fn test_cjk_font_measures_and_draws() {
        let Some(path) = cjk_system_font() else {
            eprintln!("no CJK system font installed; skipping");
            return;
        };
        let font = FontResource::load(&path, 0).unwrap();
        assert_eq!(font.path(), path.as_path());

        let one = font.measure("中", 40.0).unwrap();
        let two = font.measure("空调", 40.0).unwrap();
        assert!(one.width > 0 && one.height > 0);
        assert!(two.width > one.width);
        assert!(font.measure("空调", 80.0).unwrap().width > two.width);

        let mut painted = 0usize;
        let mut max_coverage = 0.0f32;
        font.draw("空调", 40.0, &mut |x, y, coverage| {
            // Outlines may overshoot the advance box slightly.
            let slack = 10;
            assert!(x >= -slack && y >= -slack, "({x}, {y}) outside the measured box");
            assert!(x <= two.width as i32 + slack && y <= two.height as i32 + slack);
            if coverage > 0.0 {
                painted += 1;
            }
            max_coverage = max_coverage.max(coverage);
        })
        .unwrap();
        assert!(painted > 0);
        assert!(max_coverage > 0.5);
    }

    #[test]
    fn test_cjk_font_reports_missing_glyph() {
        let Some(path) = cjk_system_font() else {
            eprintln!("no CJK system font installed; skipping");
            return;
        };
        let font = FontResource::load(&path, 0).unwrap();
        // Plane 16 private use: no shipping font maps it.
        let err = font.measure("中\u{10FFFD}", 20.0).unwrap_err();
        match err {
            WordCloudError::MissingGlyph { term, ch } => {
                assert_eq!(term, "中\u{10FFFD}");
                assert_eq!(ch, '\u{10FFFD}');
            }
            other => panic!("expected MissingGlyph, got {other:?}"),
        }
    }

    #[test]
    fn test_block_face_measure_and_draw() {
        let face = BlockFace;
        let extent = face.measure("空调", 10.0).unwrap();
        assert_eq!(extent, TextExtent { width: 20, height: 10 });

        let mut pixels = 0;
        face.draw("空调", 10.0, &mut |_, _, _| pixels += 1).unwrap();
        assert_eq!(pixels, 200);

        assert!(face.measure("电?", 10.0).is_err());
    }
}
