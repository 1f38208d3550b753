//! Monospace font discovery and glyph rasterization.
//!
//! A font is located on disk (config override first, then well-known system
//! paths), loaded with fontdue, and scaled so the advance of a reference
//! glyph matches the fixed cell width. The glyph cache talks to the font
//! through the [`GlyphSource`] trait so it can be tested with a fake.

use std::fs;
use std::path::Path;

use fontdue::{Font, FontSettings};
use matcha_core::{CELL_HEIGHT, CELL_WIDTH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("no monospace TTF found; install dejavu, liberation or ubuntu fonts, or set MATCHA_FONT")]
    NotFound,

    #[error("failed to read font file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to load font: {0}")]
    Load(String),
}

/// Well-known monospace font locations, tried in order.
const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
    "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
];

/// Load the configured font, or the first discoverable system font.
pub fn load_font(override_path: Option<&Path>) -> Result<Font, FontError> {
    let data = match override_path {
        Some(path) => fs::read(path)?,
        None => discover()?,
    };
    Font::from_bytes(data, FontSettings::default()).map_err(|e| FontError::Load(e.to_string()))
}

fn discover() -> Result<Vec<u8>, FontError> {
    for path in FONT_PATHS {
        if let Ok(data) = fs::read(path) {
            log::debug!("using font {path}");
            return Ok(data);
        }
    }
    Err(FontError::NotFound)
}

/// A rasterized glyph: a coverage bitmap plus its placement metrics.
/// Color is applied when the bitmap is blitted, so one rasterization
/// serves every foreground color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizedGlyph {
    pub width: usize,
    pub height: usize,
    pub bitmap: Vec<u8>,
    pub xmin: i32,
    pub ymin: i32,
}

/// What the glyph cache needs from a font backend.
pub trait GlyphSource {
    fn has_glyph(&self, c: char) -> bool;
    fn rasterize(&self, c: char) -> RasterizedGlyph;
}

/// A fontdue font scaled to the terminal's cell geometry.
pub struct CellFont {
    font: Font,
    px: f32,
}

impl CellFont {
    pub fn new(font: Font) -> Self {
        // scale so the advance of a reference glyph fills the cell width,
        // capped to the cell height for fonts with unusual proportions
        let reference = font.metrics('M', 16.0);
        let px = if reference.advance_width > 0.0 {
            (16.0 * CELL_WIDTH as f32 / reference.advance_width).min(CELL_HEIGHT as f32)
        } else {
            CELL_HEIGHT as f32
        };
        CellFont { font, px }
    }

    /// Baseline offset from the cell top, in pixels.
    pub fn baseline(&self) -> i32 {
        self.font
            .horizontal_line_metrics(self.px)
            .map(|m| m.ascent.ceil() as i32)
            .unwrap_or(CELL_HEIGHT * 3 / 4)
            .min(CELL_HEIGHT)
    }
}

impl GlyphSource for CellFont {
    fn has_glyph(&self, c: char) -> bool {
        self.font.lookup_glyph_index(c) != 0
    }

    fn rasterize(&self, c: char) -> RasterizedGlyph {
        let (metrics, bitmap) = self.font.rasterize(c, self.px);
        RasterizedGlyph {
            width: metrics.width,
            height: metrics.height,
            bitmap,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
        }
    }
}
