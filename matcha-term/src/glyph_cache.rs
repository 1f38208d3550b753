//! Glyph cache: rasterize each character once, keyed by its byte sequence.
//!
//! Lookups are keyed by the caller's `Utf8Block` even when the rendered
//! glyph is a substitute, so repeated invalid or unsupported input hits the
//! cache immediately instead of re-validating every frame.

use std::collections::HashMap;

use matcha_core::Utf8Block;

use crate::font::{GlyphSource, RasterizedGlyph};

pub struct GlyphCache<F: GlyphSource> {
    font: F,
    glyphs: HashMap<Utf8Block, RasterizedGlyph>,
}

impl<F: GlyphSource> GlyphCache<F> {
    pub fn new(font: F) -> Self {
        GlyphCache {
            font,
            glyphs: HashMap::new(),
        }
    }

    /// Fetch the rasterization for `key`, producing it on first use.
    ///
    /// Substitution happens only on a miss:
    /// - bytes that do not decode as one codepoint render as U+FFFC,
    /// - codepoints the font cannot draw render as U+25A1.
    pub fn get(&mut self, key: Utf8Block) -> &RasterizedGlyph {
        let font = &self.font;
        self.glyphs.entry(key).or_insert_with(|| {
            let mut c = match key.to_char() {
                Some(c) => c,
                None => '\u{FFFC}',
            };
            if !font.has_glyph(c) {
                c = '\u{25A1}';
            }
            font.rasterize(c)
        })
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
