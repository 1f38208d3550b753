//! Fixed-capacity container for a single UTF-8 encoded character.
//!
//! The parser copies bytes from the wire into `Utf8Block`s without checking
//! their validity; validation happens lazily in the glyph cache just before a
//! character is rasterized. Invalid contents are substituted with one of the
//! sentinel characters below at that point, never earlier.

use serde::{Deserialize, Serialize};

/// A UTF-8 character occupies at most four bytes.
pub const MAX_BYTES_PER_CHAR: usize = 4;

/// One character slot, padded with trailing zero bytes.
///
/// Equality and hashing cover the whole fixed-width window so that equal
/// characters collide in the glyph cache regardless of encoded length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Utf8Block {
    bytes: [u8; MAX_BYTES_PER_CHAR],
}

impl Utf8Block {
    /// U+FFFD replacement character, emitted for a continuation byte that
    /// arrives outside a multibyte sequence.
    pub const STRAY_CONTINUATION: Utf8Block = Utf8Block {
        bytes: [0xEF, 0xBF, 0xBD, 0x00],
    };

    /// U+FFFC object-replacement character, substituted for byte sequences
    /// that do not decode as UTF-8.
    pub const INVALID_UTF8: Utf8Block = Utf8Block {
        bytes: [0xEF, 0xBF, 0xBC, 0x00],
    };

    /// U+25A1 white square, substituted for characters the font cannot draw.
    pub const NO_GLYPH: Utf8Block = Utf8Block {
        bytes: [0xE2, 0x96, 0xA1, 0x00],
    };

    /// An ASCII space.
    pub const SPACE: Utf8Block = Utf8Block {
        bytes: [0x20, 0x00, 0x00, 0x00],
    };

    /// Expected sequence length for a lead byte, or `None` for a byte that
    /// cannot start a sequence (a continuation byte or an invalid lead).
    pub fn sequence_length(lead: u8) -> Option<usize> {
        match lead {
            0x00..=0x7F => Some(1),
            0xC0..=0xDF => Some(2),
            0xE0..=0xEF => Some(3),
            0xF0..=0xF7 => Some(4),
            _ => None,
        }
    }

    /// Wrap raw bytes copied verbatim from the wire. No validation.
    pub const fn from_raw(bytes: [u8; MAX_BYTES_PER_CHAR]) -> Self {
        Utf8Block { bytes }
    }

    pub fn from_char(c: char) -> Self {
        let mut bytes = [0u8; MAX_BYTES_PER_CHAR];
        c.encode_utf8(&mut bytes);
        Utf8Block { bytes }
    }

    pub fn first_byte(&self) -> u8 {
        self.bytes[0]
    }

    /// The full fixed-width window, including zero padding.
    pub fn raw(&self) -> &[u8; MAX_BYTES_PER_CHAR] {
        &self.bytes
    }

    /// Decode as exactly one codepoint. `None` when the contents are not a
    /// complete, valid UTF-8 sequence.
    pub fn to_char(&self) -> Option<char> {
        let len = Self::sequence_length(self.bytes[0])?;
        let s = std::str::from_utf8(&self.bytes[..len]).ok()?;
        s.chars().next()
    }
}

impl Default for Utf8Block {
    fn default() -> Self {
        Utf8Block::SPACE
    }
}
