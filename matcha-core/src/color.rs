//! Terminal color representation.
//!
//! Colors arrive from the shell in three encodings:
//! - The classic 8-color palette (SGR 30-37 / 40-47)
//! - Its bright counterpart (SGR 90-97 / 100-107)
//! - The xterm 256-color palette (SGR 38;5;n / 48;5;n)
//!
//! Truecolor (SGR 38;2;r;g;b) needs no table and maps straight to `Color`.

use serde::{Deserialize, Serialize};

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Values of the 6x6x6 cube coordinates used by the 256-color palette.
const CUBE_STEPS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// The first 16 entries of the 256-color palette (standard VGA values).
const PALETTE_16: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (128, 0, 0),
    (0, 128, 0),
    (128, 128, 0),
    (0, 0, 128),
    (128, 0, 128),
    (0, 128, 128),
    (192, 192, 192),
    (128, 128, 128),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (0, 0, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Resolve an index of the classic 8-color palette.
    ///
    /// Out-of-range values resolve to the last entry (white).
    pub fn from8(index: u8) -> Self {
        match index {
            0 => Color::new(46, 52, 54),
            1 => Color::new(204, 0, 0),
            2 => Color::new(78, 154, 6),
            3 => Color::new(196, 160, 0),
            4 => Color::new(52, 101, 164),
            5 => Color::new(117, 80, 123),
            6 => Color::new(6, 152, 154),
            _ => Color::new(211, 215, 207),
        }
    }

    /// Resolve an index of the bright 8-color palette.
    ///
    /// Out-of-range values resolve to the last entry (bright white).
    pub fn from8bright(index: u8) -> Self {
        match index {
            0 => Color::new(85, 85, 83),
            1 => Color::new(239, 41, 41),
            2 => Color::new(138, 226, 52),
            3 => Color::new(252, 233, 79),
            4 => Color::new(114, 159, 207),
            5 => Color::new(173, 127, 168),
            6 => Color::new(52, 226, 226),
            _ => Color::new(238, 238, 236),
        }
    }

    /// Resolve an index of the xterm 256-color palette.
    ///
    /// Entries 0-15 are the standard VGA colors, 16-231 the 6x6x6 color
    /// cube, and 232-255 a grayscale ramp from 8 to 238.
    pub fn from256(index: u8) -> Self {
        match index {
            0..=15 => {
                let (r, g, b) = PALETTE_16[index as usize];
                Color::new(r, g, b)
            }
            16..=231 => {
                let cube = index as usize - 16;
                Color::new(
                    CUBE_STEPS[cube / 36],
                    CUBE_STEPS[cube / 6 % 6],
                    CUBE_STEPS[cube % 6],
                )
            }
            232..=255 => {
                let gray = (index as usize - 232) as u8 * 10 + 8;
                Color::new(gray, gray, gray)
            }
        }
    }
}
