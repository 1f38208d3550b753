//! Cell and attribute types for the screen grid.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::glyph::Utf8Block;

/// Rendition state applied to cells as they are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAttributes {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl CellAttributes {
    /// Default foreground, a light gray that reads on the black background.
    pub const DEFAULT_FG: Color = Color::new(211, 215, 207);
    /// Default background.
    pub const DEFAULT_BG: Color = Color::new(0, 0, 0);
}

impl Default for CellAttributes {
    fn default() -> Self {
        CellAttributes {
            fg: Self::DEFAULT_FG,
            bg: Self::DEFAULT_BG,
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

/// One character position: a glyph plus the attributes it was inserted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub glyph: Utf8Block,
    pub attributes: CellAttributes,
}

impl Cell {
    pub fn new(glyph: Utf8Block, attributes: CellAttributes) -> Self {
        Cell { glyph, attributes }
    }

    /// A space with default attributes, used for padding.
    pub fn blank() -> Self {
        Cell::default()
    }
}
