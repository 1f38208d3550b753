//! Matcha terminal core
//!
//! Platform-independent display model for the matcha terminal emulator:
//! - Color palettes (8, bright-8, 256, truecolor)
//! - `Utf8Block`, the fixed-capacity character container
//! - Cells, attributes and logical lines
//! - The `Block` sum type produced by the parser
//! - The screen model that consumes blocks
//!
//! This crate has NO GUI dependencies and can be driven headlessly for
//! testing; painting goes through the `CellPainter` trait.

pub mod block;
pub mod cell;
pub mod color;
pub mod glyph;
pub mod line;
pub mod screen;

pub use block::Block;
pub use cell::{Cell, CellAttributes};
pub use color::Color;
pub use glyph::{Utf8Block, MAX_BYTES_PER_CHAR};
pub use line::Line;
pub use screen::{
    CellPainter, Screen, CELLS_PER_HEIGHT, CELLS_PER_WIDTH, CELL_HEIGHT, CELL_WIDTH,
    SCREEN_HEIGHT, SCREEN_WIDTH,
};
