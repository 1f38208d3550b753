//! Screen model: scrollback lines, cursor, insertion position, scroll anchor.
//!
//! The screen consumes [`Block`]s and keeps two related positions:
//!
//! - the pixel cursor, where the next glyph is painted, and
//! - the insertion position `(insert_line, insert_cell)`, a logical index
//!   into the line storage that is unaffected by visual wrapping.
//!
//! Painting is delegated through the [`CellPainter`] trait so the model stays
//! free of GUI dependencies and can be driven headlessly in tests.

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::cell::{Cell, CellAttributes};
use crate::glyph::Utf8Block;
use crate::line::Line;

pub const CELL_WIDTH: i32 = 8;
pub const CELL_HEIGHT: i32 = 16;
pub const CELLS_PER_WIDTH: usize = 80;
pub const CELLS_PER_HEIGHT: usize = 24;
pub const SCREEN_WIDTH: i32 = CELL_WIDTH * CELLS_PER_WIDTH as i32;
pub const SCREEN_HEIGHT: i32 = CELL_HEIGHT * CELLS_PER_HEIGHT as i32;

/// Tab stops sit every eight cells.
const TAB_WIDTH_CELLS: i32 = 8;

/// Drawing callback used by [`Screen::apply`] and [`Screen::redraw`].
///
/// Implementations fill the cell background and blit the glyph; the screen
/// only decides *where* cells land.
pub trait CellPainter {
    fn draw_cell(&mut self, x: i32, y: i32, cell: &Cell);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    /// Never empty.
    lines: Vec<Line>,
    /// Pixel origin where the next glyph is painted.
    cursor_x: i32,
    cursor_y: i32,
    /// Logical position where the next glyph is stored.
    insert_line: usize,
    insert_cell: usize,
    /// Scroll anchor: the content position drawn at the top-left.
    start_line: usize,
    start_cell: usize,
    /// Attributes applied to subsequently inserted cells.
    current_attrs: CellAttributes,
    /// Resting attributes, restored by a graphics reset.
    default_attrs: CellAttributes,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    pub fn new() -> Self {
        Self::with_attributes(CellAttributes::default())
    }

    /// A screen whose resting attributes (the initial state and what
    /// `GraphicsReset` restores) come from the caller, e.g. configured
    /// default colors.
    pub fn with_attributes(attrs: CellAttributes) -> Self {
        Screen {
            lines: vec![Line::new()],
            cursor_x: 0,
            cursor_y: 0,
            insert_line: 0,
            insert_cell: 0,
            start_line: 0,
            start_cell: 0,
            current_attrs: attrs,
            default_attrs: attrs,
        }
    }

    /// Apply one parsed block, painting any inserted cells through `painter`.
    pub fn apply(&mut self, block: &Block, painter: &mut dyn CellPainter) {
        match *block {
            Block::Utf8(glyph) => self.apply_glyph(glyph, painter),

            Block::CursorDown { n } => {
                for _ in 0..n {
                    self.line_feed();
                }
            }

            Block::GraphicsReset => self.current_attrs = self.default_attrs,
            Block::GraphicsBold => self.current_attrs.bold = true,
            Block::GraphicsItalic => self.current_attrs.italic = true,
            Block::GraphicsUnderline => self.current_attrs.underline = true,
            Block::GraphicsForeground { color } => self.current_attrs.fg = color,
            Block::GraphicsBackground { color } => self.current_attrs.bg = color,

            Block::EraseDisplay { mode } => self.erase_display(mode),

            // Accepted but not implemented by this terminal.
            Block::CursorUp { .. }
            | Block::CursorForward { .. }
            | Block::CursorBack { .. }
            | Block::CursorNextLine { .. }
            | Block::CursorPreviousLine { .. }
            | Block::CursorHorizontalAbsolute { .. }
            | Block::CursorPosition { .. }
            | Block::EraseLine { .. }
            | Block::ScrollUp { .. }
            | Block::ScrollDown { .. }
            | Block::SaveCursor
            | Block::LoadCursor => {}
        }
    }

    fn apply_glyph(&mut self, glyph: Utf8Block, painter: &mut dyn CellPainter) {
        match glyph.first_byte() {
            b'\n' => self.line_feed(),
            b'\r' => self.carriage_return(),
            0x08 => self.backspace(),
            b'\t' => self.tab(painter),
            // bell and NUL are ignored
            0x07 | 0x00 => {}
            _ => self.print(glyph, painter),
        }
    }

    /// Paint a glyph at the cursor and store it at the insertion position.
    fn print(&mut self, glyph: Utf8Block, painter: &mut dyn CellPainter) {
        let cell = Cell::new(glyph, self.current_attrs);
        painter.draw_cell(self.cursor_x, self.cursor_y, &cell);

        self.cursor_x += CELL_WIDTH;
        if self.cursor_x >= SCREEN_WIDTH {
            self.cursor_x = 0;
            self.cursor_y += CELL_HEIGHT;
        }

        self.lines[self.insert_line].put(self.insert_cell, cell);
        self.insert_cell += 1;
    }

    /// Move down one visual row. The pixel column is kept; the insertion
    /// position advances by a full row width, carried into the next logical
    /// line when it passes the end of the current one.
    fn line_feed(&mut self) {
        self.cursor_y += CELL_HEIGHT;

        self.insert_cell += CELLS_PER_WIDTH;
        if self.insert_cell > self.lines[self.insert_line].len() {
            self.insert_line += 1;
            if self.insert_line == self.lines.len() {
                self.lines.push(Line::new());
            }
            self.insert_cell %= CELLS_PER_WIDTH;
        }
    }

    /// Return to the start of the current visual row.
    fn carriage_return(&mut self) {
        self.cursor_x = 0;
        self.insert_cell = self.insert_cell / CELLS_PER_WIDTH * CELLS_PER_WIDTH;
    }

    fn backspace(&mut self) {
        self.cursor_x -= CELL_WIDTH;
        if self.cursor_x < 0 {
            self.cursor_x = SCREEN_WIDTH - CELL_WIDTH;
            self.cursor_y -= CELL_HEIGHT;
            if self.cursor_y < 0 {
                self.cursor_x = 0;
                self.cursor_y = 0;
            }
        }

        if self.insert_cell > 0 {
            self.insert_cell -= 1;
        } else if self.insert_line > 0 {
            self.insert_line -= 1;
            self.insert_cell = self.lines[self.insert_line].len();
        }
    }

    /// Insert spaces up to the next tab stop, at least one.
    fn tab(&mut self, painter: &mut dyn CellPainter) {
        loop {
            self.print(Utf8Block::SPACE, painter);
            if (self.cursor_x / CELL_WIDTH) % TAB_WIDTH_CELLS == 0 {
                break;
            }
        }
    }

    /// `ESC[2J` resets the whole model. Other erase modes are not supported.
    fn erase_display(&mut self, mode: u8) {
        if mode != 2 {
            return;
        }
        self.lines = vec![Line::new()];
        self.cursor_x = 0;
        self.cursor_y = 0;
        self.insert_line = 0;
        self.insert_cell = 0;
        self.start_line = 0;
        self.start_cell = 0;
        self.current_attrs = self.default_attrs;
    }

    /// Move the scroll anchor by whole lines. Positive values scroll toward
    /// older content (up), negative toward newer.
    pub fn scroll(&mut self, delta: i32) {
        let max = self.lines.len() as i32 - 1;
        let line = (self.start_line as i32 - delta).clamp(0, max);
        self.start_line = line as usize;
        self.start_cell = 0;
    }

    /// Repaint everything visible from the scroll anchor.
    ///
    /// Walks cells starting at `(start_line, start_cell)`, wrapping the pixel
    /// position at the screen width and stopping at the bottom edge.
    pub fn redraw(&self, painter: &mut dyn CellPainter) {
        let mut x = 0;
        let mut y = 0;

        for (i, line) in self.lines.iter().enumerate().skip(self.start_line) {
            let skip = if i == self.start_line { self.start_cell } else { 0 };
            let mut drawn = 0usize;

            for cell in line.cells().iter().skip(skip) {
                if y >= SCREEN_HEIGHT {
                    return;
                }
                painter.draw_cell(x, y, cell);
                drawn += 1;
                x += CELL_WIDTH;
                if x >= SCREEN_WIDTH {
                    x = 0;
                    y += CELL_HEIGHT;
                }
            }

            // Step to the next line unless the last cell wrapped exactly.
            if x != 0 || drawn == 0 {
                x = 0;
                y += CELL_HEIGHT;
            }
            if y >= SCREEN_HEIGHT {
                return;
            }
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Pixel position of the next glyph.
    pub fn cursor(&self) -> (i32, i32) {
        (self.cursor_x, self.cursor_y)
    }

    /// Logical `(line, cell)` index of the next glyph.
    pub fn insert_position(&self) -> (usize, usize) {
        (self.insert_line, self.insert_cell)
    }

    /// `(line, cell)` drawn at the top-left of the viewport.
    pub fn scroll_anchor(&self) -> (usize, usize) {
        (self.start_line, self.start_cell)
    }

    pub fn attributes(&self) -> CellAttributes {
        self.current_attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    /// Painter that records every draw call.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(i32, i32, Cell)>,
    }

    impl CellPainter for Recorder {
        fn draw_cell(&mut self, x: i32, y: i32, cell: &Cell) {
            self.calls.push((x, y, *cell));
        }
    }

    fn apply_str(screen: &mut Screen, painter: &mut Recorder, text: &str) {
        for c in text.chars() {
            screen.apply(&Block::glyph(c), painter);
        }
    }

    fn glyphs(line: &Line) -> Vec<Option<char>> {
        line.cells().iter().map(|c| c.glyph.to_char()).collect()
    }

    #[test]
    fn test_plain_text_insertion() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        apply_str(&mut screen, &mut rec, "hi");

        assert_eq!(glyphs(&screen.lines()[0]), vec![Some('h'), Some('i')]);
        assert_eq!(screen.insert_position(), (0, 2));
        assert_eq!(screen.cursor(), (2 * CELL_WIDTH, 0));
        // each glyph was painted before the cursor advanced
        assert_eq!(rec.calls[0].0, 0);
        assert_eq!(rec.calls[1].0, CELL_WIDTH);
    }

    #[test]
    fn test_line_feed_keeps_pixel_column() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        apply_str(&mut screen, &mut rec, "hi");
        screen.apply(&Block::glyph('\n'), &mut rec);

        assert_eq!(screen.lines().len(), 2);
        assert!(screen.lines()[1].is_empty());
        // the pixel column survives the line feed, and the insertion
        // position lands on the same visual column of the new line
        assert_eq!(screen.cursor(), (2 * CELL_WIDTH, CELL_HEIGHT));
        assert_eq!(screen.insert_position(), (1, 2));
    }

    #[test]
    fn test_print_after_line_feed_pads_with_blanks() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        apply_str(&mut screen, &mut rec, "hi\nX");

        let line = &screen.lines()[1];
        assert_eq!(line.len(), 3);
        assert_eq!(*line.get(0).unwrap(), Cell::blank());
        assert_eq!(*line.get(1).unwrap(), Cell::blank());
        assert_eq!(line.get(2).unwrap().glyph.to_char(), Some('X'));
    }

    #[test]
    fn test_carriage_return_resets_column() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        apply_str(&mut screen, &mut rec, "abc\r");

        assert_eq!(screen.cursor(), (0, 0));
        assert_eq!(screen.insert_position(), (0, 0));

        // overwrite in place
        apply_str(&mut screen, &mut rec, "X");
        assert_eq!(
            glyphs(&screen.lines()[0]),
            vec![Some('X'), Some('b'), Some('c')]
        );
    }

    #[test]
    fn test_carriage_return_snaps_to_visual_row_start() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        // wrap into the second visual row of the same logical line
        for _ in 0..85 {
            apply_str(&mut screen, &mut rec, "x");
        }
        assert_eq!(screen.insert_position(), (0, 85));

        screen.apply(&Block::glyph('\r'), &mut rec);
        assert_eq!(screen.insert_position(), (0, 80));
        assert_eq!(screen.cursor().0, 0);
    }

    #[test]
    fn test_backspace_steps_back() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        apply_str(&mut screen, &mut rec, "ab");
        screen.apply(&Block::glyph('\u{8}'), &mut rec);

        assert_eq!(screen.cursor(), (CELL_WIDTH, 0));
        assert_eq!(screen.insert_position(), (0, 1));
    }

    #[test]
    fn test_backspace_clamps_at_origin() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        screen.apply(&Block::glyph('\u{8}'), &mut rec);

        assert_eq!(screen.cursor(), (0, 0));
        assert_eq!(screen.insert_position(), (0, 0));
    }

    #[test]
    fn test_backspace_wraps_to_previous_row() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        apply_str(&mut screen, &mut rec, "a");
        screen.apply(&Block::glyph('\n'), &mut rec);
        assert_eq!(screen.cursor(), (CELL_WIDTH, CELL_HEIGHT));

        screen.apply(&Block::glyph('\u{8}'), &mut rec);
        screen.apply(&Block::glyph('\u{8}'), &mut rec);
        // stepping left past the edge wraps to the end of the row above
        assert_eq!(screen.cursor(), (SCREEN_WIDTH - CELL_WIDTH, 0));
    }

    #[test]
    fn test_tab_from_origin_inserts_eight_spaces() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        screen.apply(&Block::glyph('\t'), &mut rec);

        assert_eq!(screen.lines()[0].len(), 8);
        assert_eq!(screen.cursor(), (8 * CELL_WIDTH, 0));
        assert!(screen.lines()[0]
            .cells()
            .iter()
            .all(|c| c.glyph == Utf8Block::SPACE));
    }

    #[test]
    fn test_tab_from_column_three_inserts_five_spaces() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        apply_str(&mut screen, &mut rec, "abc");
        screen.apply(&Block::glyph('\t'), &mut rec);

        assert_eq!(screen.lines()[0].len(), 8);
        assert_eq!(screen.cursor(), (8 * CELL_WIDTH, 0));
        assert_eq!(screen.insert_position(), (0, 8));
    }

    #[test]
    fn test_bell_and_nul_are_ignored() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        screen.apply(&Block::glyph('\u{7}'), &mut rec);
        screen.apply(&Block::glyph('\u{0}'), &mut rec);

        assert!(rec.calls.is_empty());
        assert_eq!(screen.cursor(), (0, 0));
        assert_eq!(screen.insert_position(), (0, 0));
    }

    #[test]
    fn test_attributes_apply_to_inserted_cells() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        let red = Color::from8(1);

        screen.apply(&Block::GraphicsForeground { color: red }, &mut rec);
        apply_str(&mut screen, &mut rec, "A");
        screen.apply(&Block::GraphicsReset, &mut rec);
        apply_str(&mut screen, &mut rec, "B");

        let line = &screen.lines()[0];
        assert_eq!(line.get(0).unwrap().attributes.fg, red);
        assert_eq!(
            line.get(1).unwrap().attributes,
            CellAttributes::default()
        );
    }

    #[test]
    fn test_configured_attributes_are_the_reset_state() {
        let attrs = CellAttributes {
            fg: Color::new(1, 2, 3),
            bg: Color::new(4, 5, 6),
            ..CellAttributes::default()
        };
        let mut screen = Screen::with_attributes(attrs);
        let mut rec = Recorder::default();

        apply_str(&mut screen, &mut rec, "a");
        assert_eq!(screen.lines()[0].get(0).unwrap().attributes, attrs);

        // a reset restores the configured attributes, not the built-ins
        screen.apply(
            &Block::GraphicsForeground {
                color: Color::from8(1),
            },
            &mut rec,
        );
        screen.apply(&Block::GraphicsReset, &mut rec);
        assert_eq!(screen.attributes(), attrs);

        screen.apply(&Block::GraphicsBold, &mut rec);
        screen.apply(&Block::EraseDisplay { mode: 2 }, &mut rec);
        assert_eq!(screen.attributes(), attrs);
    }

    #[test]
    fn test_bold_italic_underline_bits() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        screen.apply(&Block::GraphicsBold, &mut rec);
        screen.apply(&Block::GraphicsItalic, &mut rec);
        screen.apply(&Block::GraphicsUnderline, &mut rec);
        apply_str(&mut screen, &mut rec, "x");

        let attrs = screen.lines()[0].get(0).unwrap().attributes;
        assert!(attrs.bold && attrs.italic && attrs.underline);
    }

    #[test]
    fn test_erase_display_resets_everything() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        screen.apply(
            &Block::GraphicsForeground {
                color: Color::from8(2),
            },
            &mut rec,
        );
        apply_str(&mut screen, &mut rec, "abc\n");
        screen.apply(&Block::EraseDisplay { mode: 2 }, &mut rec);

        assert_eq!(screen.lines().len(), 1);
        assert!(screen.lines()[0].is_empty());
        assert_eq!(screen.cursor(), (0, 0));
        assert_eq!(screen.insert_position(), (0, 0));
        assert_eq!(screen.scroll_anchor(), (0, 0));
        assert_eq!(screen.attributes(), CellAttributes::default());
    }

    #[test]
    fn test_erase_display_other_modes_are_noops() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        apply_str(&mut screen, &mut rec, "abc");
        screen.apply(&Block::EraseDisplay { mode: 0 }, &mut rec);
        screen.apply(&Block::EraseDisplay { mode: 1 }, &mut rec);

        assert_eq!(screen.lines()[0].len(), 3);
    }

    #[test]
    fn test_cursor_down_repeats_line_feed() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        screen.apply(&Block::CursorDown { n: 3 }, &mut rec);

        assert_eq!(screen.cursor(), (0, 3 * CELL_HEIGHT));
        assert_eq!(screen.insert_position(), (3, 0));
        assert_eq!(screen.lines().len(), 4);
    }

    #[test]
    fn test_stubbed_blocks_preserve_invariants() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        let stubs = [
            Block::CursorUp { n: 5 },
            Block::CursorForward { n: 2 },
            Block::CursorBack { n: 2 },
            Block::CursorNextLine { n: 1 },
            Block::CursorPreviousLine { n: 1 },
            Block::CursorHorizontalAbsolute { col: 10 },
            Block::CursorPosition { row: 3, col: 4 },
            Block::EraseLine { mode: 2 },
            Block::ScrollUp { n: 1 },
            Block::ScrollDown { n: 1 },
            Block::SaveCursor,
            Block::LoadCursor,
        ];
        for block in &stubs {
            screen.apply(block, &mut rec);
        }

        assert!(!screen.lines().is_empty());
        let (line, _) = screen.insert_position();
        assert!(line < screen.lines().len());
        assert_eq!(screen.cursor(), (0, 0));
    }

    #[test]
    fn test_wrap_at_screen_width() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        for _ in 0..CELLS_PER_WIDTH {
            apply_str(&mut screen, &mut rec, "x");
        }
        // the pixel cursor wrapped to the next row, the logical line did not
        assert_eq!(screen.cursor(), (0, CELL_HEIGHT));
        assert_eq!(screen.insert_position(), (0, CELLS_PER_WIDTH));
        assert_eq!(screen.lines().len(), 1);
    }

    #[test]
    fn test_cursor_x_bounded_before_each_block() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        for _ in 0..500 {
            apply_str(&mut screen, &mut rec, "y");
            let (x, _) = screen.cursor();
            assert!((0..SCREEN_WIDTH).contains(&x));
        }
    }

    #[test]
    fn test_scroll_clamps_to_content() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        apply_str(&mut screen, &mut rec, "a\nb\nc\n");
        assert_eq!(screen.lines().len(), 4);

        screen.scroll(-2);
        assert_eq!(screen.scroll_anchor(), (2, 0));
        screen.scroll(-10);
        assert_eq!(screen.scroll_anchor(), (3, 0));
        screen.scroll(10);
        assert_eq!(screen.scroll_anchor(), (0, 0));
    }

    #[test]
    fn test_redraw_walks_from_anchor() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        apply_str(&mut screen, &mut rec, "ab");
        screen.apply(&Block::glyph('\n'), &mut rec);
        screen.apply(&Block::glyph('\r'), &mut rec);
        apply_str(&mut screen, &mut rec, "c");

        let mut redraw = Recorder::default();
        screen.redraw(&mut redraw);

        let positions: Vec<(i32, i32)> =
            redraw.calls.iter().map(|(x, y, _)| (*x, *y)).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (CELL_WIDTH, 0), (0, CELL_HEIGHT)]
        );
    }

    #[test]
    fn test_redraw_wraps_long_lines() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        for _ in 0..(CELLS_PER_WIDTH + 2) {
            apply_str(&mut screen, &mut rec, "z");
        }

        let mut redraw = Recorder::default();
        screen.redraw(&mut redraw);

        assert_eq!(redraw.calls.len(), CELLS_PER_WIDTH + 2);
        assert_eq!(
            (redraw.calls[CELLS_PER_WIDTH].0, redraw.calls[CELLS_PER_WIDTH].1),
            (0, CELL_HEIGHT)
        );
    }

    #[test]
    fn test_redraw_stops_at_screen_bottom() {
        let mut screen = Screen::new();
        let mut rec = Recorder::default();
        for _ in 0..(CELLS_PER_HEIGHT + 10) {
            apply_str(&mut screen, &mut rec, "q");
            screen.apply(&Block::glyph('\n'), &mut rec);
            screen.apply(&Block::glyph('\r'), &mut rec);
        }

        let mut redraw = Recorder::default();
        screen.redraw(&mut redraw);

        // one cell per visible row at most
        assert!(redraw.calls.len() <= CELLS_PER_HEIGHT);
        assert!(redraw.calls.iter().all(|(_, y, _)| *y < SCREEN_HEIGHT));
    }
}
