//! Software renderer: a fixed-size ARGB frame presented via softbuffer.
//!
//! Cells are drawn incrementally into `frame` as blocks are applied; a
//! present copies the frame to the window surface. Glyph bitmaps are
//! coverage masks, so the foreground color is applied at blit time.

use std::error::Error;
use std::num::NonZeroU32;
use std::rc::Rc;

use matcha_core::{
    Cell, CellPainter, Color, Utf8Block, CELL_HEIGHT, CELL_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use softbuffer::{Context, Surface};
use winit::window::Window;

use crate::font::{GlyphSource, RasterizedGlyph};
use crate::glyph_cache::GlyphCache;

const FRAME_WIDTH: usize = SCREEN_WIDTH as usize;
const FRAME_HEIGHT: usize = SCREEN_HEIGHT as usize;

fn pack(color: Color) -> u32 {
    0xFF00_0000 | (u32::from(color.r) << 16) | (u32::from(color.g) << 8) | u32::from(color.b)
}

/// Fill a rectangle, clipped to the frame.
fn fill_rect(frame: &mut [u32], x: i32, y: i32, w: i32, h: i32, color: Color) {
    let pixel = pack(color);
    for dy in 0..h {
        let py = y + dy;
        if py < 0 || py >= FRAME_HEIGHT as i32 {
            continue;
        }
        for dx in 0..w {
            let px = x + dx;
            if px < 0 || px >= FRAME_WIDTH as i32 {
                continue;
            }
            frame[py as usize * FRAME_WIDTH + px as usize] = pixel;
        }
    }
}

/// Alpha-blend a glyph's coverage bitmap at cell origin `(x, y)`.
fn blit_glyph(
    frame: &mut [u32],
    glyph: &RasterizedGlyph,
    x: i32,
    y: i32,
    baseline: i32,
    fg: Color,
) {
    if glyph.width == 0 || glyph.height == 0 {
        return;
    }
    let gx = x + glyph.xmin;
    let gy = y + baseline - glyph.ymin - glyph.height as i32;

    for dy in 0..glyph.height {
        let py = gy + dy as i32;
        if py < 0 || py >= FRAME_HEIGHT as i32 {
            continue;
        }
        for dx in 0..glyph.width {
            let px = gx + dx as i32;
            if px < 0 || px >= FRAME_WIDTH as i32 {
                continue;
            }
            let alpha = glyph.bitmap[dy * glyph.width + dx] as u32;
            if alpha == 0 {
                continue;
            }
            let index = py as usize * FRAME_WIDTH + px as usize;
            if alpha == 255 {
                frame[index] = pack(fg);
            } else {
                let existing = frame[index];
                let inverse = 255 - alpha;
                let r = (u32::from(fg.r) * alpha + ((existing >> 16) & 0xFF) * inverse) / 255;
                let g = (u32::from(fg.g) * alpha + ((existing >> 8) & 0xFF) * inverse) / 255;
                let b = (u32::from(fg.b) * alpha + (existing & 0xFF) * inverse) / 255;
                frame[index] = 0xFF00_0000 | (r << 16) | (g << 8) | b;
            }
        }
    }
}

pub struct Renderer {
    #[allow(dead_code)]
    context: Context<Rc<Window>>,
    surface: Surface<Rc<Window>, Rc<Window>>,
    window: Rc<Window>,
    frame: Vec<u32>,
    baseline: i32,
}

impl Renderer {
    pub fn new(window: Rc<Window>, baseline: i32) -> Result<Self, Box<dyn Error>> {
        let context = Context::new(window.clone())?;
        let surface = Surface::new(&context, window.clone())?;
        Ok(Renderer {
            context,
            surface,
            window,
            frame: vec![pack(Color::default()); FRAME_WIDTH * FRAME_HEIGHT],
            baseline,
        })
    }

    pub fn clear(&mut self, color: Color) {
        self.frame.fill(pack(color));
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        fill_rect(&mut self.frame, x, y, w, h, color);
    }

    pub fn draw_glyph(&mut self, glyph: &RasterizedGlyph, x: i32, y: i32, fg: Color) {
        blit_glyph(&mut self.frame, glyph, x, y, self.baseline, fg);
    }

    /// Copy the frame to the window surface and present it.
    pub fn present(&mut self) -> Result<(), Box<dyn Error>> {
        let size = self.window.inner_size();
        let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(());
        };
        self.surface.resize(width, height)?;

        let mut buffer = self.surface.buffer_mut()?;
        buffer.fill(pack(Color::default()));
        let copy_width = (size.width as usize).min(FRAME_WIDTH);
        for row in 0..(size.height as usize).min(FRAME_HEIGHT) {
            let src = row * FRAME_WIDTH;
            let dst = row * size.width as usize;
            buffer[dst..dst + copy_width].copy_from_slice(&self.frame[src..src + copy_width]);
        }
        buffer.present()?;
        Ok(())
    }
}

/// Bridges the screen model to the renderer and the glyph cache.
pub struct ScreenPainter<'a, F: GlyphSource> {
    pub renderer: &'a mut Renderer,
    pub cache: &'a mut GlyphCache<F>,
}

impl<F: GlyphSource> CellPainter for ScreenPainter<'_, F> {
    fn draw_cell(&mut self, x: i32, y: i32, cell: &Cell) {
        self.renderer
            .fill_rect(x, y, CELL_WIDTH, CELL_HEIGHT, cell.attributes.bg);

        if cell.glyph != Utf8Block::SPACE {
            let glyph = self.cache.get(cell.glyph);
            blit_glyph(
                &mut self.renderer.frame,
                glyph,
                x,
                y,
                self.renderer.baseline,
                cell.attributes.fg,
            );
        }

        if cell.attributes.underline {
            self.renderer.fill_rect(
                x,
                y + CELL_HEIGHT - 2,
                CELL_WIDTH,
                1,
                cell.attributes.fg,
            );
        }
    }
}
