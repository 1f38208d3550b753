//! Resumable parser turning raw PTY bytes into display blocks.
//!
//! The stream may be cut at any byte boundary: a multibyte UTF-8 character
//! or an escape sequence can span `consume` calls, so all in-progress state
//! lives in the `BlockStream` and the machine re-enters where it left off.
//! Concatenating the outputs over any partition of an input equals parsing
//! the whole input at once.
//!
//! The parser never fails. Malformed input either produces a sentinel
//! character block or is dropped, byte by byte, as described on each state.

use matcha_core::block::Block;
use matcha_core::color::Color;
use matcha_core::glyph::{Utf8Block, MAX_BYTES_PER_CHAR};

/// Parameters beyond this count are accepted but ignored.
pub const MAX_ARGS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Plain text; possibly mid-way through a multibyte character.
    Ground,
    /// An ESC byte has been seen.
    Escape,
    /// Inside `ESC [`, accumulating numeric parameters.
    Csi,
}

pub struct BlockStream {
    state: State,

    /// In-progress multibyte character spanning a `consume` boundary.
    pending: [u8; MAX_BYTES_PER_CHAR],
    pending_len: usize,
    bytes_to_complete: usize,

    /// CSI parameters. `arg_index` may sit one past the array as a sentinel
    /// once more than `MAX_ARGS` parameters have been supplied.
    args: [u16; MAX_ARGS],
    arg_index: usize,
}

impl Default for BlockStream {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStream {
    pub fn new() -> Self {
        BlockStream {
            state: State::Ground,
            pending: [0; MAX_BYTES_PER_CHAR],
            pending_len: 0,
            bytes_to_complete: 0,
            args: [0; MAX_ARGS],
            arg_index: 0,
        }
    }

    /// Parse a chunk of input, producing the blocks completed by it.
    pub fn consume(&mut self, input: &[u8]) -> Vec<Block> {
        let mut out = Vec::new();
        for &byte in input {
            match self.state {
                State::Ground => self.ground(byte, &mut out),
                State::Escape => self.escape(byte),
                State::Csi => self.csi(byte, &mut out),
            }
        }
        out
    }

    fn ground(&mut self, byte: u8, out: &mut Vec<Block>) {
        if self.bytes_to_complete > 0 {
            // Continuation of a multibyte character. Bytes are copied
            // verbatim; the glyph cache validates on display.
            self.pending[self.pending_len] = byte;
            self.pending_len += 1;
            self.bytes_to_complete -= 1;
            if self.bytes_to_complete == 0 {
                out.push(Block::Utf8(Utf8Block::from_raw(self.pending)));
                self.pending = [0; MAX_BYTES_PER_CHAR];
                self.pending_len = 0;
            }
            return;
        }

        if byte == 0x1B {
            self.state = State::Escape;
            return;
        }

        match Utf8Block::sequence_length(byte) {
            // a continuation byte with no sequence in progress
            None => out.push(Block::Utf8(Utf8Block::STRAY_CONTINUATION)),
            Some(1) => out.push(Block::Utf8(Utf8Block::from_raw([byte, 0, 0, 0]))),
            Some(len) => {
                self.pending = [0; MAX_BYTES_PER_CHAR];
                self.pending[0] = byte;
                self.pending_len = 1;
                self.bytes_to_complete = len - 1;
            }
        }
    }

    /// Only `ESC [` sequences are supported; anything else drops the ESC
    /// and the byte that followed it.
    fn escape(&mut self, byte: u8) {
        if byte == b'[' {
            self.state = State::Csi;
            self.args = [0; MAX_ARGS];
            self.arg_index = 0;
        } else {
            self.state = State::Ground;
        }
    }

    fn csi(&mut self, byte: u8, out: &mut Vec<Block>) {
        match byte {
            b'0'..=b'9' => {
                if self.arg_index < MAX_ARGS {
                    let digit = u16::from(byte - b'0');
                    let arg = &mut self.args[self.arg_index];
                    *arg = arg.saturating_mul(10).saturating_add(digit);
                }
            }
            b';' => {
                if self.arg_index < MAX_ARGS {
                    self.arg_index += 1;
                    if self.arg_index < MAX_ARGS {
                        self.args[self.arg_index] = 0;
                    }
                }
            }
            // a new escape may interrupt an unfinished sequence
            0x1B => self.state = State::Escape,
            _ => self.dispatch(byte, out),
        }
    }

    /// Handle a CSI final byte and return to ground. Unknown finals abandon
    /// the sequence without emitting anything.
    fn dispatch(&mut self, final_byte: u8, out: &mut Vec<Block>) {
        self.state = State::Ground;
        let n = self.args[0];
        match final_byte {
            b'A' => out.push(Block::CursorUp { n }),
            b'B' => out.push(Block::CursorDown { n }),
            b'C' => out.push(Block::CursorForward { n }),
            b'D' => out.push(Block::CursorBack { n }),
            b'E' => out.push(Block::CursorNextLine { n }),
            b'F' => out.push(Block::CursorPreviousLine { n }),
            b'G' | b'f' => out.push(Block::CursorHorizontalAbsolute { col: n }),
            b'H' => out.push(Block::CursorPosition {
                row: self.args[0],
                col: self.args[1],
            }),
            b'J' => out.push(Block::EraseDisplay {
                mode: self.args[0] as u8,
            }),
            b'K' => out.push(Block::EraseLine {
                mode: self.args[0] as u8,
            }),
            b'S' => out.push(Block::ScrollUp { n }),
            b'T' => out.push(Block::ScrollDown { n }),
            b's' => out.push(Block::SaveCursor),
            b'u' => out.push(Block::LoadCursor),
            b'm' => self.select_graphics(out),
            _ => {}
        }
    }

    /// SGR: emit one graphics block per recognized parameter.
    ///
    /// `38`/`48` consume their `5;n` or `2;r;g;b` payload. A malformed
    /// payload or an unrecognized value stops the scan for this sequence.
    fn select_graphics(&mut self, out: &mut Vec<Block>) {
        let count = (self.arg_index + 1).min(MAX_ARGS);
        let args = &self.args[..count];

        let mut i = 0;
        while i < count {
            match args[i] {
                0 => out.push(Block::GraphicsReset),
                1 => out.push(Block::GraphicsBold),
                3 => out.push(Block::GraphicsItalic),
                30..=37 => out.push(Block::GraphicsForeground {
                    color: Color::from8((args[i] - 30) as u8),
                }),
                40..=47 => out.push(Block::GraphicsBackground {
                    color: Color::from8((args[i] - 40) as u8),
                }),
                90..=97 => out.push(Block::GraphicsForeground {
                    color: Color::from8bright((args[i] - 90) as u8),
                }),
                100..=107 => out.push(Block::GraphicsBackground {
                    color: Color::from8bright((args[i] - 100) as u8),
                }),
                sel @ (38 | 48) => match Self::extended_color(args, i) {
                    Some((color, consumed)) => {
                        if sel == 38 {
                            out.push(Block::GraphicsForeground { color });
                        } else {
                            out.push(Block::GraphicsBackground { color });
                        }
                        i += consumed;
                    }
                    None => break,
                },
                _ => break,
            }
            i += 1;
        }
    }

    /// Decode the payload of SGR 38/48 starting at `args[at]`. Returns the
    /// color and the number of payload arguments consumed.
    fn extended_color(args: &[u16], at: usize) -> Option<(Color, usize)> {
        match *args.get(at + 1)? {
            5 => {
                let index = *args.get(at + 2)?;
                Some((Color::from256(index as u8), 2))
            }
            2 => {
                if at + 4 >= args.len() {
                    return None;
                }
                Some((
                    Color::new(
                        args[at + 2] as u8,
                        args[at + 3] as u8,
                        args[at + 4] as u8,
                    ),
                    4,
                ))
            }
            _ => None,
        }
    }
}
