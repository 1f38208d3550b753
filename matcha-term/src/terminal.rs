//! A live terminal session: shell child, parser and screen glued together.
//!
//! The session owns everything on the PTY side of the data flow:
//! bytes read from the master feed the block stream, blocks feed the
//! screen, and outbound input goes through the bounded write queue.

use std::io::{self, Read};
use std::time::Duration;

use matcha_core::screen::CellPainter;
use matcha_core::{Screen, CELLS_PER_HEIGHT, CELLS_PER_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH};
use matcha_parser::BlockStream;
use matcha_pty::{Child, PtyError, WindowSize, WriteQueue};

use crate::config::Config;

/// Upper bound on bytes consumed from the PTY per frame.
pub const MAX_READ: usize = 256;

/// Frame pacing for the main loop.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(20);

/// Result of one PTY poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtyPoll {
    /// Nothing to read this frame.
    Idle,
    /// Blocks were applied; the frame should be presented.
    Dirty,
    /// The shell is gone; the session is over.
    Exited,
}

pub struct Session {
    child: Child,
    stream: BlockStream,
    pub screen: Screen,
    queue: WriteQueue,
}

impl Session {
    /// Spawn the configured shell on a PTY with the fixed 80x24 geometry.
    pub fn spawn(config: &Config) -> Result<Self, PtyError> {
        let size = WindowSize::with_pixels(
            CELLS_PER_HEIGHT as u16,
            CELLS_PER_WIDTH as u16,
            SCREEN_WIDTH as u16,
            SCREEN_HEIGHT as u16,
        );
        let child = Child::spawn(&config.shell, &config.term, size)?;
        Ok(Session {
            child,
            stream: BlockStream::new(),
            screen: Screen::with_attributes(config.default_attributes()),
            queue: WriteQueue::new(),
        })
    }

    /// One non-blocking read from the PTY, parsed and applied to the screen.
    ///
    /// `EIO` means the child side hung up, which ends the session cleanly;
    /// any other error is fatal and propagates.
    pub fn poll(&mut self, painter: &mut dyn CellPainter) -> io::Result<PtyPoll> {
        let mut buf = [0u8; MAX_READ];
        match self.child.read(&mut buf) {
            Ok(0) => Ok(PtyPoll::Exited),
            Ok(n) => {
                let blocks = self.stream.consume(&buf[..n]);
                if blocks.is_empty() {
                    return Ok(PtyPoll::Idle);
                }
                for block in &blocks {
                    self.screen.apply(block, painter);
                }
                Ok(PtyPoll::Dirty)
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => Ok(PtyPoll::Idle),
            Err(ref e) if e.raw_os_error() == Some(libc::EIO) => Ok(PtyPoll::Exited),
            Err(e) => Err(e),
        }
    }

    /// Queue input bytes for the shell.
    pub fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.queue.send(&mut self.child, bytes)
    }

    pub fn has_pending_output(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Retry bytes the kernel refused earlier.
    pub fn flush_output(&mut self) -> io::Result<()> {
        self.queue.flush(&mut self.child)
    }
}
