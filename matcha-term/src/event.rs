//! Events queued between winit dispatch and the frame step.
//!
//! Window events arrive whenever winit delivers them; the frame loop drains
//! a bounded number per iteration so a burst of input cannot starve PTY
//! reads or rendering.

/// Maximum events handled per frame.
pub const MAX_EVENTS_PER_FRAME: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermEvent {
    /// Bytes to forward to the shell.
    Input(Vec<u8>),
    /// Mouse-wheel lines; positive scrolls toward older content.
    Scroll(i32),
}
