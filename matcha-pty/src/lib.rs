//! Matcha PTY management
//!
//! The kernel-facing side of the matcha terminal:
//! - Opening the PTY master/slave pair (non-blocking master)
//! - Spawning the child shell with session and controlling-terminal setup
//! - Window-size propagation (`TIOCSWINSZ` / `SIGWINCH`)
//! - Bounded-time outbound buffering over the non-blocking fd
//!
//! Linux-specific; uses the POSIX PTY APIs.

pub mod child;
pub mod error;
pub mod pty;
pub mod size;
pub mod writer;

pub use child::Child;
pub use error::PtyError;
pub use pty::Pty;
pub use size::WindowSize;
pub use writer::WriteQueue;
