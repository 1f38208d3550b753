//! Matcha terminal parser
//!
//! Turns the raw byte stream read from the PTY into an ordered sequence of
//! display blocks (`matcha_core::Block`). The parser is:
//! - Streaming: input may be cut at arbitrary byte boundaries
//! - Deterministic: any partition of an input parses to the same blocks
//! - Total: malformed input yields sentinel characters, never an error

pub mod stream;

pub use stream::{BlockStream, MAX_ARGS};
