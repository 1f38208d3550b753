//! Error types for PTY operations.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PtyError {
    #[error("failed to open PTY master: {0}")]
    OpenMaster(#[source] io::Error),

    #[error("failed to grant PTY access: {0}")]
    Grant(#[source] io::Error),

    #[error("failed to unlock PTY: {0}")]
    Unlock(#[source] io::Error),

    #[error("failed to resolve slave device name: {0}")]
    SlaveName(#[source] io::Error),

    #[error("failed to open slave PTY: {0}")]
    OpenSlave(#[source] io::Error),

    #[error("failed to fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("failed to set window size: {0}")]
    WindowSize(#[source] io::Error),

    #[error("shell path contains an interior NUL: {0:?}")]
    ShellPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
