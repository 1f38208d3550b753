//! PTY master allocation.
//!
//! The master side is opened non-blocking: the main loop polls it once per
//! frame and must never stall on a quiet shell.

use std::ffi::CStr;
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};

use crate::error::PtyError;
use crate::size::WindowSize;

/// A PTY master and the path of its slave device.
#[derive(Debug)]
pub struct Pty {
    master: File,
    slave_path: String,
}

impl Pty {
    /// Open a new PTY master, non-blocking, without claiming it as the
    /// controlling terminal.
    pub fn open() -> Result<Self, PtyError> {
        let fd = unsafe {
            libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY | libc::O_NONBLOCK)
        };
        if fd < 0 {
            return Err(PtyError::OpenMaster(io::Error::last_os_error()));
        }
        // from_raw_fd before the fallible calls so the fd is closed on error
        let master = unsafe { File::from_raw_fd(fd) };

        if unsafe { libc::grantpt(fd) } != 0 {
            return Err(PtyError::Grant(io::Error::last_os_error()));
        }
        if unsafe { libc::unlockpt(fd) } != 0 {
            return Err(PtyError::Unlock(io::Error::last_os_error()));
        }

        let mut buf = [0 as libc::c_char; 128];
        if unsafe { libc::ptsname_r(fd, buf.as_mut_ptr(), buf.len()) } != 0 {
            return Err(PtyError::SlaveName(io::Error::last_os_error()));
        }
        let slave_path = unsafe { CStr::from_ptr(buf.as_ptr()) }
            .to_string_lossy()
            .into_owned();

        Ok(Pty { master, slave_path })
    }

    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    pub fn slave_path(&self) -> &str {
        &self.slave_path
    }

    /// Open the slave device, used by the forked child before exec.
    pub fn open_slave(&self) -> Result<File, PtyError> {
        use std::os::unix::fs::OpenOptionsExt;
        std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&self.slave_path)
            .map_err(PtyError::OpenSlave)
    }

    pub fn set_size(&self, size: WindowSize) -> Result<(), PtyError> {
        size.set_on_fd(self.master_fd()).map_err(PtyError::WindowSize)
    }

    pub fn get_size(&self) -> io::Result<WindowSize> {
        WindowSize::get_from_fd(self.master_fd())
    }

    /// Toggle `O_NONBLOCK` on the master.
    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        let fd = self.master_fd();
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        let new_flags = if nonblocking {
            flags | libc::O_NONBLOCK
        } else {
            flags & !libc::O_NONBLOCK
        };
        if unsafe { libc::fcntl(fd, libc::F_SETFL, new_flags) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl AsRawFd for Pty {
    fn as_raw_fd(&self) -> RawFd {
        self.master_fd()
    }
}

impl Read for Pty {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.master.read(buf)
    }
}

impl Write for Pty {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.master.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.master.flush()
    }
}
