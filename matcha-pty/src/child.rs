//! Spawning the shell attached to the PTY slave.
//!
//! The forked child becomes a session leader, claims the slave as its
//! controlling terminal, wires it to stdin/stdout/stderr and execs the
//! shell with `TERM` replaced in an otherwise inherited environment.

use std::ffi::{CStr, CString};
use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};

use crate::error::PtyError;
use crate::pty::Pty;
use crate::size::WindowSize;

/// A shell process attached to a PTY, owned from the master side.
pub struct Child {
    pty: Pty,
    pid: Pid,
}

impl Child {
    /// Spawn `shell` (argv is just the shell path) on a fresh PTY with the
    /// given window size and `TERM` value.
    pub fn spawn(shell: &str, term: &str, size: WindowSize) -> Result<Self, PtyError> {
        let pty = Pty::open()?;
        pty.set_size(size)?;

        let program = CString::new(shell)
            .map_err(|_| PtyError::ShellPath(shell.to_string()))?;
        let env = build_env(term);

        match unsafe { unistd::fork() } {
            Ok(ForkResult::Parent { child }) => {
                log::info!("spawned {} as pid {}", shell, child);
                Ok(Child { pty, pid: child })
            }
            Ok(ForkResult::Child) => {
                exec_child(&pty, &program, &env);
                // only reached when exec failed
                std::process::exit(1);
            }
            Err(e) => Err(PtyError::Fork(e)),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn pty(&self) -> &Pty {
        &self.pty
    }

    pub fn pty_mut(&mut self) -> &mut Pty {
        &mut self.pty
    }

    pub fn master_fd(&self) -> RawFd {
        self.pty.master_fd()
    }

    /// Update the window size and notify the child.
    pub fn resize(&self, size: WindowSize) -> Result<(), PtyError> {
        self.pty.set_size(size)?;
        signal::kill(self.pid, Signal::SIGWINCH)
            .map_err(|e| PtyError::Io(io::Error::from_raw_os_error(e as i32)))
    }

    /// Non-blocking check for child exit. `Some(code)` once it is gone.
    pub fn try_wait(&self) -> io::Result<Option<i32>> {
        match waitpid(self.pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(_, code)) => Ok(Some(code)),
            Ok(WaitStatus::Signaled(_, sig, _)) => Ok(Some(128 + sig as i32)),
            Ok(_) => Ok(None),
            // already reaped
            Err(Errno::ECHILD) => Ok(Some(0)),
            Err(e) => Err(io::Error::from_raw_os_error(e as i32)),
        }
    }

    /// Block until the child exits.
    pub fn wait(&self) -> io::Result<i32> {
        match waitpid(self.pid, None) {
            Ok(WaitStatus::Exited(_, code)) => Ok(code),
            Ok(WaitStatus::Signaled(_, sig, _)) => Ok(128 + sig as i32),
            Ok(_) => Ok(0),
            Err(Errno::ECHILD) => Ok(0),
            Err(e) => Err(io::Error::from_raw_os_error(e as i32)),
        }
    }

    pub fn kill(&self) -> io::Result<()> {
        signal::kill(self.pid, Signal::SIGKILL)
            .map_err(|e| io::Error::from_raw_os_error(e as i32))
    }
}

impl Read for Child {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.pty.read(buf)
    }
}

impl Write for Child {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pty.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.pty.flush()
    }
}

impl Drop for Child {
    fn drop(&mut self) {
        // reap if already dead so the child cannot linger as a zombie
        let _ = self.try_wait();
    }
}

/// Inherited environment with `TERM` replaced.
fn build_env(term: &str) -> Vec<CString> {
    let mut env = Vec::new();
    for (key, value) in std::env::vars() {
        if key == "TERM" {
            continue;
        }
        if let Ok(var) = CString::new(format!("{key}={value}")) {
            env.push(var);
        }
    }
    if let Ok(var) = CString::new(format!("TERM={term}")) {
        env.push(var);
    }
    env
}

/// Runs in the forked child; never returns except by `exit`.
fn exec_child(pty: &Pty, program: &CString, env: &[CString]) {
    if unistd::setsid().is_err() {
        eprintln!("matcha: failed to create session");
        std::process::exit(1);
    }

    let slave = match pty.open_slave() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("matcha: failed to open slave PTY: {e}");
            std::process::exit(1);
        }
    };
    let slave_fd = slave.as_raw_fd();

    if unsafe { libc::ioctl(slave_fd, libc::TIOCSCTTY, 0) } < 0 {
        eprintln!("matcha: failed to set controlling terminal");
        std::process::exit(1);
    }

    for fd in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
        if unistd::dup2(slave_fd, fd).is_err() {
            std::process::exit(1);
        }
    }
    if slave_fd > 2 {
        drop(slave);
    }

    let argv: Vec<&CStr> = vec![program.as_c_str()];
    let envp: Vec<&CStr> = env.iter().map(|s| s.as_c_str()).collect();
    let _ = unistd::execve(program.as_c_str(), &argv, &envp);

    eprintln!("matcha: failed to execute {:?}", program);
}
