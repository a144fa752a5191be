//! Descriptor plumbing: pipes, redirect targets and stdio rebinding
//!
//! Descriptors held by the orchestrator are `OwnedFd`s, so releasing them is
//! a drop. Inside a forked child the same descriptors are addressed by raw
//! number through [`Redirection`], because the child never returns to run
//! destructors.

use log::debug;
use nix::fcntl::{FcntlArg, FdFlag, fcntl};
use nix::unistd::{close, dup2, pipe2};
use shell_core::{Result, ShellError};
use std::fs::OpenOptions;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Permission bits for redirect targets, before the umask is applied.
pub const CREATE_MODE: u32 = 0o666;

/// A standard stream slot of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardStream {
    Input,
    Output,
}

impl StandardStream {
    pub fn name(self) -> &'static str {
        match self {
            StandardStream::Input => "standard input",
            StandardStream::Output => "standard output",
        }
    }

    pub fn fd(self) -> RawFd {
        match self {
            StandardStream::Input => libc::STDIN_FILENO,
            StandardStream::Output => libc::STDOUT_FILENO,
        }
    }
}

/// Both ends of an anonymous pipe.
///
/// The ends are close-on-exec, so a process that execs without binding one of
/// them never carries it into the new image.
#[derive(Debug)]
pub struct Channel {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

impl Channel {
    /// Close both ends in the calling process.
    pub fn release(self) {
        debug!(
            "Releasing channel (read={}, write={})",
            self.read.as_raw_fd(),
            self.write.as_raw_fd()
        );
        drop(self);
    }
}

/// Create a pipe.
pub fn make_channel() -> Result<Channel> {
    let (read, write) =
        pipe2(nix::fcntl::OFlag::O_CLOEXEC).map_err(|e| ShellError::Channel(e.to_string()))?;
    debug!(
        "Created channel (read={}, write={})",
        read.as_raw_fd(),
        write.as_raw_fd()
    );
    Ok(Channel { read, write })
}

/// Open a redirect target write-only, creating it if absent and truncating
/// it if present.
pub fn open_output(path: &Path) -> Result<OwnedFd> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(CREATE_MODE)
        .open(path)
        .map_err(|e| ShellError::open(path, e))?;
    debug!("Opened {} for output (fd={})", path.display(), file.as_raw_fd());
    Ok(OwnedFd::from(file))
}

/// Duplicate `endpoint` onto `stream` and close the original.
///
/// When `endpoint` already is the stream's slot it is kept and only its
/// close-on-exec flag is cleared.
pub fn bind(endpoint: RawFd, stream: StandardStream) -> nix::Result<()> {
    let target = stream.fd();
    if endpoint == target {
        fcntl(endpoint, FcntlArg::F_SETFD(FdFlag::empty()))?;
        return Ok(());
    }
    dup2(endpoint, target)?;
    release(endpoint);
    Ok(())
}

/// Best-effort close; closing an already closed descriptor is not an error.
pub fn release(endpoint: RawFd) {
    let _ = close(endpoint);
}

/// One descriptor operation performed in a spawned process before exec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirection {
    /// Close a descriptor the process has no use for
    Release(RawFd),
    /// Rebind a standard stream to `endpoint`
    Bind {
        endpoint: RawFd,
        stream: StandardStream,
    },
}

impl Redirection {
    /// What the operation acts on, for diagnostics written without allocating
    pub fn target_name(&self) -> &'static str {
        match self {
            Redirection::Release(_) => "an unused descriptor",
            Redirection::Bind { stream, .. } => stream.name(),
        }
    }

    pub fn apply(self) -> nix::Result<()> {
        match self {
            Redirection::Release(fd) => {
                release(fd);
                Ok(())
            }
            Redirection::Bind { endpoint, stream } => bind(endpoint, stream),
        }
    }
}
