//! Process launching: fork, prepare the child, replace its image
//!
//! `launch` composes two halves. [`child_body`] runs only in the forked
//! process and never returns; [`parent_continuation`] runs in the
//! orchestrator and hands back a [`ProcessHandle`].
//!
//! Everything the child needs is prepared before the fork so the child only
//! issues syscalls and, on failure, writes one line to stderr.

use log::{debug, error, warn};
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execvp, fork};
use shell_core::{Result, ShellError};
use std::ffi::CString;

use crate::plumbing::Redirection;
use crate::signals::SignalPolicy;

/// Exit status of a child that could not set up signals or descriptors
pub const EXIT_SETUP_FAILURE: i32 = 1;

/// Exit status of a child whose image replacement failed
pub const EXIT_EXEC_FAILURE: i32 = 127;

/// How a collected process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    Exited(i32),
    Signaled(Signal),
    /// The process was gone before it could be collected (already reaped by
    /// the kernel, or the wait was interrupted)
    Reaped,
}

/// A spawned process that has not been collected yet.
///
/// Collection consumes the handle, so it happens at most once.
#[derive(Debug)]
#[must_use = "a spawned process must be collected or explicitly detached"]
pub struct ProcessHandle {
    pid: Pid,
}

impl ProcessHandle {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Block until the process terminates.
    ///
    /// `ECHILD` and `EINTR` are expected when the orchestrator ignores
    /// SIGCHLD or a signal lands mid-wait; both yield [`ExitState::Reaped`].
    pub fn collect(self) -> Result<ExitState> {
        loop {
            match waitpid(self.pid, None) {
                Ok(WaitStatus::Exited(_, code)) => {
                    debug!("Process {} exited with status {}", self.pid, code);
                    return Ok(ExitState::Exited(code));
                }
                Ok(WaitStatus::Signaled(_, signal, _)) => {
                    debug!("Process {} killed by {}", self.pid, signal);
                    return Ok(ExitState::Signaled(signal));
                }
                Ok(_) => continue,
                Err(e @ (Errno::ECHILD | Errno::EINTR)) => {
                    debug!("Process {} not collectable ({}), treating as reaped", self.pid, e);
                    return Ok(ExitState::Reaped);
                }
                Err(e) => {
                    error!("waitpid failed for process {}: {}", self.pid, e);
                    return Err(ShellError::Collect {
                        pid: self.pid.as_raw(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Give up on collecting the process; the ambient SIGCHLD disposition
    /// takes care of it.
    pub fn detach(self) -> Pid {
        debug!("Detached process {}", self.pid);
        self.pid
    }
}

/// An argument vector converted to exec-ready strings.
///
/// Building one is the only step of a launch that can reject its input, so
/// strategies build every `Program` they need before creating pipes, opening
/// files or forking.
#[derive(Debug, Clone)]
pub struct Program {
    args: Vec<CString>,
}

impl Program {
    pub fn new(argv: &[String]) -> Result<Self> {
        if argv.is_empty() {
            return Err(ShellError::InvalidLine("empty command".to_string()));
        }
        let args = argv
            .iter()
            .map(|arg| {
                CString::new(arg.as_str()).map_err(|_| {
                    ShellError::InvalidArgument(format!(
                        "argument contains a nul byte: {:?}",
                        arg
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { args })
    }

    /// The program name, `argv[0]`
    pub fn name(&self) -> &str {
        self.args[0].to_str().unwrap_or("?")
    }

    /// Spawn the program. See [`launch`].
    pub fn spawn(
        &self,
        policy: SignalPolicy,
        redirections: &[Redirection],
    ) -> Result<ProcessHandle> {
        // SAFETY: the child branch only calls sigaction, dup2, close, fcntl,
        // execvp, write(2) on stderr, and _exit.
        match unsafe { fork() } {
            Ok(ForkResult::Child) => child_body(&self.args, policy, redirections),
            Ok(ForkResult::Parent { child }) => Ok(parent_continuation(child, self.name())),
            Err(e) => {
                error!("fork failed for '{}': {}", self.name(), e);
                Err(ShellError::Spawn(e.to_string()))
            }
        }
    }
}

/// Spawn `argv[0]` with `argv` as its argument list.
///
/// The child installs `policy`, applies `redirections` in order, then execs.
/// Only a failed fork is reported here; anything that fails after the fork is
/// visible solely as the child's exit status.
pub fn launch(
    argv: &[String],
    policy: SignalPolicy,
    redirections: &[Redirection],
) -> Result<ProcessHandle> {
    Program::new(argv)?.spawn(policy, redirections)
}

fn parent_continuation(pid: Pid, program: &str) -> ProcessHandle {
    debug!("Spawned '{}' as process {}", program, pid);
    ProcessHandle { pid }
}

fn child_body(args: &[CString], policy: SignalPolicy, redirections: &[Redirection]) -> ! {
    if let Err((signal, e)) = policy.install() {
        child_report(&[
            b"Error - failed to change the handling of ",
            signal.as_str().as_bytes(),
            b": ",
            e.desc().as_bytes(),
        ]);
        exit_child(EXIT_SETUP_FAILURE);
    }

    for redirection in redirections {
        if let Err(e) = redirection.apply() {
            child_report(&[
                b"Error - failed to redirect ",
                redirection.target_name().as_bytes(),
                b": ",
                e.desc().as_bytes(),
            ]);
            exit_child(EXIT_SETUP_FAILURE);
        }
    }

    match execvp(&args[0], args) {
        Ok(never) => match never {},
        Err(e) => {
            child_report(&[args[0].to_bytes(), b": ", e.desc().as_bytes()]);
            exit_child(EXIT_EXEC_FAILURE);
        }
    }
}

/// Write one diagnostic line to stderr from a forked child.
///
/// Goes straight to write(2): the std stderr lock may be held by a thread
/// that does not exist in the child.
fn child_report(parts: &[&[u8]]) {
    for part in parts.iter().copied().chain([&b"\n"[..]]) {
        let mut rest = part;
        while !rest.is_empty() {
            // SAFETY: the pointer and length describe a live byte slice.
            let written = unsafe {
                libc::write(
                    libc::STDERR_FILENO,
                    rest.as_ptr() as *const libc::c_void,
                    rest.len(),
                )
            };
            if written <= 0 {
                return;
            }
            rest = &rest[written as usize..];
        }
    }
}

fn exit_child(status: i32) -> ! {
    // SAFETY: _exit skips atexit handlers and stdio flushing that belong to
    // the orchestrator's copy of the address space.
    unsafe { libc::_exit(status) }
}

/// Wait for a process whose handle was never taken, logging instead of failing.
///
/// Used when a multi-process setup aborts half way and the already spawned
/// process still has to be collected.
pub(crate) fn collect_quietly(handle: ProcessHandle) {
    let pid = handle.pid();
    if let Err(e) = handle.collect() {
        warn!("Could not collect process {} after aborted setup: {}", pid, e);
    }
}
