//! Execution strategies, one per line shape
//!
//! Each strategy composes [`Program::spawn`] with the descriptor plumbing it needs
//! and decides whether, and in which order, the orchestrator waits. A child's
//! own exit status never turns into an error here; only failures of the
//! orchestration itself do.

use log::{debug, info};
use shell_core::Result;
use std::os::fd::AsRawFd;
use std::path::Path;

use crate::launcher::{ExitState, Program, collect_quietly};
use crate::plumbing::{Redirection, StandardStream, make_channel, open_output};
use crate::signals::SignalPolicy;

fn report(program: &str, state: ExitState) {
    match state {
        ExitState::Exited(0) | ExitState::Reaped => {}
        ExitState::Exited(code) => debug!("'{}' exited with status {}", program, code),
        ExitState::Signaled(signal) => info!("'{}' terminated by {}", program, signal),
    }
}

/// Run `argv` and block until it terminates.
pub fn foreground(argv: &[String]) -> Result<()> {
    let program = Program::new(argv)?;
    let handle = program.spawn(SignalPolicy::CHILD, &[])?;
    report(program.name(), handle.collect()?);
    Ok(())
}

/// Run `argv` without waiting for it.
///
/// `argv` must already be stripped of the trailing `&`.
pub fn background(argv: &[String]) -> Result<()> {
    let program = Program::new(argv)?;
    let pid = program.spawn(SignalPolicy::CHILD, &[])?.detach();
    info!("[{}] {}", pid, argv.join(" "));
    Ok(())
}

/// Run `left | right` and wait for both, left first.
///
/// Both commands are validated before anything is created. Both processes
/// are spawned before either is waited on. The orchestrator closes its copies
/// of the pipe right after spawning, so the reader sees end-of-file once the
/// writer exits.
pub fn pipeline(left: &[String], right: &[String]) -> Result<()> {
    let (left, right) = (Program::new(left)?, Program::new(right)?);

    let channel = make_channel()?;
    let read = channel.read.as_raw_fd();
    let write = channel.write.as_raw_fd();

    let writer = match left.spawn(
        SignalPolicy::CHILD,
        &[
            Redirection::Release(read),
            Redirection::Bind {
                endpoint: write,
                stream: StandardStream::Output,
            },
        ],
    ) {
        Ok(handle) => handle,
        Err(e) => {
            channel.release();
            return Err(e);
        }
    };

    let reader = right.spawn(
        SignalPolicy::CHILD,
        &[
            Redirection::Release(write),
            Redirection::Bind {
                endpoint: read,
                stream: StandardStream::Input,
            },
        ],
    );
    channel.release();

    let reader = match reader {
        Ok(handle) => handle,
        Err(e) => {
            collect_quietly(writer);
            return Err(e);
        }
    };

    debug!("Pipeline running: {} -> {}", writer.pid(), reader.pid());

    // A failed wait on the writer must not leave the reader uncollected.
    let writer_result = writer.collect();
    let reader_result = reader.collect();

    report(left.name(), writer_result?);
    report(right.name(), reader_result?);
    Ok(())
}

/// Run `argv` with its standard output written to `target`.
///
/// The file is created if missing and truncated otherwise, before any
/// process exists, so a bad path fails without spawning. A command that
/// is rejected before launch leaves the file untouched.
pub fn redirect(argv: &[String], target: &Path) -> Result<()> {
    let program = Program::new(argv)?;
    let file = open_output(target)?;
    let handle = program.spawn(
        SignalPolicy::CHILD,
        &[Redirection::Bind {
            endpoint: file.as_raw_fd(),
            stream: StandardStream::Output,
        }],
    );
    drop(file);

    let state = handle?.collect()?;
    report(program.name(), state);
    Ok(())
}
