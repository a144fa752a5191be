//! Signal dispositions for the orchestrator and the processes it spawns
//!
//! Only two signals matter here: the terminal interrupt and child
//! termination. The orchestrator ignores both while it sits between lines;
//! every spawned process resets both to their default action before it
//! replaces its image.

use nix::errno::Errno;
use nix::sys::signal::{SigHandler, Signal, signal};
use shell_core::{Result, ShellError};

/// What the kernel does when a signal arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ignore,
    Default,
}

impl Disposition {
    fn handler(self) -> SigHandler {
        match self {
            Disposition::Ignore => SigHandler::SigIgn,
            Disposition::Default => SigHandler::SigDfl,
        }
    }
}

/// Dispositions for the interrupt and child-termination signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalPolicy {
    /// SIGINT
    pub interrupt: Disposition,
    /// SIGCHLD
    pub child_exit: Disposition,
}

impl SignalPolicy {
    /// Installed on the orchestrator once at startup.
    ///
    /// Ignoring SIGCHLD makes the kernel reap exited children on its own,
    /// which is what collects background processes nobody waits for.
    pub const IDLE: SignalPolicy = SignalPolicy {
        interrupt: Disposition::Ignore,
        child_exit: Disposition::Ignore,
    };

    /// Installed in every spawned process between fork and exec.
    pub const CHILD: SignalPolicy = SignalPolicy {
        interrupt: Disposition::Default,
        child_exit: Disposition::Default,
    };

    /// Install both dispositions on the calling process.
    ///
    /// Only performs `sigaction`, so it is safe to call in a freshly forked
    /// child. On failure reports which signal could not be changed.
    pub fn install(self) -> std::result::Result<(), (Signal, Errno)> {
        for (sig, disposition) in [
            (Signal::SIGINT, self.interrupt),
            (Signal::SIGCHLD, self.child_exit),
        ] {
            // SAFETY: SigIgn and SigDfl carry no handler code that could
            // violate async-signal safety.
            unsafe { signal(sig, disposition.handler()) }.map_err(|e| (sig, e))?;
        }
        Ok(())
    }

    /// Install the policy on the orchestrator, reporting failure as an error.
    pub fn apply(self) -> Result<()> {
        self.install().map_err(|(sig, e)| {
            ShellError::Signal(format!("failed to change the handling of {}: {}", sig, e))
        })
    }
}
