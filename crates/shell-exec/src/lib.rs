//! shell-exec: command execution core for a line-oriented interpreter
//!
//! Takes one tokenized line, classifies it and runs it as a foreground
//! command, a background command, a two-stage pipeline, or a command with
//! its output redirected to a file.
//!
//! # Modules
//!
//! - **signals**: interrupt and child-termination dispositions
//! - **plumbing**: pipes, redirect targets, stdio rebinding
//! - **launcher**: fork, child setup, exec, collection
//! - **strategy**: the four execution strategies
//! - **dispatch**: line classification and the entry point
//! - **lifecycle**: startup and shutdown hooks
//!
//! # Example
//!
//! ```ignore
//! use shell_exec::{dispatch, initialize};
//!
//! initialize()?;
//! let mut line: Vec<String> = ["ls", "|", "wc", "-l"].map(String::from).to_vec();
//! let outcome = dispatch(&mut line);
//! assert!(outcome.is_success());
//! ```

pub mod dispatch;
pub mod launcher;
pub mod lifecycle;
pub mod plumbing;
pub mod signals;
pub mod strategy;

pub use dispatch::{LineShape, Outcome, classify, dispatch};
pub use launcher::{ExitState, ProcessHandle, Program, launch};
pub use lifecycle::{finalize, initialize};
pub use plumbing::{Channel, Redirection, StandardStream, make_channel};
pub use shell_core::{Result, ShellError};
pub use signals::{Disposition, SignalPolicy};
