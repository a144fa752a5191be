//! shell-core: shared types for the shell execution crates
//!
//! Holds the error taxonomy and `Result` alias used by `shell-exec` and the
//! `shell-ctl` binary.

pub mod error;

pub use error::{Result, ShellError};
