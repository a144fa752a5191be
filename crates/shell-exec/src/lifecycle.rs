//! Interpreter startup and shutdown hooks

use log::debug;
use shell_core::Result;

use crate::signals::SignalPolicy;

/// Install the idle signal policy. Call once, before the first line.
///
/// An error here should abort interpreter startup.
pub fn initialize() -> Result<()> {
    SignalPolicy::IDLE.apply()?;
    debug!("Installed idle signal policy");
    Ok(())
}

/// Counterpart of [`initialize`]; currently there is nothing to undo.
pub fn finalize() {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Outcome, dispatch};
    use crate::test_support::serial_guard;
    use std::fs;
    use std::path::Path;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    /// Runs the interpreter's startup hook and puts default dispositions back
    /// when dropped, even if the test panics.
    struct Initialized;

    impl Initialized {
        fn new() -> Self {
            initialize().unwrap();
            Initialized
        }
    }

    impl Drop for Initialized {
        fn drop(&mut self) {
            finalize();
            let _ = SignalPolicy::CHILD.apply();
        }
    }

    fn line(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn wait_for_line(path: &Path) -> String {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Ok(contents) = fs::read_to_string(path)
                && contents.ends_with('\n')
            {
                return contents;
            }
            assert!(Instant::now() < deadline, "{} never written", path.display());
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    #[test]
    fn foreground_survives_auto_reaping() {
        let _guard = serial_guard();
        let _init = Initialized::new();

        // With SIGCHLD ignored the kernel reaps the child itself and waitpid
        // reports ECHILD, which must not count as a failure.
        assert_eq!(dispatch(&mut line(&["true"])), Outcome::Success);
    }

    #[test]
    fn pipeline_runs_under_idle_policy() {
        let _guard = serial_guard();
        let _init = Initialized::new();
        let dir = tempdir().unwrap();
        let out = dir.path().join("piped.txt");

        let sink = format!("cat > '{}'", out.display());
        let mut argv = line(&["printf", "ab", "|", "sh", "-c", &sink]);
        assert_eq!(dispatch(&mut argv), Outcome::Success);

        // Both sides were waited on, so the reader has finished writing.
        assert_eq!(fs::read_to_string(&out).unwrap(), "ab");
    }

    #[test]
    fn redirect_runs_under_idle_policy() {
        let _guard = serial_guard();
        let _init = Initialized::new();
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.txt");

        let target = out.to_string_lossy().into_owned();
        let mut argv = line(&["echo", "idle", ">", &target]);
        assert_eq!(dispatch(&mut argv), Outcome::Success);
        assert_eq!(fs::read_to_string(&out).unwrap(), "idle\n");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn background_child_leaves_no_zombie() {
        let _guard = serial_guard();
        let _init = Initialized::new();
        let dir = tempdir().unwrap();
        let pid_file = dir.path().join("pid");

        let script = format!("echo $$ > '{}'", pid_file.display());
        assert_eq!(
            dispatch(&mut line(&["sh", "-c", &script, "&"])),
            Outcome::Success
        );

        // A zombie keeps its /proc entry until collected; an auto-reaped
        // child loses it as soon as it exits.
        let pid: i32 = wait_for_line(&pid_file).trim().parse().unwrap();
        let proc_entry = format!("/proc/{}", pid);
        let deadline = Instant::now() + Duration::from_secs(5);
        while Path::new(&proc_entry).exists() {
            assert!(Instant::now() < deadline, "process {} was never reaped", pid);
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    #[test]
    fn foreground_after_background_does_not_wait_for_it() {
        let _guard = serial_guard();
        let _init = Initialized::new();

        assert_eq!(dispatch(&mut line(&["sleep", "3", "&"])), Outcome::Success);

        let start = Instant::now();
        assert_eq!(dispatch(&mut line(&["true"])), Outcome::Success);
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
