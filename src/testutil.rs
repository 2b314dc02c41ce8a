//! Shared helpers for unit tests.

use crate::build::{CommandRunner, ProcessOutput};
use anyhow::Result;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Create `path` if needed and pin its mtime to `secs` after a fixed epoch,
/// so staleness comparisons do not depend on wall-clock timing.
pub fn touch_at(path: &Path, secs: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    if !path.exists() {
        fs::write(path, b"x").unwrap();
    }
    let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000 + secs);
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(t)
        .unwrap();
}

/// Records every command and answers from a script.
///
/// Commands containing any registered failure pattern report a non-zero exit;
/// everything else succeeds and writes the absolute path following `-o`, if
/// any, so later staleness checks see a fresh artifact.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    failures: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every command containing `pattern`.
    pub fn fail_on(mut self, pattern: impl Into<String>) -> Self {
        self.failures.push(pattern.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.calls().iter().filter(|c| c.contains(needle)).count()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &str) -> Result<ProcessOutput> {
        self.calls.lock().unwrap().push(command.to_string());
        if self.failures.iter().any(|f| command.contains(f.as_str())) {
            return Ok(ProcessOutput::failed(format!("error: {}", command)));
        }
        let mut tokens = command.split_whitespace();
        while let Some(token) = tokens.next() {
            if token != "-o" {
                continue;
            }
            if let Some(target) = tokens.next().map(Path::new)
                && target.is_absolute()
            {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(target, command)?;
            }
        }
        Ok(ProcessOutput::ok())
    }
}

#[test]
fn test_recording_runner_fails_on_pattern() {
    let runner = RecordingRunner::new().fail_on("bad.c");
    assert!(runner.run("cc -c good.c").unwrap().success);
    assert!(!runner.run("cc -c bad.c").unwrap().success);
    assert_eq!(runner.calls().len(), 2);
    assert_eq!(runner.count_matching("bad.c"), 1);
}
