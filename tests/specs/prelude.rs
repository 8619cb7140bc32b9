// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for specs.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Upper bound for polling waits in specs.
pub const SPEC_WAIT_MAX_MS: u64 = 10_000;

/// Poll `f` every 50ms until it returns true or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut f: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if f() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    f()
}

/// `onejob` against a throwaway state directory with no daemon.
pub fn cli() -> CliBuilder {
    let dir = TempDir::new().unwrap();
    let mut builder = CliBuilder::new(dir.path());
    builder._owned = Some(dir);
    builder
}

/// An isolated state directory, with the daemon stopped on drop.
pub struct Sandbox {
    dir: TempDir,
    worker: Option<String>,
}

impl Sandbox {
    pub fn empty() -> Self {
        Self { dir: TempDir::new().unwrap(), worker: None }
    }

    /// Sandbox whose daemon runs `script` (a POSIX shell script) for every job.
    pub fn with_worker(script: &str) -> Self {
        let mut sandbox = Self::empty();
        let path = sandbox.dir.path().join("worker.sh");
        std::fs::write(&path, script).unwrap();
        sandbox.worker = Some(format!("sh {}", path.display()));
        sandbox
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn onejob(&self) -> CliBuilder {
        let mut builder = CliBuilder::new(self.dir.path());
        if let Some(ref worker) = self.worker {
            builder.cmd.env("ONEJOB_PROCESS_COMMAND", worker);
        }
        builder
    }

    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("daemon.log")).unwrap_or_default()
    }

    /// Submit and return the new job's ID.
    pub fn submit(&self, input_ref: &str) -> String {
        let out = self.onejob().args(&["submit", input_ref, "-o", "json"]).passes().stdout();
        let job: serde_json::Value = serde_json::from_str(&out).unwrap();
        job["id"].as_str().unwrap().to_string()
    }

    /// Status of a job as reported by `status -o json`.
    pub fn status_of(&self, id: &str) -> String {
        let out = self.onejob().args(&["status", id, "-o", "json"]).passes().stdout();
        let job: serde_json::Value = serde_json::from_str(&out).unwrap();
        job["status"].as_str().unwrap_or_default().to_string()
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        if self.dir.path().join("daemon.sock").exists() {
            let _ = self.onejob().cmd.args(["daemon", "stop"]).output();
        }
    }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
    _owned: Option<TempDir>,
}

impl CliBuilder {
    fn new(state_dir: &Path) -> Self {
        let mut cmd = assert_cmd::Command::cargo_bin("onejob").unwrap();
        cmd.env("ONEJOB_STATE_DIR", state_dir)
            .env("ONEJOB_DAEMON_BINARY", daemon_binary())
            .env("ONEJOB_RECONCILE_MS", "200")
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        Self { cmd, _owned: None }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit code 0.
    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output);
        assert_eq!(run.code, 0, "expected success\nstdout: {}\nstderr: {}", run.stdout, run.stderr);
        run
    }

    /// Run and require a specific non-zero exit code.
    pub fn fails_with(mut self, code: i32) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output);
        assert_eq!(
            run.code, code,
            "unexpected exit code\nstdout: {}\nstderr: {}",
            run.stdout, run.stderr
        );
        run
    }
}

pub struct RunAssert {
    code: i32,
    stdout: String,
    stderr: String,
}

impl From<std::process::Output> for RunAssert {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        self.stdout.clone()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout missing {:?}:\n{}", needle, self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr missing {:?}:\n{}", needle, self.stderr);
        self
    }
}

fn daemon_binary() -> PathBuf {
    assert_cmd::cargo::cargo_bin("onejobd")
}
