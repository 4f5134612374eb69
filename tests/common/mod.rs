//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use phpbuild::infra::process::{ToolInvocation, ToolInvoker, ToolStatus};

/// Test home context
///
/// Creates a temporary phpbuild home (with a config directory inside it)
/// and runs the binary against it.
pub struct TestHome {
    /// Temporary directory for the test home
    pub dir: TempDir,
}

impl TestHome {
    /// Create a new test home in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test home
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Config directory used by the binary
    pub fn config_dir(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    /// Create a file relative to the test home
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a path exists relative to the test home
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Run phpbuild with the test home as `PHPBUILD_HOME`
    pub fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_phpbuild"));
        cmd.current_dir(self.dir.path())
            .env("PHPBUILD_HOME", self.dir.path())
            .env("PHPBUILD_CONFIG_DIR", self.config_dir())
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .args(args);
        cmd.output().expect("Failed to execute phpbuild")
    }
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal unpacked PHP source tree
pub fn create_source_tree(root: &Path, version: &str) -> PathBuf {
    let source = root.join(format!("php-{version}"));
    std::fs::create_dir_all(source.join("sapi/fpm")).expect("Failed to create source tree");
    std::fs::write(source.join("configure"), "#!/bin/sh\n").expect("Failed to write configure");
    std::fs::write(source.join("php.ini-development"), SAMPLE_INI_DEVELOPMENT)
        .expect("Failed to write php.ini-development");
    std::fs::write(source.join("php.ini-production"), SAMPLE_INI_PRODUCTION)
        .expect("Failed to write php.ini-production");
    std::fs::write(source.join("sapi/fpm/php-fpm.conf"), "[global]\n")
        .expect("Failed to write php-fpm.conf");
    source
}

/// Invoker that records invocations instead of spawning them
#[derive(Default)]
pub struct RecordingInvoker {
    /// Invocations seen, in order
    pub calls: RefCell<Vec<ToolInvocation>>,
    /// Command line prefixes that exit with the given code
    pub failures: Vec<(String, i32)>,
}

impl RecordingInvoker {
    /// Invoker where every command succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Make commands starting with `prefix` fail
    pub fn failing(mut self, prefix: &str, code: i32) -> Self {
        self.failures.push((prefix.to_string(), code));
        self
    }

    /// Recorded command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(ToolInvocation::command_line).collect()
    }
}

impl ToolInvoker for RecordingInvoker {
    fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolStatus> {
        self.calls.borrow_mut().push(invocation.clone());
        let line = invocation.command_line();
        let status = self
            .failures
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map_or(ToolStatus::SUCCESS, |(_, code)| ToolStatus::exited(*code));
        Ok(status)
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/usr/bin").join(program))
    }
}

/// Development php.ini template
pub const SAMPLE_INI_DEVELOPMENT: &str = r#"[PHP]
display_errors = On

[Date]
; Defines the default timezone used by the date functions
;date.timezone =

[Phar]
;phar.readonly = On
"#;

/// Production php.ini template
pub const SAMPLE_INI_PRODUCTION: &str = r#"[PHP]
display_errors = Off

[Date]
;date.timezone =

[Phar]
;phar.readonly = On
"#;

/// Persisted variant record of an earlier build
pub const SAMPLE_RECORD: &str = r#"disabled_variants = ["json"]
extra_options = ["--with-libdir=lib64"]

[enabled_variants]
gd = "shared"
openssl = "yes"
pdo = true
"#;
