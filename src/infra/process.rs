//! External tool invocation
//!
//! Spawns `configure`, `make` and friends. Stages only describe what to run
//! through [`ToolInvocation`]; the [`ToolInvoker`] decides how.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Exit status of an external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

impl ToolStatus {
    /// Successful exit
    pub const SUCCESS: Self = Self { code: Some(0) };

    /// Status with the given exit code
    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Whether the tool exited with code 0
    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {code}"),
            None => write!(f, "termination by signal"),
        }
    }
}

impl From<std::process::ExitStatus> for ToolStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// One external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Program name or path
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
    /// Append combined stdout/stderr here instead of inheriting
    pub log: Option<PathBuf>,
}

impl ToolInvocation {
    /// Create an invocation running in `cwd`
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
            env: Vec::new(),
            log: None,
        }
    }

    /// Append an argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable
    #[must_use]
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Redirect output into a log file
    #[must_use]
    pub fn log_to(mut self, path: &Path) -> Self {
        self.log = Some(path.to_path_buf());
        self
    }

    /// Render as a shell-like command line
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs external tools
pub trait ToolInvoker {
    /// Run the invocation to completion
    fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolStatus>;

    /// Find `program` on `PATH`
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// Invoker backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInvoker;

impl ToolInvoker for ProcessInvoker {
    fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolStatus> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null());

        if let Some(ref log) = invocation.log {
            let mut file = OpenOptions::new().create(true).append(true).open(log)?;
            writeln!(file, "$ {}", invocation.command_line())?;
            cmd.stdout(Stdio::from(file.try_clone()?));
            cmd.stderr(Stdio::from(file));
        }

        tracing::debug!("Running: {}", invocation.command_line());
        let status = cmd.status()?;
        Ok(status.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_line_rendering() {
        let inv = ToolInvocation::new("make", Path::new("/src"))
            .arg("-j4")
            .args(["install", "V=1"]);
        assert_eq!(inv.command_line(), "make -j4 install V=1");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ToolStatus::exited(2).to_string(), "exit status 2");
        assert_eq!(
            ToolStatus { code: None }.to_string(),
            "termination by signal"
        );
        assert!(ToolStatus::SUCCESS.success());
        assert!(!ToolStatus::exited(1).success());
    }

    #[cfg(unix)]
    #[test]
    fn test_process_invoker_appends_output_to_log() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("build.log");

        let first = ToolInvocation::new("sh", tmp.path())
            .args(["-c", "echo first; echo oops >&2"])
            .log_to(&log);
        let second = ToolInvocation::new("sh", tmp.path())
            .args(["-c", "echo second; exit 3"])
            .log_to(&log);

        assert!(ProcessInvoker.run(&first).unwrap().success());
        assert_eq!(ProcessInvoker.run(&second).unwrap(), ToolStatus::exited(3));

        let content = std::fs::read_to_string(&log).unwrap();
        assert!(content.contains("$ sh -c echo first"));
        assert!(content.contains("first"));
        assert!(content.contains("oops"));
        assert!(content.contains("second"));
    }

    #[test]
    fn test_process_invoker_missing_program_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let inv = ToolInvocation::new("phpbuild-definitely-missing-tool", tmp.path());
        assert!(ProcessInvoker.run(&inv).is_err());
    }
}
