//! Command Runner
//!
//! Launches the migration tool with captured output.
//! The working directory is handed to the spawn call, so the runner never
//! changes the directory of the calling process.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

use crate::cli::exit_codes;
use crate::redact::redact_sensitive_args;

/// A fully resolved command: program, ordered arguments and working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path, resolved against PATH at launch
    pub program: String,
    /// Arguments, passed through in order
    pub args: Vec<String>,
    /// Directory the child starts in
    pub working_directory: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, working_directory: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_directory: working_directory.into(),
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Shell-style rendering with secrets masked, for logs and `--dry-run`
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in redact_sensitive_args(&self.args) {
            write!(f, " {}", quote(&arg))?;
        }
        Ok(())
    }
}

fn quote(s: &str) -> String {
    if !s.is_empty() && !s.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Result of running a command to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// Everything the child wrote to stdout
    pub stdout: String,
    /// Everything the child wrote to stderr
    pub stderr: String,
    /// The child's exit code (128 + signal if it was killed on Unix)
    pub exit_code: i32,
}

impl InvocationResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Failures to get the tool running at all
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Binary '{0}' not found. Install it or add to PATH.")]
    BinaryNotFound(String),

    #[error("Working directory '{}' does not exist or is not a directory", .0.display())]
    WorkingDirectoryMissing(PathBuf),

    #[error("Failed to launch process: {0}")]
    LaunchFailed(String),
}

impl CommandError {
    /// Exit code the wrapper reports for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::BinaryNotFound(_) => exit_codes::TOOL_NOT_FOUND,
            CommandError::WorkingDirectoryMissing(_) | CommandError::LaunchFailed(_) => {
                exit_codes::LAUNCH_FAILURE
            }
        }
    }
}

/// Command runner for executing CLI tools
#[derive(Debug, Default)]
pub struct CommandRunner {
    /// Environment variables to add
    env_additions: HashMap<String, String>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_additions.insert(key.into(), value.into());
        self
    }

    /// Add every variable from an iterator of pairs
    pub fn with_envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.env_additions.insert(k.into(), v.into());
        }
        self
    }

    /// Find a binary in PATH
    pub fn which(binary: &str) -> Option<PathBuf> {
        which::which(binary).ok()
    }

    /// Resolve a program name to an absolute path.
    ///
    /// Names containing a path separator are taken as paths; everything else
    /// goes through PATH lookup. The result is absolute so that the child's
    /// working directory cannot change what gets executed.
    pub fn resolve_binary(binary: &str) -> Result<PathBuf, CommandError> {
        let path = Path::new(binary);
        if path.components().count() > 1 {
            if path.is_file() {
                return std::fs::canonicalize(path)
                    .map_err(|e| CommandError::LaunchFailed(format!("{}: {}", binary, e)));
            }
            return Err(CommandError::BinaryNotFound(binary.to_string()));
        }

        Self::which(binary).ok_or_else(|| CommandError::BinaryNotFound(binary.to_string()))
    }

    /// Run the invocation, wait for it, and capture both output streams
    pub fn run(&self, invocation: &Invocation) -> Result<InvocationResult, CommandError> {
        if !invocation.working_directory.is_dir() {
            return Err(CommandError::WorkingDirectoryMissing(
                invocation.working_directory.clone(),
            ));
        }

        let binary_path = Self::resolve_binary(&invocation.program)?;

        tracing::debug!(
            binary = %binary_path.display(),
            args = ?redact_sensitive_args(&invocation.args),
            cwd = %invocation.working_directory.display(),
            "launching migration tool"
        );

        let output = Command::new(&binary_path)
            .args(&invocation.args)
            .current_dir(&invocation.working_directory)
            .envs(&self.env_additions)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                tracing::debug!(error = %e, "spawn failed");
                CommandError::LaunchFailed(format!("{}: {}", binary_path.display(), e))
            })?;

        let exit_code = exit_code_of(output.status);
        tracing::debug!(
            exit_code,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "migration tool exited"
        );

        Ok(InvocationResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        })
    }
}

/// Map an exit status to a process exit code
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    exit_codes::UNEXPECTED_FAILURE
}
