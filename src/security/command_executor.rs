//! SafeCommandExecutor: whitelisted execution of repository tooling
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only pre-approved programs can execute
//! - **Injection prevention**: Uses `tokio::process::Command`, so computed paths
//!   are passed as arguments and never interpolated into a shell string
//! - **Working directory validation**: Validates existence before execution
//!
//! # Example
//!
//! ```rust,no_run
//! use package_promoter::security::SafeCommandExecutor;
//!
//! # async fn run() -> Result<(), package_promoter::security::CommandError> {
//! let executor = SafeCommandExecutor::new("/srv/freight")?;
//! let output = executor
//!     .execute("sudo", &["-u", "freight", "--", "freight", "cache"])
//!     .await?;
//! println!("{}", String::from_utf8_lossy(&output.stdout));
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;

/// Allowed programs whitelist.
///
/// These are the repository tools a promotion runs, plus `sudo` which wraps
/// them to run as the repository owner.
pub const ALLOWED_COMMANDS: &[&str] = &["sudo", "freight", "createrepo", "pkg"];

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Program is not in the allowed whitelist
    #[error("Command '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {}", .0.display())]
    InvalidWorkingDirectory(PathBuf),

    /// Command could not be started (e.g., binary not found, permission denied)
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// Command ran and exited unsuccessfully
    #[error("Command exited with {}: {stderr}", exit_code_label(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// Safe command executor with security controls
#[derive(Debug)]
pub struct SafeCommandExecutor {
    /// Working directory where commands will be executed
    working_dir: PathBuf,
    /// Programs this executor may start
    allowed: Vec<String>,
}

impl SafeCommandExecutor {
    /// Create a new SafeCommandExecutor with working directory validation.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidWorkingDirectory` if the directory does not exist.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, CommandError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(working_dir));
        }

        Ok(Self {
            working_dir,
            allowed: ALLOWED_COMMANDS.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Replace the default whitelist.
    pub fn with_allowed_commands<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = allowed.into_iter().map(Into::into).collect();
        self
    }

    /// Check a program against the whitelist without running it.
    pub fn ensure_allowed(&self, program: &str) -> Result<(), CommandError> {
        if self.allowed.iter().any(|allowed| allowed == program) {
            Ok(())
        } else {
            Err(CommandError::CommandNotAllowed(program.to_string()))
        }
    }

    /// Execute a program with whitelist validation.
    ///
    /// A non-zero exit status is returned as `CommandError::NonZeroExit` with
    /// the captured stderr.
    pub async fn execute(&self, command: &str, args: &[&str]) -> Result<Output, CommandError> {
        self.ensure_allowed(command)?;

        let output = Command::new(command)
            .args(args)
            .current_dir(&self.working_dir)
            .output()
            .await
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(CommandError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_rejected_command_rm() {
        let dir = TempDir::new().unwrap();
        let executor = SafeCommandExecutor::new(dir.path()).unwrap();
        let result = executor.execute("rm", &["-rf", "/"]).await;
        assert!(
            matches!(result, Err(CommandError::CommandNotAllowed(_))),
            "rm should be rejected as not in whitelist"
        );
    }

    #[test]
    fn test_default_whitelist() {
        let dir = TempDir::new().unwrap();
        let executor = SafeCommandExecutor::new(dir.path()).unwrap();

        assert!(executor.ensure_allowed("freight").is_ok());
        assert!(executor.ensure_allowed("createrepo").is_ok());
        assert!(executor.ensure_allowed("pkg").is_ok());
        assert!(executor.ensure_allowed("sudo").is_ok());
        assert!(executor.ensure_allowed("sh").is_err());
    }

    #[test]
    fn test_invalid_working_directory() {
        let result = SafeCommandExecutor::new("/nonexistent/directory/that/does/not/exist");
        assert!(
            matches!(result, Err(CommandError::InvalidWorkingDirectory(_))),
            "Should reject non-existent working directory"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();

        let executor = SafeCommandExecutor::new(dir.path())
            .unwrap()
            .with_allowed_commands(["ls"]);
        let output = executor.execute("ls", &[]).await.unwrap();

        assert!(String::from_utf8_lossy(&output.stdout).contains("marker.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let dir = TempDir::new().unwrap();
        let executor = SafeCommandExecutor::new(dir.path())
            .unwrap()
            .with_allowed_commands(["false"]);

        let result = executor.execute("false", &[]).await;
        assert!(matches!(
            result,
            Err(CommandError::NonZeroExit { code: Some(1), .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_arguments_are_not_shell_interpolated() {
        let dir = TempDir::new().unwrap();
        let executor = SafeCommandExecutor::new(dir.path())
            .unwrap()
            .with_allowed_commands(["echo"]);

        let output = executor.execute("echo", &["a; rm -rf /"]).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "a; rm -rf /");
    }

    #[tokio::test]
    async fn test_missing_binary_is_execution_failure() {
        let dir = TempDir::new().unwrap();
        let executor = SafeCommandExecutor::new(dir.path())
            .unwrap()
            .with_allowed_commands(["definitely-not-a-real-binary-4821"]);

        let result = executor
            .execute("definitely-not-a-real-binary-4821", &[])
            .await;
        assert!(matches!(result, Err(CommandError::ExecutionFailed(_))));
    }
}
