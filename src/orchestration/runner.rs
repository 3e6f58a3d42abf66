//! Repository command runner

use crate::planning::RepoCommand;
use crate::security::command_executor::{ALLOWED_COMMANDS, CommandError, SafeCommandExecutor};
use serde::Serialize;
use tracing::{debug, warn};

/// A command that did not complete successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandFailure {
    /// Rendered command line
    pub command: String,
    pub reason: String,
}

/// Outcome of the command stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<CommandFailure>,
}

impl CommandReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Programs the runner accepts by default
pub fn default_allowed_commands() -> Vec<String> {
    ALLOWED_COMMANDS.iter().map(|c| c.to_string()).collect()
}

/// Run one command in its working directory
///
/// Both the outer program (`sudo`) and the wrapped program must be on the
/// whitelist.
pub async fn run_command(command: &RepoCommand, allowed: &[String]) -> Result<String, CommandError> {
    let executor = SafeCommandExecutor::new(&command.cwd)?
        .with_allowed_commands(allowed.iter().cloned());
    executor.ensure_allowed(&command.program)?;

    let argv = command.argv();
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| CommandError::ExecutionFailed("empty command".to_string()))?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let output = executor.execute(program, &args).await?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run `commands` in order; failures are recorded and never stop the loop
pub async fn run_commands(commands: &[RepoCommand], allowed: &[String]) -> CommandReport {
    let mut report = CommandReport::default();

    for command in commands {
        let rendered = command.to_string();
        println!("  ▶️  {}", rendered);

        match run_command(command, allowed).await {
            Ok(stdout) => {
                if !stdout.is_empty() {
                    debug!(command = %rendered, %stdout, "command output");
                }
                report.succeeded.push(rendered);
            }
            Err(e) => {
                warn!(command = %rendered, error = %e, "command failed");
                println!("  ❌ {}", e);
                report.failed.push(CommandFailure {
                    command: rendered,
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn allowed(programs: &[&str]) -> Vec<String> {
        programs.iter().map(|p| p.to_string()).collect()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failures_recorded_and_loop_continues() {
        let dir = TempDir::new().unwrap();
        let commands = vec![
            RepoCommand::new(dir.path(), "true", Vec::<String>::new()),
            RepoCommand::new(dir.path(), "false", Vec::<String>::new()),
            RepoCommand::new(dir.path(), "echo", ["done"]),
            RepoCommand::new(dir.path(), "sh", ["-c", "exit 2"]),
            RepoCommand::new(dir.path(), "true", Vec::<String>::new()),
        ];

        let report = run_commands(&commands, &allowed(&["true", "false", "echo", "sh"])).await;

        let failed: Vec<String> = report.failed.iter().map(|f| f.command.clone()).collect();
        assert_eq!(
            failed,
            vec![commands[1].to_string(), commands[3].to_string()]
        );
        assert!(report.failed[0].reason.contains("status 1"));
        assert!(report.failed[1].reason.contains("status 2"));
        assert_eq!(
            report.succeeded,
            vec![
                commands[0].to_string(),
                commands[2].to_string(),
                commands[4].to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_working_directory_recorded() {
        let commands = vec![RepoCommand::new("/nonexistent/srv/freight", "freight", ["cache"])];

        let report = run_commands(&commands, &default_allowed_commands()).await;

        assert!(report.has_failures());
        assert!(report.failed[0].reason.contains("Working directory does not exist"));
    }

    #[tokio::test]
    async fn test_wrapped_program_must_be_allowed() {
        let dir = TempDir::new().unwrap();
        let command = RepoCommand::new(dir.path(), "rm", ["-rf", "."]).as_user("freight");

        let err = run_command(&command, &default_allowed_commands())
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::CommandNotAllowed(ref p) if p == "rm"));
    }

    #[tokio::test]
    async fn test_empty_whitelist_spawns_nothing() {
        let dir = TempDir::new().unwrap();
        let command = RepoCommand::new(dir.path(), "pkg", ["repo", "."]);

        let report = run_commands(&[command], &[]).await;

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].reason.contains("not in the allowed whitelist"));
    }
}
