//! Repository commands
//!
//! A `RepoCommand` is a structured version of lines like
//! `cd /srv/freight && sudo -u freight -- freight cache -c /srv/freight/freight.conf`.
//! Keeping the pieces apart lets the runner start the process directly in
//! the working directory without going through a shell.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// `sudo` wrapper for a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunAs {
    pub user: String,
    /// Pass `-H` so the target user's HOME is used
    pub set_home: bool,
}

/// One command that adds to or reindexes a package repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoCommand {
    pub cwd: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_as: Option<RunAs>,
    pub program: String,
    pub args: Vec<String>,
}

impl RepoCommand {
    pub fn new<I, S>(cwd: impl Into<PathBuf>, program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cwd: cwd.into(),
            run_as: None,
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Run through `sudo -u <user> --`
    pub fn as_user(mut self, user: &str) -> Self {
        self.run_as = Some(RunAs {
            user: user.to_string(),
            set_home: false,
        });
        self
    }

    /// Run through `sudo -H -u <user> --`
    pub fn as_user_with_home(mut self, user: &str) -> Self {
        self.run_as = Some(RunAs {
            user: user.to_string(),
            set_home: true,
        });
        self
    }

    /// Full argument vector, including the `sudo` prefix when present
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 6);

        if let Some(run_as) = &self.run_as {
            argv.push("sudo".to_string());
            if run_as.set_home {
                argv.push("-H".to_string());
            }
            argv.push("-u".to_string());
            argv.push(run_as.user.clone());
            argv.push("--".to_string());
        }

        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

impl fmt::Display for RepoCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cd {} && {}", self.cwd.display(), self.argv().join(" "))
    }
}
