//! Promotion plan
//!
//! Walks the catalog once and accumulates the artifact mapping
//! (destination → source) and the repository commands for a release.

use super::Release;
use super::command::RepoCommand;
use super::naming::{Target, derive_artifact, freebsd_abi};
use crate::catalog::{Platform, PlatformCatalog};
use crate::core::config::Channel;
use crate::core::error::PromoteError;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const FREIGHT_USER: &str = "freight";
const FREIGHT_CONF: &str = "freight.conf";
const CREATEREPO_USER: &str = "createrepo";

/// Where one artifact comes from and where it goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMapping {
    pub platform: Platform,
    pub destination: PathBuf,
    pub source: String,
}

/// Everything a promotion run will fetch and execute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromotionPlan {
    /// Artifacts in catalog order, unique by destination
    pub artifacts: Vec<ArtifactMapping>,
    /// `freight add` commands first, then reindex commands
    pub commands: Vec<RepoCommand>,
}

impl PromotionPlan {
    /// Build the plan for `release` over every entry of `catalog`.
    ///
    /// Fails fast with `UnsupportedPlatform` if any target has no naming rule.
    pub fn build(catalog: &PlatformCatalog, release: &Release) -> Result<Self, PromoteError> {
        let mut plan = Self::default();

        for entry in &catalog.platforms {
            for details in &entry.versions {
                for codename in details.codenames_or_version() {
                    for architecture in &details.architectures {
                        let target = Target {
                            platform: entry.platform,
                            base_path: &entry.base_path,
                            version: &details.version,
                            codename,
                            architecture,
                        };
                        let paths = derive_artifact(&target, release)?;

                        if entry.platform.is_apt() {
                            plan.commands.push(freight_add(
                                &entry.base_path,
                                &paths.destination,
                                codename,
                                release.channel,
                            ));
                        }

                        plan.insert_artifact(ArtifactMapping {
                            platform: entry.platform,
                            destination: paths.destination,
                            source: paths.source,
                        });
                    }
                }
            }
        }

        plan.commands
            .extend(reindex_commands(catalog, release.channel));

        Ok(plan)
    }

    /// Add a mapping; a repeated destination keeps its position and takes the
    /// newer source.
    fn insert_artifact(&mut self, mapping: ArtifactMapping) {
        match self
            .artifacts
            .iter_mut()
            .find(|existing| existing.destination == mapping.destination)
        {
            Some(existing) => *existing = mapping,
            None => self.artifacts.push(mapping),
        }
    }

    /// Human-readable listing used by `--dry-run`
    pub fn render_text(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("📦 Artifacts ({}):", self.artifacts.len()));
        for artifact in &self.artifacts {
            lines.push(format!(
                "  {} => {}",
                artifact.source,
                artifact.destination.display()
            ));
        }

        lines.push(String::new());
        lines.push(format!("🛠️  Commands ({}):", self.commands.len()));
        for command in &self.commands {
            lines.push(format!("  {}", command));
        }

        lines.join("\n")
    }
}

fn freight_add(base_path: &Path, package: &Path, codename: &str, channel: Channel) -> RepoCommand {
    RepoCommand::new(
        base_path,
        "freight",
        [
            "add".to_string(),
            "-c".to_string(),
            base_path.join(FREIGHT_CONF).display().to_string(),
            package.display().to_string(),
            format!("apt/{}/{}", codename, channel.apt_component()),
        ],
    )
    .as_user(FREIGHT_USER)
}

/// Commands that rebuild repository metadata after packages are in place
fn reindex_commands(catalog: &PlatformCatalog, channel: Channel) -> Vec<RepoCommand> {
    let mut commands = Vec::new();
    let mut freight_bases = HashSet::new();

    for entry in &catalog.platforms {
        let base = &entry.base_path;

        match entry.platform {
            Platform::Debian | Platform::Ubuntu => {
                if freight_bases.insert(base.clone()) {
                    commands.push(
                        RepoCommand::new(
                            base,
                            "freight",
                            [
                                "cache".to_string(),
                                "-c".to_string(),
                                base.join(FREIGHT_CONF).display().to_string(),
                            ],
                        )
                        .as_user_with_home(FREIGHT_USER),
                    );
                }
            }
            Platform::El => {
                for details in &entry.versions {
                    for architecture in &details.architectures {
                        let cwd = base
                            .join(channel.as_str())
                            .join(&details.version)
                            .join(architecture);
                        commands.push(
                            RepoCommand::new(cwd, "createrepo", ["-s", "sha", "."])
                                .as_user(CREATEREPO_USER),
                        );
                    }
                }
            }
            Platform::Freebsd => {
                for details in &entry.versions {
                    for architecture in &details.architectures {
                        // ABI directory the packages are fetched under
                        let cwd = base
                            .join(channel.as_str())
                            .join(freebsd_abi(&details.version, architecture));
                        commands.push(RepoCommand::new(cwd, "pkg", ["repo", "."]));
                    }
                }
            }
            Platform::Aix | Platform::Solaris2 | Platform::Windows => {}
        }
    }

    commands
}
