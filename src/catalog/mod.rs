//! Platform catalog
//!
//! The catalog lists, per platform, the repository base directory on the
//! promotion host and every OS version with its architectures and (for APT
//! platforms) codenames. It is loaded once per run and never mutated.
//!
//! # Catalog file
//!
//! ```yaml
//! platforms:
//!   - name: debian
//!     base_path: /srv/freight
//!     versions:
//!       - version: "8"
//!         codename: jessie
//!         architectures: [x86_64]
//! ```
//!
//! `codename` may also be a list; one APT distribution is published per entry.

pub mod builtin;
pub mod platform;

pub use platform::Platform;

use crate::core::config::Project;
use crate::core::error::PromoteError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// One OS version of a platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionDetails {
    pub version: String,
    /// APT codenames; empty for non-APT platforms
    pub codenames: Vec<String>,
    pub architectures: Vec<String>,
}

impl VersionDetails {
    pub fn new(version: &str, codenames: &[&str], architectures: &[&str]) -> Self {
        Self {
            version: version.to_string(),
            codenames: codenames.iter().map(|c| c.to_string()).collect(),
            architectures: architectures.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Codenames to publish under, falling back to the version string
    pub fn codenames_or_version(&self) -> Vec<&str> {
        if self.codenames.is_empty() {
            vec![self.version.as_str()]
        } else {
            self.codenames.iter().map(String::as_str).collect()
        }
    }
}

/// Catalog entry for one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformEntry {
    pub platform: Platform,
    /// Root directory of the platform's local package repository
    pub base_path: PathBuf,
    pub versions: Vec<VersionDetails>,
}

/// Ordered platform catalog
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PlatformCatalog {
    pub platforms: Vec<PlatformEntry>,
}

// ============================================================================
// File representation
// ============================================================================

#[derive(Debug, Deserialize)]
struct CatalogFile {
    platforms: Vec<PlatformRecord>,
}

#[derive(Debug, Deserialize)]
struct PlatformRecord {
    name: String,
    base_path: Option<PathBuf>,
    #[serde(default)]
    versions: Vec<VersionRecord>,
}

#[derive(Debug, Deserialize)]
struct VersionRecord {
    version: String,
    codename: Option<Codenames>,
    architectures: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Codenames {
    One(String),
    Many(Vec<String>),
}

impl From<Codenames> for Vec<String> {
    fn from(codenames: Codenames) -> Self {
        match codenames {
            Codenames::One(codename) => vec![codename],
            Codenames::Many(codenames) => codenames,
        }
    }
}

impl PlatformCatalog {
    /// Built-in catalog for a project
    pub fn for_project(project: Project) -> Self {
        match project {
            Project::Sensu => builtin::sensu(),
            Project::Uchiwa => builtin::uchiwa(),
        }
    }

    /// Parse a catalog from YAML
    pub fn from_yaml_str(content: &str) -> Result<Self, PromoteError> {
        let file: CatalogFile = serde_yaml::from_str(content)
            .map_err(|e| PromoteError::InvalidCatalog(e.to_string()))?;

        let platforms = file
            .platforms
            .into_iter()
            .map(Self::entry_from_record)
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = Self { platforms };
        catalog.check_unique_platforms()?;
        Ok(catalog)
    }

    /// Load a catalog file
    pub async fn load_file(path: &Path) -> Result<Self, PromoteError> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            PromoteError::InvalidCatalog(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_yaml_str(&content)
    }

    fn entry_from_record(record: PlatformRecord) -> Result<PlatformEntry, PromoteError> {
        let platform: Platform = record.name.parse()?;

        let base_path = record.base_path.ok_or_else(|| PromoteError::MissingBasePath {
            platform: record.name.clone(),
        })?;

        let versions = record
            .versions
            .into_iter()
            .map(|v| {
                if v.architectures.is_empty() {
                    return Err(PromoteError::InvalidCatalog(format!(
                        "{} {} lists no architectures",
                        record.name, v.version
                    )));
                }
                Ok(VersionDetails {
                    version: v.version,
                    codenames: v.codename.map(Vec::from).unwrap_or_default(),
                    architectures: v.architectures,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PlatformEntry {
            platform,
            base_path,
            versions,
        })
    }

    fn check_unique_platforms(&self) -> Result<(), PromoteError> {
        let mut seen = HashSet::new();
        for entry in &self.platforms {
            if !seen.insert(entry.platform) {
                return Err(PromoteError::InvalidCatalog(format!(
                    "platform {} is listed more than once",
                    entry.platform
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, platform: Platform) -> Option<&PlatformEntry> {
        self.platforms.iter().find(|e| e.platform == platform)
    }

    /// Distinct repository base paths, in catalog order
    pub fn base_paths(&self) -> Vec<(&Path, Platform)> {
        let mut seen = HashSet::new();
        self.platforms
            .iter()
            .filter(|e| seen.insert(e.base_path.as_path()))
            .map(|e| (e.base_path.as_path(), e.platform))
            .collect()
    }

    /// Number of platform/version/codename/architecture combinations
    pub fn target_count(&self) -> usize {
        self.platforms
            .iter()
            .flat_map(|e| &e.versions)
            .map(|v| v.codenames_or_version().len() * v.architectures.len())
            .sum()
    }
}
