//! Release planning
//!
//! Everything in here is pure: turning a catalog and a release into
//! filenames, paths and repository commands never touches the network,
//! the filesystem or child processes.

pub mod command;
pub mod naming;
pub mod plan;
pub mod upload;

pub use command::{RepoCommand, RunAs};
pub use naming::{ArtifactPaths, Target, derive_artifact};
pub use plan::{ArtifactMapping, PromotionPlan};
pub use upload::{UploadMapping, build_upload_plan};

use crate::core::config::Channel;
use serde::Serialize;
use std::fmt;

/// The release being promoted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub project: String,
    pub version: String,
    pub build_number: String,
    pub channel: Channel,
}

impl Release {
    pub fn new(project: &str, version: &str, build_number: &str, channel: Channel) -> Self {
        Self {
            project: project.to_string(),
            version: version.to_string(),
            build_number: build_number.to_string(),
            channel,
        }
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{} ({})",
            self.project, self.version, self.build_number, self.channel
        )
    }
}
