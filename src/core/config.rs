//! Configuration structures and types for package-promoter
//!
//! This module provides type-safe configuration management with serde support.
//! `PromoteConfig` is the layered, all-optional shape read from files, the
//! environment and the CLI; `PromoteSettings` is the resolved record a run
//! works from.

use crate::planning::Release;
use crate::security::credentials::{AwsCredentials, FastlyCredentials};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "promote-config.yaml";

/// Default artifact bucket
pub const DEFAULT_BUCKET: &str = "sensu-omnibus-artifacts";

/// Default AWS region
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Software project being promoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Project {
    #[default]
    Sensu,
    Uchiwa,
}

impl Project {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sensu => "sensu",
            Self::Uchiwa => "uchiwa",
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Unstable,
    Stable,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unstable => "unstable",
            Self::Stable => "stable",
        }
    }

    /// APT component the channel publishes into
    ///
    /// ```
    /// use package_promoter::core::config::Channel;
    ///
    /// assert_eq!(Channel::Stable.apt_component(), "main");
    /// assert_eq!(Channel::Unstable.apt_component(), "unstable");
    /// ```
    pub fn apt_component(&self) -> &'static str {
        match self {
            Self::Stable => "main",
            Self::Unstable => "unstable",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root configuration object
///
/// Every field is optional so that defaults, the config file, the environment
/// and CLI flags can be merged field by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromoteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,

    /// Project version (e.g. "1.0.0")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,

    /// Artifact bucket name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Platform catalog file replacing the built-in catalog for the project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<PathBuf>,

    /// Continue past fetch and command failures without prompting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_failures: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastly: Option<FastlyConfig>,
}

/// AWS settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AwsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

/// Fastly CDN settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FastlyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    /// API endpoint (default: https://api.fastly.com)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// Resolved settings for one run
#[derive(Debug, Clone)]
pub struct PromoteSettings {
    pub project: Project,
    pub channel: Channel,
    pub version: String,
    pub build_number: String,
    pub bucket: String,
    pub aws_region: String,
    pub aws_credentials: Option<AwsCredentials>,
    pub fastly: Option<FastlyCredentials>,
    pub catalog_file: Option<PathBuf>,
    pub ignore_failures: bool,
    /// File the settings were read from, used in error messages
    pub config_file: PathBuf,
}

impl PromoteSettings {
    /// Release coordinates used for artifact naming
    pub fn release(&self) -> Release {
        Release::new(
            self.project.as_str(),
            &self.version,
            &self.build_number,
            self.channel,
        )
    }
}
