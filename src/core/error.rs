//! Error handling for release promotion
//!
//! This module provides the error taxonomy for a promotion run, with recovery
//! guidance, using the thiserror crate for ergonomic error handling.

use crate::storage::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for promotion operations
#[derive(Error, Debug)]
pub enum PromoteError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Required setting `{name}` is not configured")]
    MissingSetting { name: String },

    #[error("{provider} credentials not provided. Please configure via {config_file}")]
    MissingCredentials {
        provider: String,
        config_file: PathBuf,
    },

    #[error("Invalid release: {0}")]
    InvalidRelease(String),

    // Catalog errors
    #[error("unsupported platform: {platform}{}", version_suffix(.version))]
    UnsupportedPlatform {
        platform: String,
        version: Option<String>,
    },

    #[error("platform {platform} does not specify repository base_path")]
    MissingBasePath { platform: String },

    #[error("Invalid platform catalog: {0}")]
    InvalidCatalog(String),

    // Remote storage errors
    #[error(transparent)]
    Store(#[from] StoreError),

    // Filesystem errors
    #[error("Failed to fix ownership of {path}: {message}")]
    Permissions { path: PathBuf, message: String },

    #[error("CDN purge failed: {0}")]
    CdnPurge(String),

    #[error("Promotion aborted by operator after {stage} failures")]
    Aborted { stage: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn version_suffix(version: &Option<String>) -> String {
    version.as_ref().map(|v| format!(" {v}")).unwrap_or_default()
}

impl PromoteError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors are recorded and the run continues; everything else
    /// aborts the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Store(err) => err.is_not_found(),
            Self::CdnPurge(_) => true,
            _ => false,
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::ConfigError(_) => vec!["Check the YAML syntax of the configuration file"],
            Self::MissingSetting { .. } => {
                vec!["Pass the setting on the command line or add it to the configuration file"]
            }
            Self::MissingCredentials { .. } => vec![
                "Set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY",
                "Or pass --aws-access-key-id and --aws-secret-access-key",
            ],
            Self::InvalidRelease(_) => vec![
                "Use a dotted version number such as 1.0.0",
                "Use a positive integer build number",
            ],
            Self::UnsupportedPlatform { .. } => vec![
                "Check the platform names in the catalog",
                "Supported platforms: aix, debian, el, freebsd, solaris2, ubuntu, windows",
            ],
            Self::MissingBasePath { .. } => {
                vec!["Add a base_path to every platform entry of the catalog"]
            }
            Self::InvalidCatalog(_) => vec!["Check the catalog file against the expected layout"],
            Self::Store(_) => vec![
                "Check the bucket name and region",
                "Check that the credentials can read the bucket",
            ],
            Self::Permissions { .. } => vec![
                "Run the promotion as root",
                "Check that the repository base directories exist",
            ],
            Self::CdnPurge(_) => vec![
                "Check FASTLY_API_KEY and FASTLY_SERVICE_ID",
                "Purge the cache manually from the Fastly dashboard",
            ],
            Self::Aborted { .. } => vec!["Review the failures above and re-run the promotion"],
            Self::Io(_) => vec!["Check filesystem permissions and free space"],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::MissingSetting { .. } => "MISSING_SETTING",
            Self::MissingCredentials { .. } => "MISSING_CREDENTIALS",
            Self::InvalidRelease(_) => "INVALID_RELEASE",
            Self::UnsupportedPlatform { .. } => "UNSUPPORTED_PLATFORM",
            Self::MissingBasePath { .. } => "MISSING_BASE_PATH",
            Self::InvalidCatalog(_) => "INVALID_CATALOG",
            Self::Store(_) => "STORE_ERROR",
            Self::Permissions { .. } => "PERMISSIONS_ERROR",
            Self::CdnPurge(_) => "CDN_PURGE_FAILED",
            Self::Aborted { .. } => "ABORTED",
            Self::Io(_) => "IO_ERROR",
        }
    }
}
