//! Release Validator - Validates release coordinates before any work starts
//!
//! The project version and build number end up in filenames, store keys and
//! repository paths, so they are checked up front.
//!
//! # Example
//!
//! ```
//! use package_promoter::validation::release_validator::ReleaseValidator;
//!
//! let validator = ReleaseValidator::new();
//! let result = validator.validate("1.2.3", "4");
//!
//! assert!(result.is_valid);
//! assert!(result.warnings.is_empty());
//! ```

use semver::Version;
use serde::{Deserialize, Serialize};

/// Result of release validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseValidationResult {
    /// No errors were found
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Non-fatal findings (e.g. a version that is not semver)
    pub warnings: Vec<String>,
    /// Pre-release part of a semver version (e.g., "beta.1")
    pub prerelease: Option<String>,
}

/// Validator for project version and build number
#[derive(Debug, Default)]
pub struct ReleaseValidator;

impl ReleaseValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a version and build number pair
    ///
    /// # Examples
    ///
    /// ```
    /// use package_promoter::validation::ReleaseValidator;
    ///
    /// let validator = ReleaseValidator::new();
    ///
    /// // Non-semver versions are accepted with a warning
    /// let result = validator.validate("0.26", "1");
    /// assert!(result.is_valid);
    /// assert_eq!(result.warnings.len(), 1);
    ///
    /// // Build numbers are positive integers
    /// let result = validator.validate("1.0.0", "0");
    /// assert!(!result.is_valid);
    /// ```
    pub fn validate(&self, version: &str, build_number: &str) -> ReleaseValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut prerelease = None;

        if version.is_empty() {
            errors.push("version must not be empty".to_string());
        } else if !is_path_safe(version) {
            errors.push(format!(
                "version {:?} must not contain whitespace or '/'",
                version
            ));
        } else {
            match Version::parse(version) {
                Ok(parsed) if !parsed.pre.is_empty() => {
                    prerelease = Some(parsed.pre.to_string());
                }
                Ok(_) => {}
                Err(e) => warnings.push(format!(
                    "version {} is not semantic versioning ({})",
                    version, e
                )),
            }
        }

        match build_number.parse::<u64>() {
            Ok(n) if n > 0 => {}
            _ => errors.push(format!(
                "build number {:?} must be a positive integer",
                build_number
            )),
        }

        ReleaseValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            prerelease,
        }
    }
}

fn is_path_safe(value: &str) -> bool {
    !value.chars().any(|c| c.is_whitespace() || c == '/')
}
