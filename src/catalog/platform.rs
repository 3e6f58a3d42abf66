//! Supported package platforms

use crate::core::error::PromoteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating system family an artifact is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Aix,
    Debian,
    El,
    Freebsd,
    Solaris2,
    Ubuntu,
    Windows,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Aix,
        Platform::Debian,
        Platform::El,
        Platform::Freebsd,
        Platform::Solaris2,
        Platform::Ubuntu,
        Platform::Windows,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aix => "aix",
            Self::Debian => "debian",
            Self::El => "el",
            Self::Freebsd => "freebsd",
            Self::Solaris2 => "solaris2",
            Self::Ubuntu => "ubuntu",
            Self::Windows => "windows",
        }
    }

    /// Platforms published through freight into an APT repository
    pub fn is_apt(&self) -> bool {
        matches!(self, Self::Debian | Self::Ubuntu)
    }

    /// Build hosts for these platforms report 32-bit x86 as `i686`, so the
    /// artifact store files `i386` packages under that directory.
    pub fn source_arch_dir<'a>(&self, architecture: &'a str) -> &'a str {
        match self {
            Self::Debian | Self::Ubuntu | Self::El if architecture == "i386" => "i686",
            _ => architecture,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PromoteError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str() == name)
            .ok_or_else(|| PromoteError::UnsupportedPlatform {
                platform: name.to_string(),
                version: None,
            })
    }
}
