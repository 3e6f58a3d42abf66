//! Artifact naming rules
//!
//! `derive_artifact` is a pure function from a catalog target and a release
//! to the package filename, the local destination path and the remote source
//! key. Every platform carries its own formatting rule.

use super::Release;
use crate::catalog::Platform;
use crate::core::error::PromoteError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Staging directory deb packages are fetched into before `freight add`
pub const APT_STAGING_DIR: &str = "/tmp/apt";

/// One platform/version/codename/architecture combination from the catalog
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub platform: Platform,
    pub base_path: &'a Path,
    pub version: &'a str,
    /// APT codename, or the version string for non-APT platforms
    pub codename: &'a str,
    pub architecture: &'a str,
}

/// Derived names for one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub filename: String,
    /// Local path the artifact is installed to
    pub destination: PathBuf,
    /// Remote key the artifact is fetched from
    pub source: String,
}

/// Debian architecture name
pub fn deb_architecture(architecture: &str) -> &'static str {
    if architecture == "x86_64" { "amd64" } else { "i386" }
}

/// Windows installer architecture name
pub fn msi_architecture(architecture: &str) -> &'static str {
    if architecture == "x86_64" { "x64" } else { "x86" }
}

/// FreeBSD package ABI string, e.g. `FreeBSD:10:amd64`
pub fn freebsd_abi(version: &str, architecture: &str) -> String {
    format!("FreeBSD:{}:{}", version, architecture)
}

/// Remote key for a package: `<platform>/<version>/<arch dir>/<file>/<file>`
pub fn source_key(platform: Platform, version: &str, arch_dir: &str, filename: &str) -> String {
    format!("{platform}/{version}/{arch_dir}/{filename}/{filename}")
}

/// Compute filename, destination and source for a target.
///
/// # Errors
///
/// `PromoteError::UnsupportedPlatform` when the platform has no naming rule
/// for the given version (solaris2 only knows 5.10 and 5.11).
///
/// # Examples
///
/// ```
/// use package_promoter::catalog::Platform;
/// use package_promoter::core::config::Channel;
/// use package_promoter::planning::naming::{derive_artifact, Target};
/// use package_promoter::planning::Release;
/// use std::path::{Path, PathBuf};
///
/// let release = Release::new("sensu", "1.0.0", "1", Channel::Stable);
/// let target = Target {
///     platform: Platform::El,
///     base_path: Path::new("/srv/createrepo"),
///     version: "6",
///     codename: "6",
///     architecture: "x86_64",
/// };
///
/// let paths = derive_artifact(&target, &release).unwrap();
/// assert_eq!(paths.filename, "sensu-1.0.0-1.el6.x86_64.rpm");
/// assert_eq!(
///     paths.destination,
///     PathBuf::from("/srv/createrepo/stable/6/x86_64/sensu-1.0.0-1.el6.x86_64.rpm")
/// );
/// ```
pub fn derive_artifact(target: &Target<'_>, release: &Release) -> Result<ArtifactPaths, PromoteError> {
    let Release {
        project,
        version: project_version,
        build_number,
        channel,
    } = release;
    let channel = channel.as_str();
    let arch = target.architecture;
    let version = target.version;
    let base = target.base_path;

    let (filename, destination) = match target.platform {
        Platform::Aix => {
            let filename = format!("{project}-{project_version}-{build_number}.{arch}.bff");
            let destination = base.join(channel).join(version).join(&filename);
            (filename, destination)
        }
        Platform::Debian | Platform::Ubuntu => {
            let filename = format!(
                "{project}_{project_version}-{build_number}_{}.deb",
                deb_architecture(arch)
            );
            let destination = Path::new(APT_STAGING_DIR)
                .join(target.codename)
                .join(&filename);
            (filename, destination)
        }
        Platform::El => {
            let filename =
                format!("{project}-{project_version}-{build_number}.el{version}.{arch}.rpm");
            let destination = base
                .join(channel)
                .join(version)
                .join(arch)
                .join(&filename);
            (filename, destination)
        }
        Platform::Freebsd => {
            let filename = format!("{project}-{project_version}_{build_number}.txz");
            let destination = base
                .join(channel)
                .join(freebsd_abi(version, arch))
                .join(project)
                .join(&filename);
            (filename, destination)
        }
        Platform::Solaris2 => {
            let (extension, repository) = match version {
                "5.10" => ("solaris", "pkg"),
                "5.11" => ("p5p", "ips"),
                _ => {
                    return Err(PromoteError::UnsupportedPlatform {
                        platform: target.platform.to_string(),
                        version: Some(version.to_string()),
                    });
                }
            };
            let filename =
                format!("{project}-{project_version}-{build_number}.{arch}.{extension}");
            let destination = base
                .join(repository)
                .join(channel)
                .join(version)
                .join(&filename);
            (filename, destination)
        }
        Platform::Windows => {
            let filename = format!(
                "{project}-{project_version}-{build_number}-{}.msi",
                msi_architecture(arch)
            );
            let destination = base.join(channel).join(version).join(&filename);
            (filename, destination)
        }
    };

    let source = source_key(
        target.platform,
        version,
        target.platform.source_arch_dir(arch),
        &filename,
    );

    Ok(ArtifactPaths {
        filename,
        destination,
        source,
    })
}
