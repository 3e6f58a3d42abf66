//! Upload naming
//!
//! The reverse direction of promotion: packages built on the repository
//! host are pushed to the artifact store so that a later promotion can
//! fetch them. Only deb and rpm packages take this path.

use super::Release;
use super::naming::{deb_architecture, source_key};
use crate::catalog::{Platform, PlatformCatalog};
use serde::Serialize;
use std::path::PathBuf;

/// Source architecture directories packages are built for
pub const UPLOAD_ARCHITECTURES: [&str; 2] = ["i686", "x86_64"];

/// freight repository name the built debs are staged under
const FREIGHT_REPOSITORY: &str = "sensu";

/// One local file and the key it is uploaded to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadMapping {
    pub local: PathBuf,
    pub key: String,
}

fn rpm_architecture(architecture: &str) -> &'static str {
    if architecture == "i686" { "i386" } else { "x86_64" }
}

/// Uploads for every debian, ubuntu and el version in `catalog`
pub fn build_upload_plan(release: &Release, catalog: &PlatformCatalog) -> Vec<UploadMapping> {
    let Release {
        project,
        version: project_version,
        build_number,
        channel,
    } = release;
    let mut uploads = Vec::new();

    for entry in &catalog.platforms {
        for details in &entry.versions {
            for architecture in UPLOAD_ARCHITECTURES {
                let version = details.version.as_str();

                let mapping = match entry.platform {
                    Platform::Debian | Platform::Ubuntu => {
                        let filename = format!(
                            "{project}_{project_version}-{build_number}_{}.deb",
                            deb_architecture(architecture)
                        );
                        UploadMapping {
                            local: entry
                                .base_path
                                .join("lib")
                                .join("apt")
                                .join(FREIGHT_REPOSITORY)
                                .join(channel.as_str())
                                .join(&filename),
                            key: source_key(entry.platform, version, architecture, &filename),
                        }
                    }
                    Platform::El => {
                        let rpm_arch = rpm_architecture(architecture);
                        let local_name =
                            format!("{project}-{project_version}-{build_number}.{rpm_arch}.rpm");
                        let remote_name = format!(
                            "{project}-{project_version}-{build_number}.el{version}.{rpm_arch}.rpm"
                        );
                        UploadMapping {
                            local: entry
                                .base_path
                                .join(channel.as_str())
                                .join(rpm_arch)
                                .join(local_name),
                            key: source_key(entry.platform, version, architecture, &remote_name),
                        }
                    }
                    _ => continue,
                };

                uploads.push(mapping);
            }
        }
    }

    uploads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Channel, Project};

    fn uchiwa_uploads() -> Vec<UploadMapping> {
        build_upload_plan(
            &Release::new("uchiwa", "0.26.0", "2", Channel::Unstable),
            &PlatformCatalog::for_project(Project::Uchiwa),
        )
    }

    #[test]
    fn test_upload_count() {
        // 8 versions x 2 architectures
        assert_eq!(uchiwa_uploads().len(), 16);
    }

    #[test]
    fn test_deb_upload() {
        let uploads = uchiwa_uploads();

        assert_eq!(
            uploads[0],
            UploadMapping {
                local: PathBuf::from("/srv/freight/lib/apt/sensu/unstable/uchiwa_0.26.0-2_i386.deb"),
                key: "debian/7/i686/uchiwa_0.26.0-2_i386.deb/uchiwa_0.26.0-2_i386.deb".to_string(),
            }
        );
    }

    #[test]
    fn test_rpm_upload_renames_with_el_version() {
        let uploads = uchiwa_uploads();
        let el5 = uploads
            .iter()
            .find(|u| u.key.starts_with("el/5/i686/"))
            .unwrap();

        assert_eq!(
            el5.local,
            PathBuf::from("/srv/createrepo/unstable/i386/uchiwa-0.26.0-2.i386.rpm")
        );
        assert_eq!(
            el5.key,
            "el/5/i686/uchiwa-0.26.0-2.el5.i386.rpm/uchiwa-0.26.0-2.el5.i386.rpm"
        );
    }

    #[test]
    fn test_non_package_platforms_skipped() {
        let uploads = build_upload_plan(
            &Release::new("sensu", "1.0.0", "1", Channel::Unstable),
            &PlatformCatalog::for_project(Project::Sensu),
        );

        assert!(uploads.iter().all(|u| {
            u.key.starts_with("debian/") || u.key.starts_with("ubuntu/") || u.key.starts_with("el/")
        }));
        // debian 2, el 3, ubuntu 3 versions
        assert_eq!(uploads.len(), 16);
    }
}
