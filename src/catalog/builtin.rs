//! Built-in platform catalogs

use super::{Platform, PlatformCatalog, PlatformEntry, VersionDetails};
use std::path::PathBuf;

fn entry(platform: Platform, base_path: &str, versions: Vec<VersionDetails>) -> PlatformEntry {
    PlatformEntry {
        platform,
        base_path: PathBuf::from(base_path),
        versions,
    }
}

/// Every platform sensu is packaged for
pub fn sensu() -> PlatformCatalog {
    PlatformCatalog {
        platforms: vec![
            entry(
                Platform::Aix,
                "/srv/aix",
                vec![VersionDetails::new("6.1", &[], &["powerpc"])],
            ),
            entry(
                Platform::Debian,
                "/srv/freight",
                vec![
                    VersionDetails::new("7", &["wheezy"], &["i386", "x86_64"]),
                    VersionDetails::new("8", &["jessie"], &["x86_64"]),
                ],
            ),
            entry(
                Platform::El,
                "/srv/createrepo",
                vec![
                    VersionDetails::new("5", &[], &["i386", "x86_64"]),
                    VersionDetails::new("6", &[], &["i386", "x86_64"]),
                    VersionDetails::new("7", &[], &["x86_64"]),
                ],
            ),
            entry(
                Platform::Freebsd,
                "/srv/freebsd",
                vec![
                    VersionDetails::new("10", &[], &["i386", "amd64"]),
                    VersionDetails::new("11", &[], &["amd64"]),
                ],
            ),
            entry(
                Platform::Solaris2,
                "/srv/solaris",
                vec![
                    VersionDetails::new("5.10", &[], &["i386"]),
                    VersionDetails::new("5.11", &[], &["i386"]),
                ],
            ),
            entry(
                Platform::Ubuntu,
                "/srv/freight",
                vec![
                    VersionDetails::new("12.04", &["precise", "sensu"], &["i386", "x86_64"]),
                    VersionDetails::new("14.04", &["trusty"], &["i386", "x86_64"]),
                    VersionDetails::new("16.04", &["xenial"], &["x86_64"]),
                ],
            ),
            entry(
                Platform::Windows,
                "/srv/msi",
                vec![VersionDetails::new("2012r2", &[], &["x86_64"])],
            ),
        ],
    }
}

/// uchiwa only ships deb and rpm packages
pub fn uchiwa() -> PlatformCatalog {
    let both = ["i386", "x86_64"];

    PlatformCatalog {
        platforms: vec![
            entry(
                Platform::Debian,
                "/srv/freight",
                vec![
                    VersionDetails::new("7", &["wheezy"], &both),
                    VersionDetails::new("8", &["jessie"], &both),
                ],
            ),
            entry(
                Platform::Ubuntu,
                "/srv/freight",
                vec![
                    VersionDetails::new("12.04", &["precise"], &both),
                    VersionDetails::new("14.04", &["trusty"], &both),
                    VersionDetails::new("16.04", &["xenial"], &both),
                ],
            ),
            entry(
                Platform::El,
                "/srv/createrepo",
                vec![
                    VersionDetails::new("5", &[], &both),
                    VersionDetails::new("6", &[], &both),
                    VersionDetails::new("7", &[], &both),
                ],
            ),
        ],
    }
}
