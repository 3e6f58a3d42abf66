//! Repository ownership repair
//!
//! Downloads land owned by the promoting user. Every file under a
//! repository base directory is handed back to the owner of that directory
//! so `freight`, `createrepo` and the web server can read it.

use crate::catalog::PlatformCatalog;
use crate::core::error::PromoteError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Ownership applied to one base path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipFix {
    pub base_path: PathBuf,
    pub uid: u32,
    pub gid: u32,
    /// Number of filesystem entries changed, the base directory included
    pub entries: usize,
}

/// Apply each distinct base path's owner recursively beneath it
pub fn fix_permissions(catalog: &PlatformCatalog) -> Result<Vec<OwnershipFix>, PromoteError> {
    let mut fixes = Vec::new();

    for (base_path, platform) in catalog.base_paths() {
        if !base_path.is_dir() {
            return Err(PromoteError::Permissions {
                path: base_path.to_path_buf(),
                message: format!("repository directory for {} does not exist", platform),
            });
        }

        let fix = fix_ownership(base_path)?;
        println!(
            "  🔧 Fixing permissions for {} with uid {}, gid {} ({} entries)",
            fix.base_path.display(),
            fix.uid,
            fix.gid,
            fix.entries
        );
        fixes.push(fix);
    }

    Ok(fixes)
}

/// Chown everything under `base_path` to the owner of `base_path`
#[cfg(unix)]
pub fn fix_ownership(base_path: &Path) -> Result<OwnershipFix, PromoteError> {
    use std::os::unix::fs::{MetadataExt, lchown};

    let metadata = std::fs::metadata(base_path).map_err(|e| permissions_error(base_path, e))?;
    let (uid, gid) = (metadata.uid(), metadata.gid());

    let mut entries = 0;
    for entry in WalkDir::new(base_path) {
        let entry = entry.map_err(|e| permissions_error(base_path, e))?;
        lchown(entry.path(), Some(uid), Some(gid)).map_err(|e| permissions_error(entry.path(), e))?;
        debug!(path = %entry.path().display(), uid, gid, "changed ownership");
        entries += 1;
    }

    Ok(OwnershipFix {
        base_path: base_path.to_path_buf(),
        uid,
        gid,
        entries,
    })
}

#[cfg(unix)]
fn permissions_error(path: &Path, error: impl std::fmt::Display) -> PromoteError {
    PromoteError::Permissions {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

#[cfg(not(unix))]
pub fn fix_ownership(base_path: &Path) -> Result<OwnershipFix, PromoteError> {
    Err(PromoteError::Permissions {
        path: base_path.to_path_buf(),
        message: "ownership repair is only supported on unix".to_string(),
    })
}
