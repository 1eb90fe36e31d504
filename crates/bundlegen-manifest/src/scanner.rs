//! Recursive discovery of plugin manifest files

use crate::errors::ManifestError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Find every file named exactly `manifest_filename` under `roots`.
///
/// Roots are visited in the order given; within a directory entries are
/// sorted by file name. Symlinks are not followed. Any unreadable directory
/// (a missing root included) fails the whole scan.
pub fn scan_manifests(
    roots: &[PathBuf],
    manifest_filename: &str,
) -> Result<Vec<PathBuf>, ManifestError> {
    let mut manifests = Vec::new();

    for root in roots {
        let root = absolute(root)?;
        if !root.is_dir() {
            return Err(ManifestError::RootNotFound(root));
        }

        let before = manifests.len();
        scan_root(&root, manifest_filename, &mut manifests)?;
        debug!(
            "Found {} manifest(s) under {:?}",
            manifests.len() - before,
            root
        );
    }

    info!("Discovered {} plugin manifest(s)", manifests.len());
    Ok(manifests)
}

fn scan_root(
    root: &Path,
    manifest_filename: &str,
    manifests: &mut Vec<PathBuf>,
) -> Result<(), ManifestError> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|source| ManifestError::Walk {
            path: source
                .path()
                .map_or_else(|| root.to_path_buf(), Path::to_path_buf),
            source,
        })?;

        if entry.file_type().is_file() && entry.file_name() == manifest_filename {
            manifests.push(entry.into_path());
        }
    }

    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf, ManifestError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
