//! Dotted module identifiers for manifest files
//!
//! e.g. `<base>/app/plugins/learn/bundle_plugin.py` -> `app.plugins.learn.bundle_plugin`

use crate::errors::ExtractError;
use std::path::{Component, Path, PathBuf};

/// Translate a manifest path into a dotted module identifier.
///
/// The path is taken relative to `base_dir`; manifests outside it are taken
/// relative to the parent of the root they were found under.
pub fn module_identifier(
    manifest: &Path,
    base_dir: &Path,
    roots: &[PathBuf],
) -> Result<String, ExtractError> {
    let relative = inside(manifest, base_dir)
        .or_else(|| {
            roots
                .iter()
                .find_map(|root| inside(manifest, root.parent().unwrap_or(root)))
        })
        .ok_or_else(|| ExtractError::ModulePath(manifest.to_path_buf()))?;

    let relative = relative.with_extension("");
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| ExtractError::ModulePath(manifest.to_path_buf()))?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => return Err(ExtractError::ModulePath(manifest.to_path_buf())),
        }
    }

    if parts.is_empty() {
        return Err(ExtractError::ModulePath(manifest.to_path_buf()));
    }

    Ok(parts.join("."))
}

/// `path` relative to `anchor`, unless it only gets there through `..`
fn inside<'a>(path: &'a Path, anchor: &Path) -> Option<&'a Path> {
    path.strip_prefix(anchor)
        .ok()
        .filter(|rel| !rel.components().any(|c| matches!(c, Component::ParentDir)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_to_base_dir() {
        let id = module_identifier(
            Path::new("/srv/app/core/plugins/learn/bundle_plugin.py"),
            Path::new("/srv/app"),
            &[PathBuf::from("/srv/app/core")],
        );
        assert!(id.is_ok_and(|id| id == "core.plugins.learn.bundle_plugin"));
    }

    #[test]
    fn test_outside_base_dir_uses_root_parent() {
        let id = module_identifier(
            Path::new("/opt/extra/media/bundle_plugin.py"),
            Path::new("/srv/app"),
            &[PathBuf::from("/srv/app/core"), PathBuf::from("/opt/extra")],
        );
        assert!(id.is_ok_and(|id| id == "extra.media.bundle_plugin"));
    }

    #[test]
    fn test_parent_dir_in_root_falls_back_to_root_parent() {
        let id = module_identifier(
            Path::new("/x/y/../other/a/bundle_plugin.py"),
            Path::new("/x/y"),
            &[PathBuf::from("/x/y/../other")],
        );
        assert!(id.is_ok_and(|id| id == "other.a.bundle_plugin"));
    }

    #[test]
    fn test_unrelated_path_is_an_error() {
        let id = module_identifier(
            Path::new("bundle_plugin.py"),
            Path::new("/srv/app"),
            &[PathBuf::from("/srv/app")],
        );
        assert!(matches!(id, Err(ExtractError::ModulePath(_))));
    }
}
