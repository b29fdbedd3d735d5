//! Package resolution: member patterns to concrete package directories

use std::path::{Path, PathBuf};

use glob::glob;
use tracing::debug;

use crate::{CoreError, Result};

/// Filter for glob results of a wildcard member like `contracts/*`.
///
/// Wildcards can match stray files next to the packages; cargo only treats
/// directories as members, so we do the same.
fn is_package_dir(path: &Path) -> bool {
    path.is_dir()
}

/// Expand the workspace member patterns into concrete package directories.
///
/// Patterns are globbed relative to `root` rather than the ambient working
/// directory, and the returned paths are relative to `root` again. The
/// result is sorted lexicographically and deduplicated, so overlapping
/// patterns cannot yield the same package twice. A pattern matching nothing
/// contributes nothing; an invalid pattern is an error.
pub fn resolve_members(root: &Path, members: &[String]) -> Result<Vec<PathBuf>> {
    let mut packages = Vec::new();

    for member in members {
        let pattern = root.join(member);
        let pattern = pattern.to_string_lossy();

        let paths = glob(&pattern).map_err(|source| CoreError::InvalidPattern {
            pattern: member.clone(),
            source,
        })?;

        for entry in paths {
            let path = entry.map_err(|e| CoreError::Io(e.into_error()))?;
            if !is_package_dir(&path) {
                continue;
            }
            // Globbing rooted the path under `root`; report it relative again.
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            packages.push(relative);
        }
    }

    packages.sort();
    packages.dedup();

    debug!(count = packages.len(), "resolved package directories");
    Ok(packages)
}

/// Keep only the packages whose relative path starts with `prefix`.
///
/// This is an exact string-prefix check: `contracts/foo` is selected for
/// prefix `contracts/`, `other/foo` is not.
pub fn filter_by_prefix(packages: &[PathBuf], prefix: &str) -> Vec<PathBuf> {
    packages
        .iter()
        .filter(|p| p.to_string_lossy().starts_with(prefix))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch_dir(root: &Path, name: &str) {
        std::fs::create_dir_all(root.join(name)).unwrap();
    }

    #[test]
    fn resolves_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch_dir(root, "contracts/b");
        touch_dir(root, "contracts/a");
        touch_dir(root, "tools/x");

        let members = vec!["contracts/*".to_string(), "tools/*".to_string()];
        let packages = resolve_members(root, &members).unwrap();
        assert_eq!(
            packages,
            vec![
                PathBuf::from("contracts/a"),
                PathBuf::from("contracts/b"),
                PathBuf::from("tools/x"),
            ]
        );

        let contracts = filter_by_prefix(&packages, "contracts/");
        assert_eq!(
            contracts,
            vec![PathBuf::from("contracts/a"), PathBuf::from("contracts/b")]
        );
    }

    #[test]
    fn skips_non_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch_dir(root, "contracts/a");
        std::fs::write(root.join("contracts/README.md"), "not a package").unwrap();

        let members = vec!["contracts/*".to_string()];
        let packages = resolve_members(root, &members).unwrap();
        assert_eq!(packages, vec![PathBuf::from("contracts/a")]);
    }

    #[test]
    fn empty_match_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let members = vec!["contracts/*".to_string()];
        let packages = resolve_members(temp.path(), &members).unwrap();
        assert!(packages.is_empty());
    }

    #[test]
    fn overlapping_patterns_dedup() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch_dir(root, "contracts/a");

        let members = vec!["contracts/*".to_string(), "contracts/a".to_string()];
        let packages = resolve_members(root, &members).unwrap();
        assert_eq!(packages, vec![PathBuf::from("contracts/a")]);
    }

    #[test]
    fn prefix_filter_is_exact() {
        let packages = vec![
            PathBuf::from("contracts/foo"),
            PathBuf::from("contracts-extra/foo"),
            PathBuf::from("other/foo"),
        ];
        let contracts = filter_by_prefix(&packages, "contracts/");
        assert_eq!(contracts, vec![PathBuf::from("contracts/foo")]);
    }
}
