//! Manifest reading for workspaces and member packages
//!
//! Two kinds of `Cargo.toml` are read here: the workspace manifest at the
//! root (for its member patterns) and each contract package's own manifest
//! (for its name and optional optimizer build metadata).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{CoreError, Result};

/// The workspace section of a root `Cargo.toml`.
#[derive(Deserialize, Debug)]
struct RootCargoToml {
    workspace: Option<WorkspaceSection>,
}

#[derive(Deserialize, Debug)]
struct WorkspaceSection {
    members: Option<Vec<String>>,
}

/// A parsed workspace manifest: the ordered member pattern list.
#[derive(Debug, Clone)]
pub struct WorkspaceManifest {
    pub members: Vec<String>,
}

/// What kind of manifest a `Cargo.toml` turned out to be.
///
/// Wildcard member entries only make sense in a workspace, so the caller
/// needs to know which case it is dealing with before resolving anything.
#[derive(Debug, PartialEq, Eq)]
pub enum WorkspaceKind {
    /// A workspace with at least one member entry.
    Workspace { members: Vec<String> },
    /// A `[workspace]` table exists but the members key is missing or empty.
    NoMembers,
    /// A plain single-package manifest.
    SinglePackage,
}

/// Detect whether the manifest text describes a workspace.
pub fn detect_workspace(text: &str, path: &Path) -> Result<WorkspaceKind> {
    let parsed: RootCargoToml =
        toml::from_str(text).map_err(|source| CoreError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;

    match parsed.workspace {
        Some(workspace) => match workspace.members {
            Some(members) if !members.is_empty() => Ok(WorkspaceKind::Workspace { members }),
            _ => Ok(WorkspaceKind::NoMembers),
        },
        None => Ok(WorkspaceKind::SinglePackage),
    }
}

impl WorkspaceManifest {
    /// Load the workspace manifest at `path`.
    ///
    /// Fails if the file is missing, malformed, or is not a workspace with
    /// members. No recovery is attempted.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| CoreError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;

        match detect_workspace(&text, path)? {
            WorkspaceKind::Workspace { members } => Ok(Self { members }),
            WorkspaceKind::NoMembers => Err(CoreError::NoMembers(path.to_path_buf())),
            WorkspaceKind::SinglePackage => Err(CoreError::NotAWorkspace(path.to_path_buf())),
        }
    }
}

/// A build entry under `[package.metadata.optimizer]`.
///
/// Specifies one build of a contract with an optional feature set.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BuildEntry {
    /// Name appended to the build output file name.
    pub name: String,
    /// Cargo features to enable for this build.
    pub features: Option<Vec<String>>,
}

#[derive(Deserialize, Debug)]
struct PackageCargoToml {
    package: PackageSection,
}

#[derive(Deserialize, Debug)]
struct PackageSection {
    name: String,
    metadata: Option<MetadataSection>,
}

#[derive(Deserialize, Debug)]
struct MetadataSection {
    optimizer: Option<OptimizerSection>,
}

#[derive(Deserialize, Debug)]
struct OptimizerSection {
    builds: Option<Vec<BuildEntry>>,
}

/// A contract package's own manifest.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    /// The package name as declared in `Cargo.toml`.
    pub name: String,
    /// Requested builds from `[package.metadata.optimizer]`, if any.
    pub builds: Vec<BuildEntry>,
}

impl PackageManifest {
    /// Load the manifest of the package rooted at `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("Cargo.toml");
        let text = fs::read_to_string(&path).map_err(|source| CoreError::ManifestRead {
            path: path.clone(),
            source,
        })?;

        let PackageCargoToml { package } =
            toml::from_str(&text).map_err(|source| CoreError::ManifestParse { path, source })?;

        let builds = package
            .metadata
            .and_then(|metadata| metadata.optimizer)
            .and_then(|optimizer| optimizer.builds)
            .unwrap_or_default();

        Ok(Self {
            name: package.name,
            builds,
        })
    }

    /// The wasm module name cargo produces for this package.
    pub fn wasm_name(&self) -> String {
        self.name.replace('-', "_")
    }

    /// Output file name for a named build, `<wasm_name>-<build_name>.wasm`,
    /// or `<wasm_name>.wasm` when the build name is empty.
    pub fn wasm_file_name(&self, build_name: &str) -> PathBuf {
        if build_name.is_empty() {
            PathBuf::from(format!("{}.wasm", self.wasm_name()))
        } else {
            PathBuf::from(format!("{}-{}.wasm", self.wasm_name(), build_name))
        }
    }
}
