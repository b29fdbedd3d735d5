//! Artifact collection into the shared output directory

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use tracing::info;

use crate::optimizer::WasmOpt;
use crate::{CoreError, PACKAGE_OUT_DIR, Result};

/// How a produced wasm file makes its way into the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactPolicy {
    /// Copy the file verbatim.
    Copy,
    /// Run it through `wasm-opt -Os` on the way.
    Optimize,
}

/// Collects built wasm files into one flat output directory.
///
/// Filenames are not deduplicated across packages; a collision overwrites
/// whatever an earlier package placed there.
#[derive(Debug)]
pub struct Collector {
    artifacts_dir: PathBuf,
    policy: ArtifactPolicy,
    wasm_opt: WasmOpt,
}

impl Collector {
    pub fn new(artifacts_dir: PathBuf, policy: ArtifactPolicy, wasm_opt: WasmOpt) -> Self {
        Self {
            artifacts_dir,
            policy,
            wasm_opt,
        }
    }

    /// Create the output directory if absent. Existing artifacts from prior
    /// runs are left in place.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.artifacts_dir)?;
        info!(dir = %self.artifacts_dir.display(), "artifacts directory ready");
        Ok(())
    }

    /// Collect every wasm file the toolchain left in the package-local
    /// output directory of `package_dir`. Returns the paths placed in the
    /// output directory.
    pub fn collect_package(&self, package_dir: &Path) -> Result<Vec<PathBuf>> {
        let package_dir = fs::canonicalize(package_dir)?;
        let pattern = package_dir.join(PACKAGE_OUT_DIR).join("*.wasm");
        let pattern = pattern.to_string_lossy();

        let paths = glob(&pattern).map_err(|source| CoreError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut collected = Vec::new();
        for entry in paths {
            let wasm = entry.map_err(|e| CoreError::Io(e.into_error()))?;
            let file_name = wasm.file_name().ok_or_else(|| CoreError::Collect {
                path: wasm.clone(),
                message: "artifact has no file name".to_string(),
            })?;
            let dest = self.artifacts_dir.join(file_name);

            match self.policy {
                ArtifactPolicy::Copy => {
                    fs::copy(&wasm, &dest)?;
                }
                ArtifactPolicy::Optimize => {
                    self.wasm_opt.optimize(&wasm, &dest)?;
                }
            }

            info!(artifact = %dest.display(), "collected");
            collected.push(dest);
        }

        Ok(collected)
    }
}
