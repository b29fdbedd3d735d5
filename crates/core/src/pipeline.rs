//! The build pipeline: manifest -> resolve -> build -> collect
//!
//! Strictly sequential over the filtered package list. The first failing
//! stage aborts the whole run; artifacts placed by earlier iterations are
//! left where they are.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::collect::{ArtifactPolicy, Collector};
use crate::manifest::{PackageManifest, WorkspaceManifest};
use crate::optimizer::WasmOpt;
use crate::resolve::{filter_by_prefix, resolve_members};
use crate::toolchain::Toolchain;
use crate::{ARTIFACTS_DIR, CONTRACT_PREFIX, PACKAGE_OUT_DIR, Result};

/// Everything one pipeline run needs, passed explicitly instead of living
/// in process-wide state.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Workspace root; member patterns and package paths are relative to it.
    pub root: PathBuf,
    /// Workspace manifest path, relative to `root`.
    pub manifest: PathBuf,
    /// Prefix selecting buildable contract packages.
    pub prefix: String,
    pub toolchain: Toolchain,
    pub wasm_opt: WasmOpt,
    pub policy: ArtifactPolicy,
    /// Shared output directory, relative to `root`.
    pub artifacts_dir: PathBuf,
    /// When false, build only: no out-dir flag, no collection stage.
    pub collect: bool,
}

impl PipelineOptions {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            manifest: PathBuf::from("Cargo.toml"),
            prefix: CONTRACT_PREFIX.to_string(),
            toolchain: Toolchain {
                out_dir: Some(PACKAGE_OUT_DIR.to_string()),
                ..Toolchain::default()
            },
            wasm_opt: WasmOpt::default(),
            policy: ArtifactPolicy::Copy,
            artifacts_dir: PathBuf::from(ARTIFACTS_DIR),
            collect: true,
        }
    }

    /// Switch to build-only mode: the toolchain keeps its default output
    /// location and nothing is collected.
    pub fn without_collect(mut self) -> Self {
        self.collect = false;
        self.toolchain.out_dir = None;
        self
    }
}

/// One sequential build run over a workspace.
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Resolve the contract packages this run would build, without building.
    pub fn resolve_contracts(&self) -> Result<Vec<PathBuf>> {
        let manifest_path = self.options.root.join(&self.options.manifest);
        let manifest = WorkspaceManifest::load(&manifest_path)?;
        info!(members = ?manifest.members, "found workspace member entries");

        let packages = resolve_members(&self.options.root, &manifest.members)?;
        info!(packages = ?packages, "package directories");

        let contracts = filter_by_prefix(&packages, &self.options.prefix);
        info!(contracts = ?contracts, "contracts to be built");
        Ok(contracts)
    }

    /// Run the full pipeline. Returns the artifacts placed in the output
    /// directory (empty in build-only mode).
    pub fn run(&self) -> Result<Vec<PathBuf>> {
        let contracts = self.resolve_contracts()?;

        let collector = Collector::new(
            self.options.root.join(&self.options.artifacts_dir),
            self.options.policy,
            self.options.wasm_opt.clone(),
        );
        if self.options.collect {
            collector.init()?;
        }

        let mut artifacts = Vec::new();
        for contract in &contracts {
            self.build_contract(contract)?;
            if self.options.collect {
                let dir = self.options.root.join(contract);
                artifacts.extend(collector.collect_package(&dir)?);
            }
        }

        Ok(artifacts)
    }

    /// Build one contract, honoring its `[package.metadata.optimizer]`
    /// builds. Identical feature sets are compiled once; additional build
    /// names get a copy of the earlier output.
    fn build_contract(&self, contract: &Path) -> Result<()> {
        let dir = self.options.root.join(contract);
        let manifest = PackageManifest::load(&dir)?;

        // Sorted features as the key, so feature ordering doesn't matter.
        let mut built: BTreeMap<Vec<String>, String> = BTreeMap::new();

        for entry in &manifest.builds {
            let mut features = entry.features.clone().unwrap_or_default();
            features.sort();

            if let Some(existing) = built.get(&features) {
                if existing != &entry.name {
                    self.copy_build_output(&dir, &manifest, existing, &entry.name)?;
                }
                continue;
            }

            self.options.toolchain.build_package(&dir, &features)?;
            self.rename_build_output(&dir, &manifest, &entry.name)?;
            built.insert(features, entry.name.clone());
        }

        // A featureless default build unless one already ran.
        if !built.contains_key(&Vec::new()) {
            self.options.toolchain.build_package(&dir, &[])?;
        }

        Ok(())
    }

    /// Move the freshly produced wasm to its build-specific name.
    ///
    /// Only applies in collect mode where the output lands in the
    /// package-local out dir; in build-only mode there is nothing to rename.
    fn rename_build_output(
        &self,
        dir: &Path,
        manifest: &PackageManifest,
        build_name: &str,
    ) -> Result<()> {
        if build_name.is_empty() {
            return Ok(());
        }
        if let Some(out) = &self.options.toolchain.out_dir {
            let out = dir.join(out);
            fs::rename(
                out.join(manifest.wasm_file_name("")),
                out.join(manifest.wasm_file_name(build_name)),
            )?;
        }
        Ok(())
    }

    /// Reuse an already compiled output for a second build with the same
    /// feature set.
    fn copy_build_output(
        &self,
        dir: &Path,
        manifest: &PackageManifest,
        from: &str,
        to: &str,
    ) -> Result<()> {
        if let Some(out) = &self.options.toolchain.out_dir {
            let out = dir.join(out);
            fs::copy(
                out.join(manifest.wasm_file_name(from)),
                out.join(manifest.wasm_file_name(to)),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// A stand-in toolchain that drops a wasm named after its package into
    /// the package-local out dir and appends one line per invocation to
    /// `build.log`.
    const CARGO_STUB: &str = r#"#!/bin/sh
name=$(basename "$PWD" | tr - _)
mkdir -p contract_artifacts
printf 'wasm-%s' "$name" > "contract_artifacts/$name.wasm"
printf '%s\n' "$*" >> build.log
"#;

    /// Same stub, but failing inside the package named `b`.
    const FAILING_STUB: &str = r#"#!/bin/sh
[ "$(basename "$PWD")" = "b" ] && exit 1
name=$(basename "$PWD" | tr - _)
mkdir -p contract_artifacts
printf 'wasm-%s' "$name" > "contract_artifacts/$name.wasm"
"#;

    struct Workspace {
        temp: TempDir,
    }

    impl Workspace {
        fn new(members: &[&str]) -> Self {
            let temp = TempDir::new().unwrap();
            let list = members
                .iter()
                .map(|m| format!("{m:?}"))
                .collect::<Vec<_>>()
                .join(", ");
            std::fs::write(
                temp.path().join("Cargo.toml"),
                format!("[workspace]\nmembers = [{list}]\n"),
            )
            .unwrap();
            Self { temp }
        }

        fn add_package(&self, rel: &str, manifest_extra: &str) {
            let dir = self.temp.path().join(rel);
            std::fs::create_dir_all(&dir).unwrap();
            let name = rel.rsplit('/').next().unwrap();
            std::fs::write(
                dir.join("Cargo.toml"),
                format!("[package]\nname = \"{name}\"\nversion = \"0.1.0\"\n{manifest_extra}"),
            )
            .unwrap();
        }

        fn stub(&self, script: &str) -> String {
            let path = self.temp.path().join("cargo-stub");
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().to_string()
        }

        fn options(&self, script: &str) -> PipelineOptions {
            let mut options = PipelineOptions::new(self.temp.path().to_path_buf());
            options.toolchain.cargo = self.stub(script);
            options
        }
    }

    #[test]
    fn builds_and_collects_contracts_only() {
        let ws = Workspace::new(&["contracts/*", "tools/*"]);
        ws.add_package("contracts/a", "");
        ws.add_package("contracts/b", "");
        ws.add_package("tools/x", "");

        let pipeline = Pipeline::new(ws.options(CARGO_STUB));
        let artifacts = pipeline.run().unwrap();

        let artifacts_dir = ws.temp.path().join("artifacts");
        assert_eq!(
            artifacts,
            vec![artifacts_dir.join("a.wasm"), artifacts_dir.join("b.wasm")]
        );
        assert_eq!(
            std::fs::read(artifacts_dir.join("a.wasm")).unwrap(),
            b"wasm-a"
        );
        // The tools package is outside the prefix and never built.
        assert!(!ws.temp.path().join("tools/x/contract_artifacts").exists());
    }

    #[test]
    fn first_failure_stops_the_run() {
        let ws = Workspace::new(&["contracts/*"]);
        ws.add_package("contracts/a", "");
        ws.add_package("contracts/b", "");
        ws.add_package("contracts/c", "");

        let pipeline = Pipeline::new(ws.options(FAILING_STUB));
        assert!(pipeline.run().is_err());

        // `a` was built and collected before the failure; `c` never ran.
        assert!(ws.temp.path().join("artifacts/a.wasm").exists());
        assert!(!ws.temp.path().join("contracts/c/contract_artifacts").exists());
    }

    #[test]
    fn feature_builds_dedup_identical_sets() {
        let ws = Workspace::new(&["contracts/*"]);
        ws.add_package(
            "contracts/staking",
            r#"
[package.metadata.optimizer]
builds = [
    { name = "x", features = ["f2", "f1"] },
    { name = "y", features = ["f1", "f2"] },
]
"#,
        );

        let pipeline = Pipeline::new(ws.options(CARGO_STUB));
        let artifacts = pipeline.run().unwrap();

        // One featured compile (x, copied to y) plus the default build.
        let log =
            std::fs::read_to_string(ws.temp.path().join("contracts/staking/build.log")).unwrap();
        assert_eq!(log.lines().count(), 2);
        assert!(log.lines().next().unwrap().contains("--features=f1,f2"));

        let names: Vec<_> = artifacts
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert!(names.contains(&"staking-x.wasm".to_string()));
        assert!(names.contains(&"staking-y.wasm".to_string()));
        assert!(names.contains(&"staking.wasm".to_string()));
    }

    #[test]
    fn build_only_mode_collects_nothing() {
        let ws = Workspace::new(&["contracts/*"]);
        ws.add_package("contracts/a", "");

        let options = ws.options(CARGO_STUB).without_collect();
        let pipeline = Pipeline::new(options);
        let artifacts = pipeline.run().unwrap();

        assert!(artifacts.is_empty());
        assert!(!ws.temp.path().join("artifacts").exists());
    }
}
