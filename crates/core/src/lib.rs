//! wasmforge-core: Core logic for wasmforge
//!
//! This crate provides the manifest, resolve, build, and collect stages of
//! the contract build pipeline.

mod collect;
mod error;
mod manifest;
mod optimizer;
mod pipeline;
mod resolve;
mod toolchain;

pub use collect::{ArtifactPolicy, Collector};
pub use error::CoreError;
pub use manifest::{
    BuildEntry, PackageManifest, WorkspaceKind, WorkspaceManifest, detect_workspace,
};
pub use optimizer::WasmOpt;
pub use pipeline::{Pipeline, PipelineOptions};
pub use resolve::{filter_by_prefix, resolve_members};
pub use toolchain::Toolchain;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Default prefix under which buildable contract packages live.
pub const CONTRACT_PREFIX: &str = "contracts/";

/// Package-local directory the toolchain drops wasm files into.
pub const PACKAGE_OUT_DIR: &str = "contract_artifacts";

/// Shared directory artifacts are collected into.
pub const ARTIFACTS_DIR: &str = "artifacts";
