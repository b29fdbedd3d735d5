//! Compiler toolchain invocation
//!
//! The toolchain is an opaque subprocess; we only assemble its argument list
//! and check its exit status. Compiler flags travel on the child's
//! environment, never on our own, so nothing leaks across invocations.

use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::{CoreError, Result};

/// Configuration for the external compiler toolchain.
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Path to the cargo executable.
    pub cargo: String,
    /// Target triple for the build.
    pub target: String,
    /// Extra compiler flags, passed via `RUSTFLAGS` on the child process.
    pub rustflags: String,
    /// Enforce the dependency lockfile.
    pub locked: bool,
    /// Package-local output directory for produced binaries. Requires
    /// nightly's unstable options, which is why it is optional.
    pub out_dir: Option<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            cargo: "cargo".to_string(),
            target: "wasm32-unknown-unknown".to_string(),
            // Strip symbols from the wasm for smaller binaries.
            rustflags: "-C link-arg=-s".to_string(),
            locked: true,
            out_dir: None,
        }
    }
}

impl Toolchain {
    /// Assemble the argument list for one build invocation.
    pub fn build_args(&self, features: &[String]) -> Vec<String> {
        let mut args = Vec::new();
        if self.out_dir.is_some() {
            args.push("-Z=unstable-options".to_string());
        }
        args.push("build".to_string());
        args.push("--release".to_string());
        args.push(format!("--target={}", self.target));
        if self.locked {
            args.push("--locked".to_string());
        }
        if !features.is_empty() {
            args.push(format!("--features={}", features.join(",")));
        }
        if let Some(dir) = &self.out_dir {
            args.push(format!("--out-dir=./{dir}"));
        }
        args
    }

    /// Build the package at `package_dir`, blocking until the toolchain
    /// exits. A non-zero exit aborts the whole run.
    pub fn build_package(&self, package_dir: &Path, features: &[String]) -> Result<()> {
        info!(package = %package_dir.display(), ?features, "building");

        let cwd = fs::canonicalize(package_dir)?;
        let args = self.build_args(features);
        debug!(cargo = %self.cargo, ?args, "spawning toolchain");

        let status = Command::new(&self.cargo)
            .args(&args)
            .env("RUSTFLAGS", &self.rustflags)
            .current_dir(&cwd)
            .status()
            .map_err(|source| CoreError::Spawn {
                tool: self.cargo.clone(),
                source,
            })?;

        if !status.success() {
            return Err(CoreError::ToolFailed {
                tool: self.cargo.clone(),
                code: status.code(),
                dir: package_dir.to_path_buf(),
            });
        }

        Ok(())
    }
}
