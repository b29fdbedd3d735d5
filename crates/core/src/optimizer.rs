//! Binary size optimizer invocation
//!
//! Like the toolchain, `wasm-opt` is an opaque subprocess: one input file,
//! one output path, aggressive size optimization.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::{CoreError, Result};

/// Configuration for the external `wasm-opt` tool.
#[derive(Debug, Clone)]
pub struct WasmOpt {
    /// Path to the wasm-opt executable.
    pub path: String,
}

impl Default for WasmOpt {
    fn default() -> Self {
        Self {
            path: "wasm-opt".to_string(),
        }
    }
}

impl WasmOpt {
    /// Optimize `input` for size, writing the result to `output`.
    pub fn optimize(&self, input: &Path, output: &Path) -> Result<()> {
        debug!(input = %input.display(), output = %output.display(), "optimizing");

        let status = Command::new(&self.path)
            .arg("-Os")
            .arg("-o")
            .arg(output)
            .arg(input)
            .status()
            .map_err(|source| CoreError::Spawn {
                tool: self.path.clone(),
                source,
            })?;

        if !status.success() {
            return Err(CoreError::ToolFailed {
                tool: self.path.clone(),
                code: status.code(),
                dir: input.to_path_buf(),
            });
        }

        Ok(())
    }
}
