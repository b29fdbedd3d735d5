//! `wasmforge list`: show what a build would select, without building.

use std::path::{Path, PathBuf};

use anyhow::Result;
use wasmforge_core::{Pipeline, PipelineOptions};

pub fn run(manifest: &Path, prefix: &str) -> Result<()> {
    let mut options = PipelineOptions::new(PathBuf::from("."));
    options.manifest = manifest.to_path_buf();
    options.prefix = prefix.to_string();

    let contracts = Pipeline::new(options).resolve_contracts()?;
    for contract in contracts {
        println!("{}", contract.display());
    }
    Ok(())
}
