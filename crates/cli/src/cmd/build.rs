//! `wasmforge build`: run the full pipeline over the current directory.

use std::path::PathBuf;

use anyhow::Result;
use console::{Term, style};
use tracing::debug;
use wasmforge_core::{ArtifactPolicy, Pipeline, PipelineOptions};

pub struct BuildParams {
    pub manifest: PathBuf,
    pub prefix: String,
    pub out_dir: PathBuf,
    pub optimize: bool,
    pub no_collect: bool,
    pub cargo: String,
    pub wasm_opt: String,
}

pub fn run(params: BuildParams) -> Result<()> {
    let term = Term::stderr();

    let mut options = PipelineOptions::new(PathBuf::from("."));
    options.manifest = params.manifest;
    options.prefix = params.prefix;
    options.artifacts_dir = params.out_dir;
    options.toolchain.cargo = params.cargo;
    options.wasm_opt.path = params.wasm_opt;
    if params.optimize {
        options.policy = ArtifactPolicy::Optimize;
    }
    if params.no_collect {
        options = options.without_collect();
    }
    debug!(?options, "pipeline options");

    term.write_line(&format!(
        "{} Building contracts under '{}'",
        style("::").cyan().bold(),
        options.prefix
    ))?;

    let collect = options.collect;
    let artifacts = Pipeline::new(options).run()?;

    for artifact in &artifacts {
        term.write_line(&format!(
            "  {} {}",
            style("✓").green(),
            artifact.display()
        ))?;
    }
    if collect {
        term.write_line(&format!(
            "{} {} artifact(s) collected",
            style("::").cyan().bold(),
            artifacts.len()
        ))?;
    } else {
        term.write_line(&format!(
            "{} Build complete (collection skipped)",
            style("::").cyan().bold()
        ))?;
    }

    Ok(())
}
