use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::{Term, style};
use tracing_subscriber::EnvFilter;

mod cmd;

/// wasmforge - Workspace build orchestrator for Wasm contract packages
#[derive(Parser)]
#[command(name = "wasmforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build all contract packages and collect their artifacts
    Build {
        /// Path to the workspace manifest
        #[arg(long, default_value = "Cargo.toml")]
        manifest: PathBuf,

        /// Prefix selecting buildable contract packages
        #[arg(long, default_value = "contracts/")]
        prefix: String,

        /// Directory artifacts are collected into
        #[arg(long, default_value = "artifacts")]
        out_dir: PathBuf,

        /// Run collected artifacts through wasm-opt instead of copying
        #[arg(long)]
        optimize: bool,

        /// Build only; skip the collection stage
        #[arg(long)]
        no_collect: bool,

        /// Path to the cargo executable
        #[arg(long, default_value = "cargo")]
        cargo: String,

        /// Path to the wasm-opt executable
        #[arg(long, default_value = "wasm-opt")]
        wasm_opt: String,
    },

    /// List the contract packages a build would select (dry-run)
    List {
        /// Path to the workspace manifest
        #[arg(long, default_value = "Cargo.toml")]
        manifest: PathBuf,

        /// Prefix selecting buildable contract packages
        #[arg(long, default_value = "contracts/")]
        prefix: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .init();

    let result: Result<()> = match cli.command {
        Commands::Build {
            manifest,
            prefix,
            out_dir,
            optimize,
            no_collect,
            cargo,
            wasm_opt,
        } => cmd::build::run(cmd::build::BuildParams {
            manifest,
            prefix,
            out_dir,
            optimize,
            no_collect,
            cargo,
            wasm_opt,
        }),
        Commands::List { manifest, prefix } => cmd::list::run(&manifest, &prefix),
    };

    if let Err(e) = result {
        let term = Term::stderr();
        let _ = term.write_line(&format!("{} {e}", style("error:").red().bold()));
        std::process::exit(1);
    }
}
