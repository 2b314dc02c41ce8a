//! # kiln CLI Entry Point
//!
//! Parses arguments with clap and routes to the build, watch and reporting
//! handlers. Running `kiln` with no subcommand starts the watch loop.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::{Path, PathBuf};

use kiln::build::{self, Pipeline, ShellRunner};
use kiln::commands;
use kiln::config::{KilnConfig, MANIFEST_FILE};

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_windows_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_windows_utf8_console() {}

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Watch-driven incremental builds for C/C++ trees", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the manifest; relative paths inside it resolve from its directory
    #[arg(long, global = true, default_value = MANIFEST_FILE)]
    manifest: PathBuf,

    /// Echo every command before running it
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build once, then rebuild on every relevant change (default)
    Watch,
    /// Run a single build pass; exits non-zero if any stage failed
    Build,
    /// Show what the next pass would rebuild
    Status,
    /// Remove object directories, libraries and the executable
    Clean,
    /// Write compile_commands.json for editor tooling
    Compdb,
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Load the manifest and move into its directory so every relative path in
/// it (and every command) resolves the same way regardless of where kiln was
/// started.
fn open_manifest(manifest: &Path) -> Result<KilnConfig> {
    let file = match manifest.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::env::set_current_dir(dir)
                .with_context(|| format!("Failed to enter {}", dir.display()))?;
            manifest
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(MANIFEST_FILE))
        }
        _ => manifest.to_path_buf(),
    };
    build::load_config(&file)
}

fn build_once(config: &KilnConfig, verbose: bool) -> Result<()> {
    let report = Pipeline::new(config, ShellRunner::new())
        .verbose(verbose)
        .run();
    if !report.ok() {
        eprintln!("{} {} stage(s) failed", "x".red(), report.failures.len());
        std::process::exit(1);
    }
    Ok(())
}

fn main() -> Result<()> {
    enable_windows_utf8_console();

    let cli = Cli::parse();

    if let Some(Commands::Completion { shell }) = &cli.command {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
        return Ok(());
    }

    let config = open_manifest(&cli.manifest)?;

    match &cli.command {
        None | Some(Commands::Watch) => build::watch(&config, cli.verbose),
        Some(Commands::Build) => build_once(&config, cli.verbose),
        Some(Commands::Status) => commands::status::print_status(&config, cli.verbose),
        Some(Commands::Clean) => build::clean(&config),
        Some(Commands::Compdb) => commands::compdb::write_compdb(&config),
        Some(Commands::Completion { .. }) => Ok(()),
    }
}
