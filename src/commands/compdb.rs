//! `kiln compdb`: write `compile_commands.json` for editor tooling.

use crate::build::{BuildGroup, Invoker, ShellRunner};
use crate::config::KilnConfig;
use anyhow::{Context, Result};
use colored::*;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

pub const COMPDB_FILE: &str = "compile_commands.json";

/// One entry per unit, with the exact command a pass would run.
pub fn entries(config: &KilnConfig, directory: &Path) -> Vec<Value> {
    let runner = ShellRunner::new();
    let invoker = Invoker::new(&runner, &config.vars, false);
    let directory = directory.to_string_lossy();

    config
        .groups
        .iter()
        .map(BuildGroup::from)
        .flat_map(|group| {
            group
                .units
                .iter()
                .map(|unit| {
                    json!({
                        "directory": directory,
                        "command": group.compile_command(unit, &invoker),
                        "file": unit.path.to_string_lossy(),
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn write_compdb(config: &KilnConfig) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let entries = entries(config, &current_dir);
    let json_str = serde_json::to_string_pretty(&entries)?;
    fs::write(COMPDB_FILE, json_str).with_context(|| format!("Failed to write {}", COMPDB_FILE))?;
    println!(
        "{} Wrote {} ({} entries)",
        "✓".green(),
        COMPDB_FILE,
        entries.len()
    );
    Ok(())
}
