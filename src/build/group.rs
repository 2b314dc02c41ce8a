//! Build groups: compile every stale unit of one static library.

use super::failure::StageFailure;
use super::feedback::FeedbackAnalyzer;
use super::process::{Invoker, render};
use super::stale::is_up_to_date;
use crate::config::GroupConfig;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// One compilable input and the group it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub group: String,
}

/// An ordered list of units sharing one compile template, output directory
/// and aggregate artifact.
#[derive(Debug, Clone)]
pub struct BuildGroup {
    pub name: String,
    pub units: Vec<SourceUnit>,
    pub out_dir: PathBuf,
    pub suffix: String,
    pub compile: String,
    pub archive: String,
    pub lib: PathBuf,
}

impl From<&GroupConfig> for BuildGroup {
    fn from(cfg: &GroupConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            units: cfg
                .sources
                .iter()
                .map(|path| SourceUnit {
                    path: path.clone(),
                    group: cfg.name.clone(),
                })
                .collect(),
            out_dir: cfg.out_dir.clone(),
            suffix: cfg.suffix.clone(),
            compile: cfg.compile.clone(),
            archive: cfg.archive.clone(),
            lib: cfg.lib.clone(),
        }
    }
}

impl BuildGroup {
    /// Output artifact paths of every unit, in declared order.
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.units
            .iter()
            .map(|unit| output_path_for(unit, self))
            .collect()
    }

    /// Units whose output is missing or not strictly newer than the source.
    pub fn stale_units(&self) -> Vec<&SourceUnit> {
        self.units
            .iter()
            .filter(|unit| !is_up_to_date(&unit.path, &output_path_for(unit, self)))
            .collect()
    }

    pub fn compile_command(&self, unit: &SourceUnit, invoker: &Invoker<'_>) -> String {
        let vars = invoker
            .vars()
            .path("src", &unit.path)
            .path("out", &output_path_for(unit, self));
        render(&self.compile, &vars)
    }
}

/// `out_dir / (file name + suffix)`, e.g. `src/lexer.cc` -> `build/ninja/lexer.cc.o`.
///
/// Total: a path without a file name component (`..`, `/`) uses its whole
/// string with separators flattened to `_`.
pub fn output_path_for(unit: &SourceUnit, group: &BuildGroup) -> PathBuf {
    let mut name: OsString = match unit.path.file_name() {
        Some(name) => name.to_os_string(),
        None => unit
            .path
            .to_string_lossy()
            .replace(['/', '\\'], "_")
            .into(),
    };
    name.push(&group.suffix);
    group.out_dir.join(name)
}

/// Outcome of one group pass.
#[derive(Debug, Clone, Default)]
pub struct GroupReport {
    pub name: String,
    /// At least one unit was recompiled.
    pub dirty: bool,
    /// No unit failed.
    pub ok: bool,
    /// Every attempted unit's output path, rebuilt or not.
    pub outputs: Vec<PathBuf>,
    pub compiled: usize,
    pub failure: Option<StageFailure>,
}

impl GroupReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ok: true,
            ..Default::default()
        }
    }

    fn fail(&mut self, failure: StageFailure) {
        self.ok = false;
        self.failure = Some(failure);
    }
}

/// Run one unit's compile command; success iff it exits zero. No retry.
pub fn compile_unit(invoker: &Invoker<'_>, command: &str, pb: &ProgressBar) -> bool {
    let output = invoker.invoke(command, pb);
    if !output.success
        && let Some(hint) = FeedbackAnalyzer::analyze(&output.combined())
    {
        pb.suspend(|| println!("{} {}", "💡".yellow(), hint));
    }
    output.success
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix:.bold} {bar:30.cyan/blue} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

/// Compile the group's stale units in declared order, stopping at the first
/// failure. A group with nothing stale performs no external invocation.
pub fn build_group(group: &BuildGroup, invoker: &Invoker<'_>) -> GroupReport {
    let mut report = GroupReport::new(&group.name);
    let pb = progress_bar(group.units.len());
    pb.set_prefix(group.name.clone());
    let mut dir_ready = false;

    for unit in &group.units {
        let out = output_path_for(unit, group);
        report.outputs.push(out.clone());

        if is_up_to_date(&unit.path, &out) {
            pb.inc(1);
            continue;
        }

        if !dir_ready {
            if let Err(e) = ensure_dir(&group.out_dir) {
                pb.suspend(|| {
                    println!(
                        "{} Cannot create {}: {}",
                        "x".red(),
                        group.out_dir.display(),
                        e
                    )
                });
                report.fail(StageFailure::OutputDir {
                    group: group.name.clone(),
                    dir: group.out_dir.clone(),
                });
                break;
            }
            dir_ready = true;
        }

        pb.set_message(unit.path.display().to_string());
        pb.suspend(|| println!("   {} {}", "cc".cyan(), unit.path.display()));

        let command = group.compile_command(unit, invoker);
        if !compile_unit(invoker, &command, &pb) {
            pb.suspend(|| println!("{} compile {} failed", "x".red(), unit.path.display()));
            report.fail(StageFailure::Compile {
                group: group.name.clone(),
                unit: unit.path.clone(),
            });
            break;
        }

        report.dirty = true;
        report.compiled += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();
    report
}
