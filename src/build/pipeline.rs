//! Pass coordinator.
//!
//! A pass is a fixed, ordered list of stages:
//!
//! ```text
//! compile(g1) -> archive(g1) -> ... -> compile(gN) -> archive(gN) -> link -> package
//! ```
//!
//! Each stage consumes the state left by the previous ones: an archive stage
//! reads its group's compile report, link reads the accumulated dirty flag and
//! the aggregate list, package reads whether link ran and succeeded. Failures
//! stay local to their stage; the pass always reaches the end of the list.

use super::archive::archive_group;
use super::failure::StageFailure;
use super::group::{BuildGroup, GroupReport, build_group};
use super::link::{link_executable, package_executable};
use super::process::{CommandRunner, Invoker};
use crate::config::{KilnConfig, LinkConfig, PackageConfig};
use colored::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub enum Stage<'p> {
    Compile(&'p BuildGroup),
    Archive(&'p BuildGroup),
    Link(&'p LinkConfig),
    /// Packaging reads the link stage's executable path.
    Package(&'p PackageConfig, &'p LinkConfig),
}

impl std::fmt::Display for Stage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Compile(g) => write!(f, "compile({})", g.name),
            Stage::Archive(g) => write!(f, "archive({})", g.name),
            Stage::Link(_) => write!(f, "link"),
            Stage::Package(..) => write!(f, "package"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Skipped,
    Done,
    Failed,
}

/// Everything one pass did.
#[derive(Debug, Clone)]
pub struct PassReport {
    /// Logical OR of every group's dirty flag.
    pub dirty: bool,
    pub groups: Vec<GroupReport>,
    /// Groups whose static library was rewritten this pass.
    pub archived: Vec<String>,
    pub link: StepStatus,
    pub package: StepStatus,
    pub failures: Vec<StageFailure>,
    pub elapsed: Duration,
}

impl PassReport {
    pub fn ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn compiled(&self) -> usize {
        self.groups.iter().map(|g| g.compiled).sum()
    }
}

impl Default for PassReport {
    fn default() -> Self {
        Self {
            dirty: false,
            groups: Vec::new(),
            archived: Vec::new(),
            link: StepStatus::Skipped,
            package: StepStatus::Skipped,
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }
}

/// State threaded through the stage list.
#[derive(Default)]
struct PassState {
    report: PassReport,
    current: Option<GroupReport>,
    aggregates: Vec<PathBuf>,
}

pub struct Pipeline<R> {
    groups: Vec<BuildGroup>,
    link: LinkConfig,
    package: Option<PackageConfig>,
    vars: BTreeMap<String, String>,
    runner: R,
    verbose: bool,
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn new(config: &KilnConfig, runner: R) -> Self {
        Self {
            groups: config.groups.iter().map(BuildGroup::from).collect(),
            link: config.link.clone(),
            package: config.package.clone(),
            vars: config.vars.clone(),
            runner,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn groups(&self) -> &[BuildGroup] {
        &self.groups
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn invoker(&self) -> Invoker<'_> {
        Invoker::new(&self.runner, &self.vars, self.verbose)
    }

    /// The static stage list, in execution order.
    pub fn stages(&self) -> Vec<Stage<'_>> {
        let mut stages: Vec<Stage<'_>> = self
            .groups
            .iter()
            .flat_map(|g| [Stage::Compile(g), Stage::Archive(g)])
            .collect();
        stages.push(Stage::Link(&self.link));
        if let Some(package) = &self.package {
            stages.push(Stage::Package(package, &self.link));
        }
        stages
    }

    /// Run one full pass.
    pub fn run(&self) -> PassReport {
        let start = Instant::now();
        let invoker = self.invoker();
        let mut state = PassState::default();

        for stage in self.stages() {
            execute(stage, &mut state, &invoker);
        }

        let mut report = state.report;
        report.elapsed = start.elapsed();
        print_summary(&report);
        report
    }
}

fn execute(stage: Stage<'_>, state: &mut PassState, invoker: &Invoker<'_>) {
    match stage {
        Stage::Compile(group) => {
            let report = build_group(group, invoker);
            state.report.dirty |= report.dirty;
            if let Some(failure) = &report.failure {
                state.report.failures.push(failure.clone());
            }
            state.current = Some(report);
        }
        Stage::Archive(group) => {
            state.aggregates.push(group.lib.clone());
            let Some(report) = state.current.take() else {
                return;
            };
            if report.ok && report.dirty {
                match archive_group(group, &report.outputs, invoker) {
                    Ok(()) => state.report.archived.push(group.name.clone()),
                    Err(failure) => state.report.failures.push(failure),
                }
            }
            state.report.groups.push(report);
        }
        Stage::Link(link) => {
            if !state.report.dirty {
                return;
            }
            state.report.link = match link_executable(link, &state.aggregates, invoker) {
                Ok(()) => StepStatus::Done,
                Err(failure) => {
                    state.report.failures.push(failure);
                    StepStatus::Failed
                }
            };
        }
        Stage::Package(package, link) => {
            if state.report.link != StepStatus::Done {
                return;
            }
            state.report.package = match package_executable(package, link, invoker) {
                Ok(()) => StepStatus::Done,
                Err(failure) => {
                    state.report.failures.push(failure);
                    StepStatus::Failed
                }
            };
        }
    }
}

fn print_summary(report: &PassReport) {
    if !report.ok() {
        for failure in &report.failures {
            println!("   {} {}", "x".red(), failure);
        }
        println!("{} {} step(s) failed", "x".red(), report.failures.len());
    } else if report.dirty {
        println!("{} done in {:.2?}", "✓".green(), report.elapsed);
    } else {
        println!("{} Up to date", "⚡".green());
    }
}
