//! Watch loop: filter, debounce and single-flight around the pipeline.
//!
//! Two states, IDLE and BUILDING, held in a [`BuildGate`]. A relevant change
//! seen while IDLE runs one pass; any change seen while BUILDING is dropped
//! (or, with `rerun_on_change`, latched for exactly one follow-up pass).

use super::pipeline::{PassReport, Pipeline};
use super::process::{CommandRunner, ShellRunner};
use crate::config::{KilnConfig, WatchConfig};
use anyhow::{Context, Result};
use colored::*;
use notify::{Config, Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::Duration;

/// The process-wide "build in progress" flag.
#[derive(Debug, Default)]
pub struct BuildGate {
    building: AtomicBool,
}

/// Held for the duration of one pass; dropping it returns the gate to IDLE on
/// every exit path, unwinding included.
#[derive(Debug)]
pub struct BuildGuard<'a> {
    gate: &'a BuildGate,
}

impl BuildGate {
    pub fn try_acquire(&self) -> Option<BuildGuard<'_>> {
        self.building
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BuildGuard { gate: self })
    }

    pub fn is_building(&self) -> bool {
        self.building.load(Ordering::Acquire)
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.gate.building.store(false, Ordering::Release);
    }
}

/// What the watcher thread should do with a raw change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Extension not in the relevant set.
    Irrelevant,
    /// A pass is running; the event is dropped.
    Busy,
    /// Forward to the debouncer.
    Accepted,
}

#[derive(Debug)]
pub enum Outcome {
    /// No relevant path in the batch.
    Ignored,
    /// A pass was already running.
    Dropped,
    /// One report per pass run (more than one only with the rerun latch).
    Built(Vec<PassReport>),
}

pub struct Controller<R> {
    pipeline: Pipeline<R>,
    gate: BuildGate,
    extensions: Vec<String>,
    rerun_on_change: bool,
    rerun_requested: AtomicBool,
}

impl<R: CommandRunner> Controller<R> {
    pub fn new(pipeline: Pipeline<R>, watch: &WatchConfig) -> Self {
        Self {
            pipeline,
            gate: BuildGate::default(),
            extensions: watch.extensions.clone(),
            rerun_on_change: watch.rerun_on_change,
            rerun_requested: AtomicBool::new(false),
        }
    }

    pub fn pipeline(&self) -> &Pipeline<R> {
        &self.pipeline
    }

    pub fn gate(&self) -> &BuildGate {
        &self.gate
    }

    pub fn is_relevant(&self, path: &Path) -> bool {
        is_relevant(path, &self.extensions)
    }

    /// Classify a raw notification at the moment it arrives.
    pub fn admit(&self, path: &Path) -> Admission {
        if !self.is_relevant(path) {
            return Admission::Irrelevant;
        }
        if self.gate.is_building() {
            if self.rerun_on_change {
                self.rerun_requested.store(true, Ordering::Release);
            }
            return Admission::Busy;
        }
        Admission::Accepted
    }

    /// Handle one debounced batch of changed paths.
    pub fn on_change(&self, paths: &[PathBuf]) -> Outcome {
        let Some(trigger) = paths.iter().find(|p| self.is_relevant(p)) else {
            return Outcome::Ignored;
        };
        let Some(_guard) = self.gate.try_acquire() else {
            if self.rerun_on_change {
                self.rerun_requested.store(true, Ordering::Release);
            }
            return Outcome::Dropped;
        };

        println!("{} {} changed. Rebuilding...", "🔄".yellow(), trigger.display());
        Outcome::Built(self.run_guarded())
    }

    /// Run a pass through the gate, e.g. the initial build. `None` if one is
    /// already running.
    pub fn run_pass(&self) -> Option<Vec<PassReport>> {
        let _guard = self.gate.try_acquire()?;
        Some(self.run_guarded())
    }

    /// The latch is only consumed here, never reset up front: a change
    /// admitted as busy just before this pass started still earns its rerun.
    fn run_guarded(&self) -> Vec<PassReport> {
        let mut reports = vec![self.pipeline.run()];
        if self.rerun_on_change && self.rerun_requested.swap(false, Ordering::AcqRel) {
            println!(
                "{} Changes arrived during the build. Rebuilding once more...",
                "🔄".yellow()
            );
            reports.push(self.pipeline.run());
        }
        reports
    }
}

pub fn is_relevant(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.iter().any(|e| *e == ext))
}

/// Trailing-edge debounce: waits for a first event, then keeps collecting
/// until the channel has been quiet for `window`.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    window: Duration,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// `None` once the sender side is gone and nothing is pending.
    pub fn next_batch(&self, rx: &Receiver<PathBuf>) -> Option<Vec<PathBuf>> {
        let first = rx.recv().ok()?;
        let mut batch = vec![first];
        loop {
            match rx.recv_timeout(self.window) {
                Ok(path) => {
                    if !batch.contains(&path) {
                        batch.push(path);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Some(batch)
    }
}

fn is_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Build once, then rebuild on every relevant change until interrupted.
pub fn watch(config: &KilnConfig, verbose: bool) -> Result<()> {
    let pipeline = Pipeline::new(config, ShellRunner::new()).verbose(verbose);
    let controller = Arc::new(Controller::new(pipeline, &config.watch));

    controller.run_pass();

    let (tx, rx) = channel::<PathBuf>();
    let handler_ctl = Arc::clone(&controller);
    let mut watcher = notify::RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) if is_change(&event.kind) => {
                for path in event.paths {
                    match handler_ctl.admit(&path) {
                        Admission::Accepted => {
                            let _ = tx.send(path);
                        }
                        Admission::Busy if verbose => {
                            println!(
                                "   {} {} (build in progress)",
                                "skip".dimmed(),
                                path.display()
                            );
                        }
                        _ => {}
                    }
                }
            }
            Ok(_) => {}
            Err(e) => eprintln!("{} Watch error: {}", "!".yellow(), e),
        },
        Config::default(),
    )
    .context("Failed to create file watcher")?;

    watcher
        .watch(&config.watch.root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", config.watch.root.display()))?;

    println!(
        "{} Watching {} ({})...",
        "👀".cyan(),
        config.watch.root.display(),
        config
            .watch
            .extensions
            .iter()
            .map(|e| format!(".{}", e))
            .collect::<Vec<_>>()
            .join(" ")
    );

    let debouncer = Debouncer::new(Duration::from_millis(config.watch.debounce_ms));
    while let Some(batch) = debouncer.next_batch(&rx) {
        controller.on_change(&batch);
    }
    Ok(())
}
