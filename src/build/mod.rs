mod archive;
mod clean;
mod failure;
mod feedback;
mod group;
mod link;
mod pipeline;
mod process;
mod stale;
mod utils;
mod watcher;

pub use archive::{archive_command, archive_group};
pub use clean::{artifacts, clean};
pub use failure::StageFailure;
pub use feedback::FeedbackAnalyzer;
pub use group::{BuildGroup, GroupReport, SourceUnit, build_group, compile_unit, output_path_for};
pub use link::{link_command, link_executable, package_command, package_executable};
pub use pipeline::{PassReport, Pipeline, Stage, StepStatus};
pub use process::{
    CommandRunner, Invoker, ProcessOutput, ShellRunner, TemplateVars, join_paths, render,
};
pub use stale::{is_up_to_date, needs_refresh};
pub use utils::{load_config, parse_config};
pub use watcher::{
    Admission, BuildGate, BuildGuard, Controller, Debouncer, Outcome, is_relevant, watch,
};
