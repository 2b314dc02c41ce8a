use std::path::PathBuf;

/// A failed pipeline step. Stage failures are reported, never propagated:
/// the pass carries on with the next group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageFailure {
    /// The group's output directory could not be created.
    OutputDir { group: String, dir: PathBuf },
    /// A unit's compile command exited non-zero (or could not start).
    Compile { group: String, unit: PathBuf },
    Archive { group: String, lib: PathBuf },
    Link { exe: PathBuf },
    /// Packaging failed; the linked executable is kept.
    Package { exe: PathBuf },
}

impl StageFailure {
    pub fn group(&self) -> Option<&str> {
        match self {
            StageFailure::OutputDir { group, .. }
            | StageFailure::Compile { group, .. }
            | StageFailure::Archive { group, .. } => Some(group),
            StageFailure::Link { .. } | StageFailure::Package { .. } => None,
        }
    }
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageFailure::OutputDir { group, dir } => write!(
                f,
                "[{}] cannot create output directory {}",
                group,
                dir.display()
            ),
            StageFailure::Compile { group, unit } => {
                write!(f, "[{}] compile {} failed", group, unit.display())
            }
            StageFailure::Archive { group, lib } => {
                write!(f, "[{}] archive {} failed", group, lib.display())
            }
            StageFailure::Link { exe } => write!(f, "link {} failed", exe.display()),
            StageFailure::Package { exe } => write!(f, "packaging {} failed", exe.display()),
        }
    }
}

impl std::error::Error for StageFailure {}
