//! Timestamp-based staleness checks.
//!
//! Only modification times are consulted; no content hashing and no header
//! tracking.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// True only if both timestamps can be read and the source is strictly older
/// than the output. Any read failure means "rebuild".
pub fn is_up_to_date(source: &Path, output: &Path) -> bool {
    match (mtime(source), mtime(output)) {
        (Some(src), Some(out)) => src < out,
        _ => false,
    }
}

/// Whether a downstream artifact (archive, executable) must be refreshed from
/// its inputs: it is missing, or some input is strictly newer. Unreadable
/// inputs are skipped; the step that produced them already reported.
pub fn needs_refresh<P: AsRef<Path>>(artifact: &Path, inputs: &[P]) -> bool {
    let Some(artifact_time) = mtime(artifact) else {
        return true;
    };
    inputs
        .iter()
        .filter_map(|p| mtime(p.as_ref()))
        .any(|t| t > artifact_time)
}
