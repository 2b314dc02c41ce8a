use super::failure::StageFailure;
use super::group::BuildGroup;
use super::process::{Invoker, render};
use colored::*;
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};

pub fn archive_command(group: &BuildGroup, outputs: &[PathBuf], invoker: &Invoker<'_>) -> String {
    let vars = invoker
        .vars()
        .path("lib", &group.lib)
        .paths("objs", outputs);
    render(&group.archive, &vars)
}

/// Pack every member output (not only the rebuilt ones) into the group's
/// static library. Only called for a dirty group that compiled cleanly.
pub fn archive_group(
    group: &BuildGroup,
    outputs: &[PathBuf],
    invoker: &Invoker<'_>,
) -> Result<(), StageFailure> {
    let failure = || StageFailure::Archive {
        group: group.name.clone(),
        lib: group.lib.clone(),
    };

    if let Some(parent) = group.lib.parent().filter(|p| !p.as_os_str().is_empty())
        && let Err(e) = fs::create_dir_all(parent)
    {
        println!("{} Cannot create {}: {}", "x".red(), parent.display(), e);
        return Err(failure());
    }

    println!("   {} {}", "ar".cyan(), lib_name(&group.lib));
    let output = invoker.invoke(
        &archive_command(group, outputs, invoker),
        &ProgressBar::hidden(),
    );
    if !output.success {
        println!("{} archive {} failed", "x".red(), group.lib.display());
        return Err(failure());
    }

    println!("{} make {} done", "✓".green(), lib_name(&group.lib));
    Ok(())
}

fn lib_name(lib: &Path) -> String {
    lib.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| lib.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupConfig;
    use crate::testutil::RecordingRunner;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn group(dir: &Path) -> BuildGroup {
        BuildGroup::from(&GroupConfig {
            name: "lua".into(),
            sources: vec![dir.join("a.c"), dir.join("b.c")],
            out_dir: dir.join("obj"),
            suffix: ".o".into(),
            compile: "cc -c {src} -o {out}".into(),
            archive: "ar -o {lib} {objs}".into(),
            lib: dir.join("lib/liblua.a"),
        })
    }

    #[test]
    fn test_archive_lists_all_outputs() {
        let dir = TempDir::new().unwrap();
        let group = group(dir.path());
        let runner = RecordingRunner::new();
        let vars = BTreeMap::new();
        let invoker = Invoker::new(&runner, &vars, false);

        archive_group(&group, &group.outputs(), &invoker).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("a.c.o"));
        assert!(calls[0].contains("b.c.o"));
        assert!(group.lib.exists());
    }

    #[test]
    fn test_archive_failure() {
        let dir = TempDir::new().unwrap();
        let group = group(dir.path());
        let runner = RecordingRunner::new().fail_on("ar ");
        let vars = BTreeMap::new();
        let invoker = Invoker::new(&runner, &vars, false);

        let err = archive_group(&group, &group.outputs(), &invoker).unwrap_err();
        assert_eq!(
            err,
            StageFailure::Archive {
                group: "lua".into(),
                lib: group.lib.clone(),
            }
        );
    }
}
