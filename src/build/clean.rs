//! Build artifact cleanup.
//!
//! `kiln clean` removes exactly the files a pass can produce: every unit's
//! object, every static library and the linked executable. An output
//! directory is removed afterwards only if nothing else is left in it, so
//! sources or stray files sharing it survive.

use super::group::BuildGroup;
use crate::config::KilnConfig;
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Files `clean` would remove, in removal order.
pub fn artifacts(config: &KilnConfig) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for cfg in &config.groups {
        paths.extend(BuildGroup::from(cfg).outputs());
        paths.push(cfg.lib.clone());
    }
    paths.push(config.link.exe.clone());
    paths
}

fn remove_file(path: &Path) -> Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }
    fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    Ok(true)
}

/// Remove `dir` only when it exists and is empty.
fn remove_empty_dir(dir: &Path) -> bool {
    let empty = fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_none());
    empty && fs::remove_dir(dir).is_ok()
}

pub fn clean(config: &KilnConfig) -> Result<()> {
    let mut removed = 0;
    for path in artifacts(config) {
        if remove_file(&path)? {
            removed += 1;
        }
    }
    for cfg in &config.groups {
        if remove_empty_dir(&cfg.out_dir) {
            println!("{} Removed {}", "🗑️".red(), cfg.out_dir.display());
        }
    }

    if removed > 0 {
        println!("{} Clean complete ({} files).", "✓".green(), removed);
    } else {
        println!("{} Nothing to clean", "!".yellow());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::utils::parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_outputs_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().display().to_string().replace('\\', "/");
        let config = parse_config(&format!(
            r#"
[[group]]
name = "a"
sources = ["{root}/src/x.c"]
out_dir = "{root}/build/a"
compile = "cc -c {{src}} -o {{out}}"
archive = "ar rcs {{lib}} {{objs}}"
lib = "{root}/build/liba.a"

[link]
command = "cc {{libs}} -o {{exe}}"
exe = "{root}/bin/app"
"#
        ))
        .unwrap();

        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("build/a")).unwrap();
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        fs::write(dir.path().join("src/x.c"), "int x;").unwrap();
        fs::write(dir.path().join("build/a/x.c.o"), "").unwrap();
        fs::write(dir.path().join("build/liba.a"), "").unwrap();
        fs::write(dir.path().join("bin/app"), "").unwrap();

        clean(&config).unwrap();

        assert!(!dir.path().join("build/a").exists());
        assert!(!dir.path().join("build/liba.a").exists());
        assert!(!dir.path().join("bin/app").exists());
        assert!(dir.path().join("src/x.c").exists());

        // second run is a no-op
        clean(&config).unwrap();
    }

    #[test]
    fn test_clean_never_touches_sources_sharing_out_dir() {
        let dir = TempDir::new().unwrap();
        let src_dir = dir.path().join("src");
        fs::create_dir_all(&src_dir).unwrap();
        fs::write(src_dir.join("x.c"), "int x;").unwrap();
        fs::write(src_dir.join("x.c.o"), "").unwrap();
        fs::write(src_dir.join("notes.txt"), "keep").unwrap();

        // bypasses manifest validation, which rejects this layout
        let config: KilnConfig = toml::from_str(&format!(
            r#"
[[group]]
name = "a"
sources = ["{src}/x.c"]
out_dir = "{src}"
compile = "cc -c {{src}} -o {{out}}"
archive = "ar rcs {{lib}} {{objs}}"
lib = "{src}/liba.a"

[link]
command = "cc {{libs}} -o {{exe}}"
exe = "{src}/app"
"#,
            src = src_dir.display().to_string().replace('\\', "/")
        ))
        .unwrap();

        clean(&config).unwrap();

        assert!(src_dir.join("x.c").exists());
        assert!(src_dir.join("notes.txt").exists());
        assert!(!src_dir.join("x.c.o").exists());
    }

    #[test]
    fn test_out_dir_with_foreign_files_is_kept() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().display().to_string().replace('\\', "/");
        let config = parse_config(&format!(
            r#"
[[group]]
name = "a"
sources = ["{root}/a.c"]
out_dir = "{root}/obj"
compile = "cc -c {{src}} -o {{out}}"
archive = "ar rcs {{lib}} {{objs}}"
lib = "{root}/liba.a"

[link]
command = "cc {{libs}} -o {{exe}}"
exe = "{root}/app"
"#
        ))
        .unwrap();

        let out = dir.path().join("obj");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("a.c.o"), "").unwrap();
        fs::write(out.join("README"), "hand-written").unwrap();

        clean(&config).unwrap();

        assert!(!out.join("a.c.o").exists());
        assert!(out.join("README").exists());
    }
}
