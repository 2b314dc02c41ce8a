use super::group::{BuildGroup, output_path_for};
use crate::config::{KilnConfig, MANIFEST_FILE};
use anyhow::{Context, Result, bail};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};

// --- Helper: Load and validate the manifest ---
pub fn load_config(path: &Path) -> Result<KilnConfig> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "{} not found.\n\n\
            💡 Tip: create a {} with at least one [[group]] and a [link] section.",
            path.display(),
            MANIFEST_FILE
        ));
    }
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} - check file permissions", path.display()))?;
    parse_config(&config_str).with_context(|| format!("Invalid manifest {}", path.display()))
}

pub fn parse_config(src: &str) -> Result<KilnConfig> {
    let mut config: KilnConfig = toml::from_str(src)
        .context("Failed to parse manifest - check for syntax errors (missing quotes, brackets)")?;

    for ext in &mut config.watch.extensions {
        *ext = ext.trim_start_matches('.').to_lowercase();
    }

    validate_config(&config)?;
    Ok(config)
}

/// Lexical form used for overlap checks: `.` components dropped, nothing
/// resolved on disk.
fn normalized(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn validate_config(config: &KilnConfig) -> Result<()> {
    if config.groups.is_empty() {
        bail!("no [[group]] declared");
    }
    if config.watch.debounce_ms == 0 {
        bail!("[watch] debounce_ms must be greater than zero");
    }

    let mut names = HashSet::new();
    for cfg in &config.groups {
        if !names.insert(cfg.name.as_str()) {
            bail!("group '{}' is declared twice", cfg.name);
        }
        if cfg.sources.is_empty() {
            bail!("group '{}' has no sources", cfg.name);
        }
    }

    let sources: Vec<PathBuf> = config
        .groups
        .iter()
        .flat_map(|g| g.sources.iter().map(|s| normalized(s)))
        .collect();
    let watch_root = normalized(&config.watch.root);

    // Every derived artifact has exactly one producer.
    let mut produced: HashMap<PathBuf, String> = HashMap::new();
    for cfg in &config.groups {
        let out_dir = normalized(&cfg.out_dir);
        if out_dir == watch_root {
            bail!(
                "group '{}': out_dir {} is the watched root; objects need their own directory",
                cfg.name,
                cfg.out_dir.display()
            );
        }
        if let Some(src) = sources.iter().find(|s| s.starts_with(&out_dir)) {
            bail!(
                "group '{}': out_dir {} contains the source {}; `kiln clean` would remove it",
                cfg.name,
                cfg.out_dir.display(),
                src.display()
            );
        }

        let group = BuildGroup::from(cfg);
        for unit in &group.units {
            let out = output_path_for(unit, &group);
            let owner = format!("group '{}' source {}", cfg.name, unit.path.display());
            if let Some(previous) = produced.insert(normalized(&out), owner) {
                bail!(
                    "group '{}': {} maps to {} which another source already produces ({})",
                    cfg.name,
                    unit.path.display(),
                    out.display(),
                    previous
                );
            }
        }
        if let Some(previous) =
            produced.insert(normalized(&cfg.lib), format!("group '{}' library", cfg.name))
        {
            bail!(
                "group '{}': library {} is already produced by {}",
                cfg.name,
                cfg.lib.display(),
                previous
            );
        }
    }
    if let Some(previous) = produced.insert(normalized(&config.link.exe), "the link".into()) {
        bail!(
            "[link] exe {} is already produced by {}",
            config.link.exe.display(),
            previous
        );
    }

    if let Some(src) = sources.iter().find(|s| produced.contains_key(*s)) {
        bail!("source {} is also a build artifact", src.display());
    }
    Ok(())
}
