//! `kiln status`: what the next pass would do, without running anything.

use crate::build::{BuildGroup, is_up_to_date, needs_refresh};
use crate::config::KilnConfig;
use crate::ui::Table;
use anyhow::Result;
use colored::*;
use std::path::PathBuf;

/// Planned work for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    pub name: String,
    pub units: usize,
    pub stale: Vec<PathBuf>,
    /// The library exists but is older than some member output; a pass only
    /// re-archives it once one of its units is recompiled.
    pub lib_behind: bool,
}

impl GroupPlan {
    pub fn dirty(&self) -> bool {
        !self.stale.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub groups: Vec<GroupPlan>,
    pub exe_behind: bool,
}

impl Plan {
    pub fn will_link(&self) -> bool {
        self.groups.iter().any(GroupPlan::dirty)
    }
}

pub fn plan(config: &KilnConfig) -> Plan {
    let groups: Vec<GroupPlan> = config
        .groups
        .iter()
        .map(|cfg| {
            let group = BuildGroup::from(cfg);
            let outputs = group.outputs();
            GroupPlan {
                name: group.name.clone(),
                units: group.units.len(),
                stale: group
                    .units
                    .iter()
                    .zip(&outputs)
                    .filter(|(unit, out)| !is_up_to_date(&unit.path, out))
                    .map(|(unit, _)| unit.path.clone())
                    .collect(),
                lib_behind: group.lib.exists() && needs_refresh(&group.lib, &outputs),
            }
        })
        .collect();

    let libs: Vec<PathBuf> = config.groups.iter().map(|g| g.lib.clone()).collect();
    Plan {
        groups,
        exe_behind: needs_refresh(&config.link.exe, &libs),
    }
}

pub fn print_status(config: &KilnConfig, verbose: bool) -> Result<()> {
    let plan = plan(config);

    let mut table = Table::new(&["Group", "Units", "Stale", "Library"]);
    for (group, cfg) in plan.groups.iter().zip(&config.groups) {
        let stale = if group.dirty() {
            group.stale.len().to_string().yellow().to_string()
        } else {
            "0".green().to_string()
        };
        let lib = if group.dirty() {
            "rebuild".yellow().to_string()
        } else if !cfg.lib.exists() {
            "missing".red().to_string()
        } else if group.lib_behind {
            "behind".red().to_string()
        } else {
            "fresh".green().to_string()
        };
        table.add_row(vec![group.name.clone(), group.units.to_string(), stale, lib]);
    }
    table.print();

    if verbose {
        for group in plan.groups.iter().filter(|g| g.dirty()) {
            for path in &group.stale {
                println!("   {} [{}] {}", "~".yellow(), group.name, path.display());
            }
        }
    }

    if plan.will_link() {
        println!("{} Next pass links {}", "🔗".cyan(), config.link.exe.display());
    } else if plan.exe_behind {
        println!(
            "{} {} is missing or older than its libraries; touch a source to rebuild it",
            "!".yellow(),
            config.link.exe.display()
        );
    } else {
        println!("{} Up to date", "⚡".green());
    }
    Ok(())
}
