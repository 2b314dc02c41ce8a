use super::failure::StageFailure;
use super::feedback::FeedbackAnalyzer;
use super::process::{Invoker, render};
use crate::config::{LinkConfig, PackageConfig};
use colored::*;
use indicatif::ProgressBar;
use std::fs;
use std::path::PathBuf;

pub fn link_command(link: &LinkConfig, aggregates: &[PathBuf], invoker: &Invoker<'_>) -> String {
    let vars = invoker
        .vars()
        .paths("libs", aggregates)
        .paths("objects", &link.objects)
        .path("exe", &link.exe);
    render(&link.command, &vars)
}

/// Combine every group's static library and the fixed objects into the
/// executable.
pub fn link_executable(
    link: &LinkConfig,
    aggregates: &[PathBuf],
    invoker: &Invoker<'_>,
) -> Result<(), StageFailure> {
    let failure = || StageFailure::Link {
        exe: link.exe.clone(),
    };

    if let Some(parent) = link.exe.parent().filter(|p| !p.as_os_str().is_empty())
        && let Err(e) = fs::create_dir_all(parent)
    {
        println!("{} Cannot create {}: {}", "x".red(), parent.display(), e);
        return Err(failure());
    }

    println!("   {} Linking {}", "🔗".cyan(), link.exe.display());
    let output = invoker.invoke(
        &link_command(link, aggregates, invoker),
        &ProgressBar::hidden(),
    );
    if !output.success {
        if let Some(hint) = FeedbackAnalyzer::analyze(&output.combined()) {
            println!("{} {}", "💡".yellow(), hint);
        }
        println!("{} Linking failed", "x".red());
        return Err(failure());
    }
    Ok(())
}

pub fn package_command(
    package: &PackageConfig,
    link: &LinkConfig,
    invoker: &Invoker<'_>,
) -> String {
    let vars = invoker
        .vars()
        .path("exe", &link.exe)
        .paths("files", &package.files);
    render(&package.command, &vars)
}

/// Bundle the freshly linked executable with its resource files. A failure
/// leaves the executable in place.
pub fn package_executable(
    package: &PackageConfig,
    link: &LinkConfig,
    invoker: &Invoker<'_>,
) -> Result<(), StageFailure> {
    println!("   {} Packaging {}", "📦".blue(), link.exe.display());
    let output = invoker.invoke(
        &package_command(package, link, invoker),
        &ProgressBar::hidden(),
    );
    if !output.success {
        println!("{} Packaging failed", "x".red());
        return Err(StageFailure::Package {
            exe: link.exe.clone(),
        });
    }
    Ok(())
}
