//! External process invocation and command templates.

use anyhow::{Context, Result};
use colored::*;
use indicatif::ProgressBar;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

/// Captured result of one external command.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// stdout and stderr joined, for diagnostics analysis.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Runs a rendered command line to completion.
///
/// `Err` means the process could not be started at all; callers treat that the
/// same as a non-zero exit.
pub trait CommandRunner {
    fn run(&self, command: &str) -> Result<ProcessOutput>;
}

/// Runs commands through the platform shell (`sh -c` / `cmd /C`) in the
/// current directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<ProcessOutput> {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };

        let output = cmd
            .output()
            .with_context(|| format!("Failed to spawn shell for '{}'", command))?;

        Ok(ProcessOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs one pass's commands: echoes them when verbose and relays their
/// output verbatim above any active progress bar.
pub struct Invoker<'a> {
    runner: &'a dyn CommandRunner,
    vars: &'a BTreeMap<String, String>,
    verbose: bool,
}

impl<'a> Invoker<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        vars: &'a BTreeMap<String, String>,
        verbose: bool,
    ) -> Self {
        Self {
            runner,
            vars,
            verbose,
        }
    }

    pub fn vars(&self) -> TemplateVars<'a> {
        TemplateVars::new(self.vars)
    }

    /// Run `command`; a spawn error is folded into a failed output.
    pub fn invoke(&self, command: &str, pb: &ProgressBar) -> ProcessOutput {
        if self.verbose {
            pb.suspend(|| println!("   {} {}", "$".dimmed(), command.dimmed()));
        }

        let output = match self.runner.run(command) {
            Ok(output) => output,
            Err(e) => ProcessOutput::failed(format!("{:#}", e)),
        };

        pb.suspend(|| {
            if !output.stdout.is_empty() {
                print!("{}", output.stdout);
            }
            if !output.stderr.is_empty() {
                eprint!("{}", output.stderr);
            }
        });

        output
    }
}

/// Placeholder values for one command.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars<'a> {
    user: Option<&'a BTreeMap<String, String>>,
    builtin: Vec<(&'static str, String)>,
}

impl<'a> TemplateVars<'a> {
    pub fn new(user: &'a BTreeMap<String, String>) -> Self {
        Self {
            user: Some(user),
            builtin: Vec::new(),
        }
    }

    pub fn path(mut self, key: &'static str, path: &Path) -> Self {
        self.builtin.push((key, quote_path(path).into_owned()));
        self
    }

    pub fn paths<P: AsRef<Path>>(mut self, key: &'static str, paths: &[P]) -> Self {
        self.builtin.push((key, join_paths(paths)));
        self
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.builtin
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .or_else(|| self.user.and_then(|u| u.get(key)).map(String::as_str))
    }
}

/// Substitute `{name}` placeholders. Built-ins shadow user variables;
/// unknown placeholders are kept verbatim.
pub fn render(template: &str, vars: &TemplateVars<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder(&after[..close]) => {
                let key = &after[..close];
                match vars.lookup(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_placeholder(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Characters the platform shell would split on or expand.
fn is_shell_special(c: char) -> bool {
    c.is_whitespace() || "\"'`$\\!*?[](){}<>|&;#~%^".contains(c)
}

/// Quote a path so the shell passes it through as one literal word. `sh`
/// gets single quotes with `'` spelled `'\''`; `cmd` gets double quotes.
fn quote_path(path: &Path) -> Cow<'_, str> {
    let s = path.to_string_lossy();
    if !s.chars().any(is_shell_special) {
        return s;
    }
    if cfg!(target_os = "windows") {
        Cow::Owned(format!("\"{}\"", s))
    } else {
        Cow::Owned(format!("'{}'", s.replace('\'', r"'\''")))
    }
}

pub fn join_paths<P: AsRef<Path>>(paths: &[P]) -> String {
    paths
        .iter()
        .map(|p| quote_path(p.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
