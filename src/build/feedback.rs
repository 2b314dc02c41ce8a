use colored::*;
use regex::Regex;
use std::sync::OnceLock;

pub struct FeedbackAnalyzer;

fn missing_header_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:fatal error: |(?i:cannot open include file): ')([^\s:']+)").ok()
    })
    .as_ref()
}

/// gcc reports a missing translation unit with the same wording as a
/// missing header.
fn is_source_name(name: &str) -> bool {
    let ext = name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    name.contains('.') && matches!(ext.as_str(), "c" | "cc" | "cpp" | "cxx" | "m" | "mm" | "s")
}

impl FeedbackAnalyzer {
    /// Turn raw tool diagnostics into a short hint for the operator.
    pub fn analyze(output: &str) -> Option<String> {
        // 1. Tool not installed (shell could not find the command)
        if output.contains("command not found")
            || output.contains("is not recognized as an internal or external command")
            || output.contains("Failed to spawn shell")
        {
            return Some(format!(
                "The {} could not be started.\nCheck that the compiler, archiver and linker named in {} are on your PATH.",
                "toolchain".bold().red(),
                "kiln.toml".bold().yellow()
            ));
        }

        // 2. Entry point missing
        if output.contains("undefined reference to `main'")
            || output.contains("entry point must be defined")
        {
            return Some(format!(
                "The link is missing a {} function.\nCheck the {} list and the fixed {} in [link].",
                "main()".bold().yellow(),
                "[[group]] sources".bold().green(),
                "objects".bold().green()
            ));
        }

        // 3. Generic unresolved symbol
        if output.contains("LNK2019") || output.contains("undefined reference to") {
            return Some(format!(
                "It looks like a {} error.\nA library may be missing from the link command, or listed in the wrong order.\nGNU ld resolves archives left to right; wrap them in {} if they depend on each other.",
                "Linker".bold().red(),
                "-Wl,--start-group ... -Wl,--end-group".bold().green()
            ));
        }

        // 4. Missing header; a plain missing file (e.g. a deleted source) is not one
        let lowered = output.to_lowercase();
        let include_context = output.contains("fatal error") || output.contains("#include");
        if include_context && output.contains("No such file or directory")
            || lowered.contains("cannot open include file")
        {
            if let Some(caps) = missing_header_re().and_then(|re| re.captures(output)) {
                if is_source_name(&caps[1]) {
                    return Some(format!(
                        "{} {} does not exist.\nCheck the group's {} list in {}.",
                        "Source".bold().red(),
                        caps[1].bold().yellow(),
                        "sources".bold().green(),
                        "kiln.toml".bold().yellow()
                    ));
                }
                return Some(format!(
                    "{} {} was not found.\nAdd its directory with {} to the group's compile command.",
                    "Missing Header".bold().red(),
                    caps[1].bold().yellow(),
                    "-I<dir>".bold().green()
                ));
            }
            return Some(format!(
                "It looks like a {} error.\nCheck the include paths in the group's compile command.",
                "Missing Header".bold().red()
            ));
        }

        None
    }
}
