//! Manifest (`kiln.toml`) model.
//!
//! The manifest is the static configuration surface of the orchestrator. It is
//! parsed once at startup and never reloaded while the watch loop runs.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const MANIFEST_FILE: &str = "kiln.toml";

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct KilnConfig {
    /// User template variables, referenced as `{name}` in any command.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    #[serde(default)]
    pub watch: WatchConfig,
    /// Build groups in declared (build) order.
    #[serde(rename = "group", default)]
    pub groups: Vec<GroupConfig>,
    pub link: LinkConfig,
    pub package: Option<PackageConfig>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Latch events seen mid-build and run one more pass afterwards.
    #[serde(default)]
    pub rerun_on_change: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extensions: default_extensions(),
            debounce_ms: default_debounce_ms(),
            rerun_on_change: false,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    pub name: String,
    pub sources: Vec<PathBuf>,
    pub out_dir: PathBuf,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Compile template; `{src}` and `{out}` are provided.
    pub compile: String,
    /// Archive template; `{lib}` and `{objs}` are provided.
    pub archive: String,
    /// Aggregate artifact (static library) path.
    pub lib: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct LinkConfig {
    /// Link template; `{libs}`, `{objects}` and `{exe}` are provided.
    pub command: String,
    pub exe: PathBuf,
    /// Fixed auxiliary objects passed to every link.
    #[serde(default)]
    pub objects: Vec<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Packaging template; `{exe}` and `{files}` are provided.
    pub command: String,
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extensions() -> Vec<String> {
    ["c", "cpp", "cc", "h"].iter().map(|s| s.to_string()).collect()
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_suffix() -> String {
    ".o".to_string()
}
