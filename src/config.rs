use crate::errors::Result;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Directory the tool was written for, relative to the repository root.
pub const DEFAULT_DIR: &str = "frontend/src/services/api";
/// Only TypeScript sources are patched by default.
pub const DEFAULT_GLOB: &str = "*.ts";
/// Path substrings that keep a file out of the run.
pub const DEFAULT_EXCLUDE: &[&str] = &["client", "index", ".backup"];

/// Directory name under the user config dir searched for config files.
const CONFIG_DIR_NAME: &str = "response-fix";

/// Run configuration as read from a YAML file. Every key is optional.
///
/// ```yaml
/// dir: frontend/src/services/api
/// glob: "*.ts"
/// exclude: [client, index, .backup]
/// recursive: false
/// ```
#[derive(Deserialize, Default, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct PatchConfig {
    /// The directory to patch.
    pub dir: Option<PathBuf>,
    /// File name glob selecting candidate files.
    pub glob: Option<String>,
    /// Substrings that exclude a path when any of them occurs in it.
    pub exclude: Option<Vec<String>>,
    /// Descend into subdirectories.
    pub recursive: Option<bool>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub dir: PathBuf,
    pub glob: String,
    pub exclude: Vec<String>,
    pub recursive: bool,
    pub dry_run: bool,
    pub backup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_DIR),
            glob: DEFAULT_GLOB.to_string(),
            exclude: DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
            recursive: false,
            dry_run: false,
            backup: false,
        }
    }
}

impl Settings {
    /// Layers a config file over the built-in defaults.
    pub fn from_config(config: PatchConfig) -> Self {
        let defaults = Self::default();
        Self {
            dir: config.dir.unwrap_or(defaults.dir),
            glob: config.glob.unwrap_or(defaults.glob),
            exclude: config.exclude.unwrap_or(defaults.exclude),
            recursive: config.recursive.unwrap_or(defaults.recursive),
            ..defaults
        }
    }
}

/// A utility for locating and loading run configuration files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds the configuration file by searching in a prioritized list of locations.
    ///
    /// The search order is:
    /// 1. `config_path` itself (absolute, or relative to the current directory).
    /// 2. A path relative to `working_dir`.
    /// 3. Inside the user config directory, e.g. `~/.config/response-fix/`.
    pub fn find_config(config_path: &Path, working_dir: &Path) -> Result<PathBuf> {
        if config_path.exists() {
            return Ok(config_path.to_path_buf());
        }

        let mut tried_locations = vec![config_path.display().to_string()];

        if config_path.is_relative() {
            let in_working_dir = working_dir.join(config_path);
            if in_working_dir.exists() {
                return Ok(in_working_dir);
            }
            tried_locations.push(in_working_dir.display().to_string());

            if let Some(config_dir) = dirs::config_dir() {
                let user_config = config_dir.join(CONFIG_DIR_NAME).join(config_path);
                if user_config.exists() {
                    return Ok(user_config);
                }
                tried_locations.push(user_config.display().to_string());
            }
        }

        Err(format!(
            "Config file '{}' not found. Searched in:\n  - {}",
            config_path.display(),
            tried_locations.join("\n  - ")
        )
        .into())
    }

    /// Loads a `PatchConfig` from a YAML file.
    pub fn load(path: &Path) -> Result<PatchConfig> {
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }
}
