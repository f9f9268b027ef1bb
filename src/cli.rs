use crate::config::{ConfigLoader, DEFAULT_DIR, Settings};
use crate::errors::Result;
use crate::report::OutputFormat;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Rewrites `response.data.data` accesses into a fallback to `response.data`.
///
/// Run with no arguments to patch `frontend/src/services/api/*.ts` in place.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "✓ Normalize response.data.data accesses in API service files",
    long_about = "response-fix - rewrites response.data.data accesses into a null-safe fallback.

Three rewrites run in order over every matching file:
  response.data.data.X          -> (response?.data?.data || response?.data)?.X
  return response.data.data;    -> return response?.data?.data || response?.data;
  : response.data.data,  / }    -> : (response?.data?.data || response?.data),  / }

Files whose path contains an exclusion term (default: client, index, .backup)
are never touched. Files are rewritten in place only when their content changes.

QUICK EXAMPLES:
  response-fix                                # Patch frontend/src/services/api/*.ts
  response-fix --dry-run                      # Preview which files would change
  response-fix -d src/api -g '*.tsx' -r       # Another directory, recursively
  response-fix --backup                       # Keep originals in .backup-response-fix-*/
  response-fix -f json | jq '.files[].name'   # Machine-readable report"
)]
pub struct Args {
    /// The directory to patch.
    #[arg(short, long, env = "RESPONSE_FIX_DIR")]
    pub dir: Option<PathBuf>,

    /// File name glob selecting candidate files (default: *.ts).
    #[arg(short, long)]
    pub glob: Option<String>,

    /// Comma-separated path substrings to skip. Replaces the default list.
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Descend into subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    /// Path to a YAML file with dir, glob, exclude and recursive settings.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report which files would change without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Copy originals into a timestamped backup directory before rewriting.
    #[arg(long)]
    pub backup: bool,

    /// The output format for the run report.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log skipped and unchanged files to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Resolves the run settings: flags override the config file, which overrides defaults.
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                let working_dir = self
                    .dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR));
                let resolved = ConfigLoader::find_config(path, &working_dir)?;
                info!(config = %resolved.display(), "using config file");
                Settings::from_config(ConfigLoader::load(&resolved)?)
            }
            None => Settings::default(),
        };

        if let Some(dir) = &self.dir {
            settings.dir = dir.clone();
        }
        if let Some(glob) = &self.glob {
            settings.glob = glob.clone();
        }
        if let Some(exclude) = &self.exclude {
            settings.exclude = exclude.clone();
        }
        settings.recursive |= self.recursive;
        settings.dry_run = self.dry_run;
        settings.backup = self.backup;

        Ok(settings)
    }
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}
