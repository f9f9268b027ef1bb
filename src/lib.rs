//! `response-fix` rewrites `response.data.data` accesses in API service files
//! into a null-safe fallback to `response.data`.
//!
//! It provides the logic for the `response-fix` command-line tool, and the
//! pieces can be used on their own:
//!
//! - `rules`: the ordered regex substitutions, applied to text.
//! - `patcher`: file enumeration, exclusion, in-place rewriting and backups.
//! - `report`: text and JSON rendering of a run.
//! - `config`: defaults and YAML configuration loading.

pub mod cli;
pub mod config;
pub mod errors;
pub mod patcher;
pub mod report;
pub mod rules;

// Re-export main types for easier access by library users.
pub use config::Settings;
pub use errors::{Error, Result};
pub use patcher::{Patcher, RunSummary, run_patch};
pub use report::{OutputFormat, Reporter};
pub use rules::RuleSet;
