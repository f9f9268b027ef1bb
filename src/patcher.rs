use crate::config::Settings;
use crate::errors::{Error, Result};
use crate::rules::RuleSet;
use chrono::Local;
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Prefix of the per-run backup directory created inside the target directory.
pub const BACKUP_DIR_PREFIX: &str = ".backup-response-fix-";

/// Applies a [`RuleSet`] to files on disk.
pub struct Patcher {
    rules: RuleSet,
}

/// Options for processing a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// If `true`, changes are detected but nothing is written to disk.
    pub dry_run: bool,
}

/// The result of processing a single file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Number of rule matches in the file.
    pub changes: usize,
    /// `true` if the rewritten content differs from what was read.
    pub modified: bool,
}

impl FileOutcome {
    /// The file's base name, used in console output.
    pub fn name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| self.path.to_string_lossy())
    }
}

/// Totals for one run over a directory.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub dir: PathBuf,
    pub dry_run: bool,
    /// Files that passed the exclusion check and were read.
    pub scanned: usize,
    /// Files matching the glob that were skipped by an exclusion term.
    pub excluded: usize,
    /// Modified files, in processing order.
    pub modified: Vec<FileOutcome>,
    /// Where originals were copied, if a backup was taken.
    pub backup_dir: Option<PathBuf>,
}

/// Copies originals into a timestamped directory before they are overwritten.
///
/// The directory is only created when the first file is saved, so runs that
/// change nothing leave no trace.
pub struct Backup {
    root: PathBuf,
    location: PathBuf,
    created: bool,
}

impl Backup {
    /// Prepares a backup location under `root`, named after the current local time.
    pub fn new(root: &Path) -> Self {
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        Self {
            root: root.to_path_buf(),
            location: root.join(format!("{BACKUP_DIR_PREFIX}{stamp}")),
            created: false,
        }
    }

    /// The backup directory, whether or not it has been created yet.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Copies `path` into the backup, keeping its position relative to the root.
    pub fn save(&mut self, path: &Path) -> Result<PathBuf> {
        let relative = match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => path
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| format!("Cannot back up {}: no file name", path.display()))?,
        };
        let target = self.location.join(relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
        }
        if !self.created {
            info!(backup = %self.location.display(), "created backup directory");
            self.created = true;
        }
        fs::copy(path, &target).map_err(|e| Error::file(path, e))?;
        Ok(target)
    }
}

impl Patcher {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Rewrites a single file.
    ///
    /// The file is read as UTF-8 and passed through every rule. When the result
    /// differs and this is not a dry run, the original is copied into `backup`
    /// (if given) and the new content replaces the file atomically.
    pub fn process_file(
        &self,
        path: &Path,
        options: ProcessOptions,
        backup: Option<&mut Backup>,
    ) -> Result<FileOutcome> {
        let content = fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
        let rewrite = self.rules.apply(&content);
        let modified = rewrite.is_modified();

        if modified && !options.dry_run {
            if let Some(backup) = backup {
                backup.save(path)?;
            }
            write_atomic(path, &rewrite.content)?;
        }

        Ok(FileOutcome {
            path: path.to_path_buf(),
            changes: rewrite.changes,
            modified,
        })
    }
}

/// Replaces the file behind `path` with `content` through a temporary file.
///
/// Symlinks are resolved first so the link stays a link and its target is
/// rewritten; the temporary file lives next to that target.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let target = fs::canonicalize(path).map_err(|e| Error::file(path, e))?;
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| Error::file(path, e))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| Error::file(path, e))?;

    // Preserve file permissions
    let perms = fs::metadata(&target)
        .map_err(|e| Error::file(path, e))?
        .permissions();
    fs::set_permissions(temp_file.path(), perms).map_err(|e| Error::file(path, e))?;

    temp_file.persist(&target)?;
    Ok(())
}

/// Lists the files under `dir` whose names match `glob`, sorted by name.
///
/// Without `recursive` only direct children are considered. Hidden entries are
/// skipped, as a shell glob would, and ignore files are not consulted. Symlinks
/// are listed when they point at a regular file; a dangling link is an error.
pub fn collect_files(dir: &Path, glob: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::file(
            dir,
            io::Error::new(io::ErrorKind::NotFound, "directory not found"),
        ));
    }

    let mut overrides = OverrideBuilder::new(dir);
    overrides.add(glob)?;

    let mut walker = WalkBuilder::new(dir);
    walker
        .standard_filters(false)
        .hidden(true)
        .overrides(overrides.build()?)
        .sort_by_file_name(|a, b| a.cmp(b));
    if !recursive {
        walker.max_depth(Some(1));
    }

    let mut files = Vec::new();
    for entry in walker.build() {
        let entry = entry?;
        let is_file = match entry.file_type() {
            Some(ft) if ft.is_symlink() => fs::metadata(entry.path())
                .map_err(|e| Error::file(entry.path(), e))?
                .is_file(),
            Some(ft) => ft.is_file(),
            None => false,
        };
        if is_file {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// `true` if any non-empty term occurs anywhere in the path's string form.
///
/// This is plain substring containment, not component matching: `index`
/// excludes `reindex.ts` as well as `index.ts`.
pub fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    let path_str = path.to_string_lossy();
    exclude
        .iter()
        .filter(|term| !term.is_empty())
        .any(|term| path_str.contains(term.as_str()))
}

/// The main entry point for a patch run.
///
/// Files are processed one at a time in name order. `on_modified` is called for
/// each modified file as soon as it has been written, so progress is visible
/// even if a later file aborts the run. The first error stops the run; files
/// already written stay written.
pub fn run_patch<F>(settings: &Settings, mut on_modified: F) -> Result<RunSummary>
where
    F: FnMut(&FileOutcome) -> Result<()>,
{
    let rules = RuleSet::response_fallback()?;
    debug!(rules = ?rules.names(), "loaded rule set");
    let patcher = Patcher::new(rules);
    let files = collect_files(&settings.dir, &settings.glob, settings.recursive)?;
    if files.is_empty() {
        warn!(
            dir = %settings.dir.display(),
            glob = %settings.glob,
            "no files matched"
        );
    }

    let options = ProcessOptions {
        dry_run: settings.dry_run,
    };
    let mut backup = (settings.backup && !settings.dry_run).then(|| Backup::new(&settings.dir));

    let mut summary = RunSummary {
        dir: settings.dir.clone(),
        dry_run: settings.dry_run,
        scanned: 0,
        excluded: 0,
        modified: Vec::new(),
        backup_dir: None,
    };

    for path in files {
        if is_excluded(&path, &settings.exclude) {
            debug!(file = %path.display(), "excluded");
            summary.excluded += 1;
            continue;
        }

        summary.scanned += 1;
        let outcome = patcher.process_file(&path, options, backup.as_mut())?;
        if outcome.modified {
            on_modified(&outcome)?;
            summary.modified.push(outcome);
        } else {
            debug!(file = %path.display(), "unchanged");
        }
    }

    summary.backup_dir = backup
        .filter(|b| b.created)
        .map(|b| b.location().to_path_buf());

    Ok(summary)
}
