use crate::errors::Result;
use crate::patcher::{FileOutcome, RunSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Output formats for run results.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One marker line per modified file, then a total.
    #[default]
    Text,
    /// A single JSON document written after the run.
    Json,
}

/// Renders run progress and the final summary.
pub struct Reporter {
    format: OutputFormat,
    tool_name: String,
    tool_version: String,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Writes the progress line for a modified file. JSON output has none.
    pub fn write_file_line<W: Write>(
        &self,
        writer: &mut W,
        outcome: &FileOutcome,
        dry_run: bool,
    ) -> Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(writer, "{}", format_file_line(outcome, dry_run))?;
        }
        Ok(())
    }

    /// Writes the end-of-run summary.
    pub fn write_summary<W: Write>(&self, writer: &mut W, summary: &RunSummary) -> Result<()> {
        let output = match self.format {
            OutputFormat::Text => self.format_text_summary(summary),
            OutputFormat::Json => self.format_json(summary)?,
        };
        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    fn format_text_summary(&self, summary: &RunSummary) -> String {
        let mut output = String::new();
        if let Some(backup) = &summary.backup_dir {
            output.push_str(&format!("\nOriginals saved to {}\n", backup.display()));
        }
        if summary.dry_run {
            output.push_str(&format!(
                "\n~ Total files that would be fixed: {}\n",
                summary.modified.len()
            ));
        } else {
            output.push_str(&format!(
                "\n✓ Total files fixed: {}\n",
                summary.modified.len()
            ));
        }
        output
    }

    fn format_json(&self, summary: &RunSummary) -> Result<String> {
        #[derive(Serialize)]
        struct JsonOutput {
            tool: ToolInfo,
            run_time: DateTime<Utc>,
            dir: String,
            dry_run: bool,
            backup_dir: Option<String>,
            files_scanned: usize,
            files_excluded: usize,
            total_modified: usize,
            files: Vec<JsonFile>,
        }

        #[derive(Serialize)]
        struct ToolInfo {
            name: String,
            version: String,
        }

        #[derive(Serialize)]
        struct JsonFile {
            path: String,
            name: String,
            changes: usize,
        }

        let files: Vec<JsonFile> = summary
            .modified
            .iter()
            .map(|f| JsonFile {
                path: f.path.display().to_string(),
                name: f.name().into_owned(),
                changes: f.changes,
            })
            .collect();

        let output = JsonOutput {
            tool: ToolInfo {
                name: self.tool_name.clone(),
                version: self.tool_version.clone(),
            },
            run_time: Utc::now(),
            dir: summary.dir.display().to_string(),
            dry_run: summary.dry_run,
            backup_dir: summary.backup_dir.as_ref().map(|p| p.display().to_string()),
            files_scanned: summary.scanned,
            files_excluded: summary.excluded,
            total_modified: summary.modified.len(),
            files,
        };

        let mut json = serde_json::to_string_pretty(&output)?;
        json.push('\n');
        Ok(json)
    }
}

/// The console line announcing a modified file.
pub fn format_file_line(outcome: &FileOutcome, dry_run: bool) -> String {
    if dry_run {
        format!("~ Would fix: {}", outcome.name())
    } else {
        format!("✓ Fixed: {}", outcome.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn create_test_summary(dry_run: bool) -> RunSummary {
        RunSummary {
            dir: PathBuf::from("frontend/src/services/api"),
            dry_run,
            scanned: 3,
            excluded: 1,
            modified: vec![FileOutcome {
                path: PathBuf::from("frontend/src/services/api/logs.ts"),
                changes: 8,
                modified: true,
            }],
            backup_dir: None,
        }
    }

    #[test]
    fn test_file_line_uses_base_name() {
        let summary = create_test_summary(false);
        assert_eq!(format_file_line(&summary.modified[0], false), "✓ Fixed: logs.ts");
        assert_eq!(format_file_line(&summary.modified[0], true), "~ Would fix: logs.ts");
    }

    #[test]
    fn test_text_output() {
        let reporter = Reporter::new(OutputFormat::Text);
        let summary = create_test_summary(false);

        let mut out = Vec::new();
        reporter
            .write_file_line(&mut out, &summary.modified[0], false)
            .unwrap();
        reporter.write_summary(&mut out, &summary).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "✓ Fixed: logs.ts\n\n✓ Total files fixed: 1\n");
    }

    #[test]
    fn test_text_output_dry_run_with_backup() {
        let reporter = Reporter::new(OutputFormat::Text);
        let mut summary = create_test_summary(true);
        summary.backup_dir = Some(PathBuf::from("api/.backup-response-fix-20250101-000000"));

        let text = reporter.format_text_summary(&summary);
        assert!(text.contains("Originals saved to api/.backup-response-fix-20250101-000000"));
        assert!(text.ends_with("~ Total files that would be fixed: 1\n"));
    }

    #[test]
    fn test_json_format() {
        let reporter = Reporter::new(OutputFormat::Json);
        let summary = create_test_summary(false);

        let mut out = Vec::new();
        reporter
            .write_file_line(&mut out, &summary.modified[0], false)
            .unwrap();
        assert!(out.is_empty());

        let output = reporter.format_json(&summary).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["tool"]["name"], "response-fix");
        assert_eq!(parsed["total_modified"], 1);
        assert_eq!(parsed["files_scanned"], 3);
        assert_eq!(parsed["files"][0]["name"], "logs.ts");
        assert_eq!(parsed["files"][0]["changes"], 8);
        assert!(parsed["backup_dir"].is_null());
    }
}
