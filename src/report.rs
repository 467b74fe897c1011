use crate::error::Result;
use crate::summary::{FileOutcome, ProgressEvent, RunResult};
use crate::utils::format_file_size;
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

/// Owned copy of a [`ProgressEvent`], kept for the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressLine {
    pub current: usize,
    pub total: usize,
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl From<ProgressEvent<'_>> for ProgressLine {
    fn from(event: ProgressEvent<'_>) -> Self {
        Self {
            current: event.current,
            total: event.total,
            path: event.path.to_path_buf(),
            outcome: event.outcome,
        }
    }
}

impl ProgressLine {
    pub fn render(&self) -> String {
        let verb = match self.outcome {
            FileOutcome::Compressed => "compressed",
            FileOutcome::Failed => "failed",
        };
        format!(
            "[{}/{}] {}: {}",
            self.current,
            self.total,
            verb,
            self.path.display()
        )
    }
}

/// Everything the CLI prints after a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Files handed to the driver, attempted or not.
    pub total: usize,
    #[serde(flatten)]
    pub result: RunResult,
    pub progress: Vec<ProgressLine>,
}

impl RunReport {
    pub fn new(total: usize, result: RunResult, progress: Vec<ProgressLine>) -> Self {
        Self {
            total,
            result,
            progress,
        }
    }

    pub fn render_text(&self) -> String {
        let result = &self.result;
        let mut text = format!(
            "Processed {} image(s), compressed {}.",
            self.total, result.compressed
        );

        if result.compressed > 0 {
            let _ = write!(
                text,
                "\nSize: {} -> {} ({:.1}% smaller)",
                format_file_size(result.original_bytes),
                format_file_size(result.compressed_bytes),
                result.compression_ratio()
            );
        }
        if !result.failed.is_empty() {
            let failed: Vec<String> = result
                .failed
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            let _ = write!(
                text,
                "\nFailed {}: {}",
                result.failed.len(),
                failed.join(", ")
            );
        }
        for error in &result.errors {
            let _ = write!(text, "\n{}", error);
        }
        if !self.progress.is_empty() {
            text.push('\n');
            for line in &self.progress {
                let _ = write!(text, "\n{}", line.render());
            }
        }

        text
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
