use crate::utils::calculate_compression_ratio;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of a single attempted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutcome {
    Compressed,
    Failed,
}

/// Per-file notification, emitted once for every attempted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent<'a> {
    /// 1-based position in the input list.
    pub current: usize,
    pub total: usize,
    pub path: &'a Path,
    pub outcome: FileOutcome,
}

/// Aggregate outcome of one compression run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub compressed: usize,
    pub failed: Vec<PathBuf>,
    pub errors: Vec<String>,
    /// Total size of the compressed files before and after, in bytes.
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl RunResult {
    /// `true` when nothing failed and the run was not cut short.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.errors.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.compressed + self.failed.len()
    }

    pub fn compression_ratio(&self) -> f64 {
        calculate_compression_ratio(self.original_bytes, self.compressed_bytes)
    }
}

/// Accumulates counts and diagnostics while the driver runs.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    result: RunResult,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, original_size: u64, compressed_size: u64) {
        self.result.compressed += 1;
        self.result.original_bytes += original_size;
        self.result.compressed_bytes += compressed_size;
    }

    pub fn record_failure(&mut self, path: &Path, reason: impl std::fmt::Display) {
        self.result.failed.push(path.to_path_buf());
        self.result
            .errors
            .push(format!("{}: {}", path.display(), reason));
    }

    /// Records a diagnostic that is not tied to a single file.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.result.errors.push(message.into());
    }

    pub fn compressed(&self) -> usize {
        self.result.compressed
    }

    pub fn finish(self) -> RunResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregator_counts() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record_success(1000, 400);
        aggregator.record_success(1000, 600);
        aggregator.record_failure(Path::new("img/a.png"), "timed out");
        aggregator.record_error("quota reached");

        assert_eq!(aggregator.compressed(), 2);
        let result = aggregator.finish();
        assert_eq!(result.compressed, 2);
        assert_eq!(result.failed, vec![PathBuf::from("img/a.png")]);
        assert_eq!(
            result.errors,
            vec!["img/a.png: timed out".to_string(), "quota reached".to_string()]
        );
        assert_eq!(result.attempted(), 3);
        assert_eq!(result.original_bytes, 2000);
        assert_eq!(result.compressed_bytes, 1000);
        assert_eq!(result.compression_ratio(), 50.0);
        assert!(!result.is_clean());
    }

    #[test]
    fn test_empty_result_is_clean() {
        let result = ResultAggregator::new().finish();
        assert!(result.is_clean());
        assert_eq!(result.attempted(), 0);
    }

    #[test]
    fn test_run_result_serializes() {
        let result = RunResult {
            compressed: 1,
            failed: vec![PathBuf::from("b.jpg")],
            errors: vec!["b.jpg: boom".to_string()],
            original_bytes: 10,
            compressed_bytes: 4,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["compressed"], 1);
        assert_eq!(json["failed"][0], "b.jpg");
        assert_eq!(json["errors"][0], "b.jpg: boom");
        assert_eq!(json["original_bytes"], 10);
    }
}
