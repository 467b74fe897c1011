use crate::constants::FREE_TIER_LIMIT;
use crate::credentials::{Credential, CredentialLedger};
use crate::error::Result;
use crate::locator::locate_image_files;
use crate::service::CompressionService;
use crate::summary::{FileOutcome, ProgressEvent, ResultAggregator, RunResult};
use crate::utils::format_file_size;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Compresses files one at a time, rotating API keys as they approach the
/// free tier limit.
pub struct CompressionDriver<'a, S> {
    service: &'a S,
    project_root: PathBuf,
}

impl<'a, S: CompressionService> CompressionDriver<'a, S> {
    pub fn new(service: &'a S, project_root: impl Into<PathBuf>) -> Self {
        Self {
            service,
            project_root: project_root.into(),
        }
    }

    /// Locates every image under `dir` and compresses them.
    pub fn compress_directory<F>(
        &self,
        dir: &Path,
        credentials: &[Credential],
        on_progress: F,
    ) -> Result<RunResult>
    where
        F: FnMut(ProgressEvent<'_>),
    {
        let files = locate_image_files(dir, &self.project_root);
        self.run(&files, credentials, on_progress)
    }

    /// Compresses `files` (relative to the project root) in order, overwriting
    /// each one in place.
    ///
    /// Before attempting the file at index `i` the active key's projected
    /// usage `snapshot + i + 1` is checked against the free tier limit; when
    /// it is reached the next key is activated and the same file is retried.
    /// A rejected key or running out of keys ends the run early; the partial
    /// result carries a diagnostic explaining why. Per-file failures are
    /// recorded and the run continues.
    ///
    /// # Arguments
    /// * `files` - Root-relative paths, processed in this order
    /// * `credentials` - API keys in rotation order
    /// * `on_progress` - Called once per attempted file, as soon as its outcome is known
    ///
    /// # Returns
    /// * `Ok(RunResult)` - Aggregate outcome, including early terminations
    /// * `Err(CompressionError::NoCredentials)` - If `credentials` is empty
    pub fn run<F>(
        &self,
        files: &[PathBuf],
        credentials: &[Credential],
        mut on_progress: F,
    ) -> Result<RunResult>
    where
        F: FnMut(ProgressEvent<'_>),
    {
        let mut ledger = CredentialLedger::new(credentials)?;
        let mut aggregator = ResultAggregator::new();
        let total = files.len();
        let mut file_index = 0;

        while file_index < total {
            let relative = &files[file_index];
            let absolute = self.project_root.join(relative);

            let credential = match ledger.ensure_validated(self.service) {
                Ok(credential) => credential,
                Err(e) => {
                    crate::warn!("Stopping at {}: {}", relative.display(), e);
                    aggregator.record_error(e.to_string());
                    break;
                }
            };

            if ledger.is_over_quota(file_index) {
                crate::verbose!(
                    "API key {} would reach {} compressions at file {}, rotating",
                    ledger.label(),
                    ledger.estimate(file_index),
                    file_index + 1
                );
                if !ledger.advance() {
                    aggregator.record_error(format!(
                        "All API keys have reached the free tier limit of {} compressions; \
                         compressed {} file(s) before stopping",
                        FREE_TIER_LIMIT,
                        aggregator.compressed()
                    ));
                    break;
                }
                continue;
            }

            let outcome = match compress_in_place(self.service, credential, &absolute) {
                Ok((original_size, compressed_size)) => {
                    crate::verbose!(
                        "{}: {} -> {}",
                        relative.display(),
                        format_file_size(original_size),
                        format_file_size(compressed_size)
                    );
                    aggregator.record_success(original_size, compressed_size);
                    FileOutcome::Compressed
                }
                Err(e) => {
                    crate::verbose!("{}: {}", relative.display(), e);
                    aggregator.record_failure(relative, e);
                    FileOutcome::Failed
                }
            };

            on_progress(ProgressEvent {
                current: file_index + 1,
                total,
                path: relative,
                outcome,
            });
            file_index += 1;
        }

        Ok(aggregator.finish())
    }
}

/// Sends one file through the service and atomically replaces it with the
/// result, keeping its permissions.
///
/// # Returns
/// * `Ok((original_size, compressed_size))` - File sizes in bytes
fn compress_in_place<S: CompressionService>(
    service: &S,
    credential: &Credential,
    path: &Path,
) -> Result<(u64, u64)> {
    // Write through symlinks: the link stays, its target is replaced.
    let path = fs::canonicalize(path)?;
    let source = fs::read(&path)?;
    let permissions = fs::metadata(&path)?.permissions();
    let compressed = service.compress(credential, &source)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(&compressed)?;
    staged.as_file().sync_all()?;
    fs::set_permissions(staged.path(), permissions)?;
    staged.persist(&path).map_err(|e| e.error)?;

    Ok((source.len() as u64, compressed.len() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompressionError;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Halves every payload.
    struct HalvingService {
        calls: RefCell<Vec<String>>,
    }

    impl CompressionService for HalvingService {
        fn validate(&self, _credential: &Credential) -> Result<()> {
            Ok(())
        }

        fn usage_snapshot(&self, _credential: &Credential) -> u32 {
            0
        }

        fn compress(&self, credential: &Credential, source: &[u8]) -> Result<Vec<u8>> {
            self.calls.borrow_mut().push(credential.expose().to_string());
            Ok(source[..source.len() / 2].to_vec())
        }
    }

    #[test]
    fn test_compress_in_place_overwrites_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("photo.jpg");
        fs::write(&file, b"0123456789").unwrap();
        let service = HalvingService {
            calls: RefCell::new(Vec::new()),
        };

        let (before, after) =
            compress_in_place(&service, &Credential::from("key"), &file).unwrap();
        assert_eq!((before, after), (10, 5));
        assert_eq!(fs::read(&file).unwrap(), b"01234");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_writes_through_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("real")).unwrap();
        fs::create_dir_all(root.join("assets")).unwrap();
        let target = root.join("real").join("target.png");
        let link = root.join("assets").join("link.png");
        fs::write(&target, b"0123456789abcdef").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();
        let service = HalvingService {
            calls: RefCell::new(Vec::new()),
        };
        let driver = CompressionDriver::new(&service, root);

        let files = locate_image_files(Path::new("assets"), root);
        assert_eq!(files, vec![PathBuf::from("assets/link.png")]);
        let result = driver.run(&files, &[Credential::from("k")], |_| {}).unwrap();

        assert_eq!(result.compressed, 1);
        assert!(result.errors.is_empty());
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&target).unwrap(), b"01234567");
        assert_eq!(fs::read(&link).unwrap(), b"01234567");
    }

    #[test]
    fn test_compress_in_place_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let service = HalvingService {
            calls: RefCell::new(Vec::new()),
        };

        let result = compress_in_place(
            &service,
            &Credential::from("key"),
            &temp_dir.path().join("gone.png"),
        );
        assert!(matches!(result, Err(CompressionError::Io(_))));
        assert!(service.calls.borrow().is_empty());
    }

    #[test]
    fn test_compress_directory_uses_locator() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("img")).unwrap();
        fs::write(root.join("img").join("a.png"), b"aaaa").unwrap();
        fs::write(root.join("img").join("notes.txt"), b"text").unwrap();
        let service = HalvingService {
            calls: RefCell::new(Vec::new()),
        };
        let driver = CompressionDriver::new(&service, root);

        let mut seen = Vec::new();
        let result = driver
            .compress_directory(Path::new("img"), &[Credential::from("k")], |event| {
                seen.push(event.path.to_path_buf())
            })
            .unwrap();

        assert_eq!(result.compressed, 1);
        assert_eq!(seen, vec![PathBuf::from("img/a.png")]);
        assert_eq!(fs::read(root.join("img").join("notes.txt")).unwrap(), b"text");
    }

    #[test]
    fn test_run_rejects_empty_credentials() {
        let service = HalvingService {
            calls: RefCell::new(Vec::new()),
        };
        let driver = CompressionDriver::new(&service, ".");
        let result = driver.run(&[PathBuf::from("a.png")], &[], |_| {});
        assert!(matches!(result, Err(CompressionError::NoCredentials)));
        assert!(service.calls.borrow().is_empty());
    }
}
