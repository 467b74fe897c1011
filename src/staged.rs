use crate::error::{CompressionError, Result};
use crate::locator::is_compressible_image;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Lists images added, copied, modified or renamed in the git index of the
/// repository containing `project_root`. Paths are relative to the
/// repository root, as git reports them.
pub fn staged_image_files(project_root: &Path) -> Result<Vec<PathBuf>> {
    let output = Command::new("git")
        .arg("-C")
        .arg(project_root)
        .args(["diff", "--staged", "--diff-filter=ACMR", "--name-only", "-z"])
        .output()
        .map_err(|e| CompressionError::Git(format!("failed to run git: {}", e)))?;

    if !output.status.success() {
        return Err(CompressionError::Git(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(parse_staged_listing(&String::from_utf8_lossy(&output.stdout)))
}

/// Top-level directory of the git repository containing `path`; staged
/// paths resolve against it.
pub fn repository_root(path: &Path) -> Result<PathBuf> {
    let output = Command::new("git")
        .arg("-C")
        .arg(path)
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .map_err(|e| CompressionError::Git(format!("failed to run git: {}", e)))?;

    if !output.status.success() {
        return Err(CompressionError::Git(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(PathBuf::from(String::from_utf8_lossy(&output.stdout).trim()))
}

/// Splits NUL-separated `git diff --name-only -z` output, keeping images.
fn parse_staged_listing(listing: &str) -> Vec<PathBuf> {
    listing
        .split('\0')
        .filter(|name| !name.is_empty())
        .map(PathBuf::from)
        .filter(|path| is_compressible_image(path))
        .collect()
}
