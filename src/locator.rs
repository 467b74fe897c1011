use crate::constants::IMAGE_EXTENSIONS;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collects every compressible image under `dir`, at any depth.
///
/// `dir` may be absolute or relative to `project_root`. Returned paths are
/// relative to `project_root`; a directory outside the root yields absolute
/// paths, which still resolve when joined onto the root.
///
/// # Arguments
/// * `dir` - Directory to scan
/// * `project_root` - Root the returned paths are relative to
///
/// # Returns
/// * Image paths in depth-first order, sorted by file name within each
///   directory. A missing directory yields an empty list.
pub fn locate_image_files(dir: &Path, project_root: &Path) -> Vec<PathBuf> {
    let full_path = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        project_root.join(dir)
    };

    if !full_path.exists() {
        return Vec::new();
    }

    let walker = WalkDir::new(&full_path)
        .follow_links(true)
        .sort_by_file_name();

    let mut image_files = Vec::new();
    // Broken links, loops and unreadable entries come back as errors; skip them.
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || !is_compressible_image(entry.path()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(project_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        image_files.push(relative);
    }

    image_files
}

/// Returns `true` when the file name ends in one of the extensions the
/// Tinify API accepts (jpg, png, gif, webp), ignoring case.
pub fn is_compressible_image(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_lowercase();

    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| name.ends_with(&format!(".{ext}")))
}
