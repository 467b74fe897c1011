use crate::credentials::Credential;
use crate::error::{CompressionError, Result};
use std::path::PathBuf;

/// Turns raw key values (from `--api-key` or `COMPRESS_IMAGE_API_KEYS`, already
/// split on commas) into credentials, trimming whitespace and dropping empties.
/// Order is preserved; it is the rotation order.
pub fn resolve_credentials<S: AsRef<str>>(raw: &[S]) -> Vec<Credential> {
    raw.iter()
        .map(|key| key.as_ref().trim())
        .filter(|key| !key.is_empty())
        .map(Credential::from)
        .collect()
}

/// Like [`resolve_credentials`], but an empty result is an error.
pub fn require_credentials<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Credential>> {
    let credentials = resolve_credentials(raw);
    if credentials.is_empty() {
        return Err(CompressionError::NoCredentials);
    }
    Ok(credentials)
}

/// The project root: `--root` when given, the working directory otherwise.
pub fn resolve_project_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(CompressionError::InvalidDirectory(root));
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_credentials_trims_and_drops_empties() {
        let raw = vec![" key-one ", "", "key-two", "   "];
        let credentials = resolve_credentials(&raw);
        assert_eq!(
            credentials,
            vec![Credential::from("key-one"), Credential::from("key-two")]
        );
    }

    #[test]
    fn test_require_credentials_empty() {
        let raw: Vec<String> = vec![" ".to_string()];
        assert!(matches!(
            require_credentials(&raw),
            Err(CompressionError::NoCredentials)
        ));
    }

    #[test]
    fn test_resolve_project_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = resolve_project_root(Some(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(root, temp_dir.path());

        let missing = temp_dir.path().join("missing");
        assert!(matches!(
            resolve_project_root(Some(missing)),
            Err(CompressionError::InvalidDirectory(_))
        ));

        assert!(resolve_project_root(None).is_ok());
    }
}
