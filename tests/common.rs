#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tiny_squeeze::{CompressionError, CompressionService, Credential, Result};

/// In-memory stand-in for the Tinify API.
///
/// Compression keeps the first half of the payload. Usage snapshots are fixed
/// per key; keys listed in `rejected` fail validation and payloads listed in
/// `fail_on` fail compression.
#[derive(Default)]
pub struct MockService {
    pub usage: HashMap<String, u32>,
    pub rejected: Vec<String>,
    pub fail_on: Vec<Vec<u8>>,
    pub validations: RefCell<Vec<String>>,
    pub compressions: RefCell<Vec<(String, Vec<u8>)>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_usage(mut self, key: &str, usage: u32) -> Self {
        self.usage.insert(key.to_string(), usage);
        self
    }

    pub fn rejecting(mut self, key: &str) -> Self {
        self.rejected.push(key.to_string());
        self
    }

    pub fn failing_on(mut self, payload: &[u8]) -> Self {
        self.fail_on.push(payload.to_vec());
        self
    }

    /// Keys used for each compression call, in order.
    pub fn compression_keys(&self) -> Vec<String> {
        self.compressions
            .borrow()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl CompressionService for MockService {
    fn validate(&self, credential: &Credential) -> Result<()> {
        self.validations
            .borrow_mut()
            .push(credential.expose().to_string());
        if self.rejected.iter().any(|k| k == credential.expose()) {
            return Err(CompressionError::Remote {
                status: 401,
                message: "Credentials are invalid. (Unauthorized)".to_string(),
            });
        }
        Ok(())
    }

    fn usage_snapshot(&self, credential: &Credential) -> u32 {
        self.usage.get(credential.expose()).copied().unwrap_or(0)
    }

    fn compress(&self, credential: &Credential, source: &[u8]) -> Result<Vec<u8>> {
        self.compressions
            .borrow_mut()
            .push((credential.expose().to_string(), source.to_vec()));
        if self.fail_on.iter().any(|p| p.as_slice() == source) {
            return Err(CompressionError::Remote {
                status: 415,
                message: "File type is not supported. (UnsupportedFile)".to_string(),
            });
        }
        Ok(source[..source.len() / 2].to_vec())
    }
}

pub fn keys(names: &[&str]) -> Vec<Credential> {
    names.iter().map(|k| Credential::from(*k)).collect()
}

/// Creates `count` images named `img-<i>.png` under `root/images`, each
/// holding `payload-<i>` padded to 16 bytes. Returns their relative paths.
pub fn create_images(root: &Path, count: usize) -> Vec<PathBuf> {
    let dir = root.join("images");
    fs::create_dir_all(&dir).unwrap();
    (0..count)
        .map(|i| {
            let relative = PathBuf::from("images").join(format!("img-{}.png", i));
            fs::write(root.join(&relative), payload(i)).unwrap();
            relative
        })
        .collect()
}

pub fn payload(index: usize) -> Vec<u8> {
    format!("payload-{:08}", index).into_bytes()
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}
