use crate::constants::FREE_TIER_LIMIT;
use crate::error::{CompressionError, Result};
use crate::service::CompressionService;
use std::fmt;

/// An opaque Tinify API key. Formatting only ever shows the last four
/// characters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building requests.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 4 {
            return write!(f, "****");
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        write!(f, "****{}", tail)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self)
    }
}

impl From<&str> for Credential {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Credential {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// Ordered credentials with a rotation pointer.
///
/// The pointer only moves forward. Each time a credential becomes active it
/// is validated once and its usage snapshot is fetched once; the snapshot is
/// not refreshed per file.
#[derive(Debug)]
pub struct CredentialLedger<'a> {
    credentials: &'a [Credential],
    index: usize,
    // Some once the active credential has been validated.
    snapshot: Option<u32>,
}

impl<'a> CredentialLedger<'a> {
    pub fn new(credentials: &'a [Credential]) -> Result<Self> {
        if credentials.is_empty() {
            return Err(CompressionError::NoCredentials);
        }
        Ok(Self {
            credentials,
            index: 0,
            snapshot: None,
        })
    }

    /// 0-based position of the active credential.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn active(&self) -> Option<&'a Credential> {
        self.credentials.get(self.index)
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.credentials.len()
    }

    pub fn is_validated(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Validates the active credential if it has not been validated since it
    /// became active, caching its usage snapshot.
    ///
    /// # Returns
    /// * `Ok(credential)` - The active, validated credential
    /// * `Err(CompressionError::CredentialRejected)` - If the service refused it
    pub fn ensure_validated<S: CompressionService>(&mut self, service: &S) -> Result<&'a Credential> {
        let credential = self.active().ok_or(CompressionError::NoCredentials)?;
        if self.snapshot.is_none() {
            service.validate(credential).map_err(|e| {
                CompressionError::CredentialRejected(self.label(), e.to_string())
            })?;
            let usage = service.usage_snapshot(credential);
            crate::verbose!("Activated API key {} (usage so far: {})", self.label(), usage);
            self.snapshot = Some(usage);
        }
        Ok(credential)
    }

    /// Usage snapshot taken when the active credential was validated.
    pub fn snapshot(&self) -> u32 {
        self.snapshot.unwrap_or(0)
    }

    /// Projected usage after compressing the file at `file_index`, assuming
    /// every file up to and including it costs one compression.
    pub fn estimate(&self, file_index: usize) -> u64 {
        u64::from(self.snapshot()) + file_index as u64 + 1
    }

    pub fn is_over_quota(&self, file_index: usize) -> bool {
        self.estimate(file_index) >= FREE_TIER_LIMIT
    }

    /// Moves to the next credential. The new one is validated and its
    /// snapshot fetched on first use.
    ///
    /// # Returns
    /// * `true` if a credential remains, `false` once the list is used up
    pub fn advance(&mut self) -> bool {
        if !self.is_exhausted() {
            self.index += 1;
        }
        self.snapshot = None;
        !self.is_exhausted()
    }

    /// Human-readable "#n (****abcd)" label of the active credential.
    pub fn label(&self) -> String {
        match self.active() {
            Some(credential) => format!("#{} ({})", self.index + 1, credential),
            None => format!("#{}", self.index + 1),
        }
    }
}
