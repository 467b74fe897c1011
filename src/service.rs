use crate::credentials::Credential;
use crate::error::Result;

/// The remote side of a compression run.
///
/// Every call names the credential it runs under; implementations keep no
/// notion of a "current" key.
pub trait CompressionService {
    /// Lightweight check that the credential is accepted.
    fn validate(&self, credential: &Credential) -> Result<()>;

    /// Cumulative number of compressions the service has counted for this
    /// credential, across all past use. Zero when unknown.
    fn usage_snapshot(&self, credential: &Credential) -> u32;

    /// Compresses `source` and returns the compressed bytes.
    fn compress(&self, credential: &Credential, source: &[u8]) -> Result<Vec<u8>>;
}
