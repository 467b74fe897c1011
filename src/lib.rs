pub mod cli;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod driver;
pub mod error;
pub mod locator;
pub mod logger;
pub mod report;
pub mod service;
pub mod staged;
pub mod summary;
pub mod tinify;
pub mod utils;

pub use credentials::{Credential, CredentialLedger};
pub use driver::CompressionDriver;
pub use error::{CompressionError, Result};
pub use locator::{is_compressible_image, locate_image_files};
pub use report::{ProgressLine, RunReport};
pub use service::CompressionService;
pub use staged::{repository_root, staged_image_files};
pub use summary::{FileOutcome, ProgressEvent, ResultAggregator, RunResult};
pub use tinify::TinifyClient;
