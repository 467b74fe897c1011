/// Monthly free allowance of a Tinify API key.
pub const FREE_TIER_LIMIT: u64 = 500;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "gif", "webp"];

pub const API_KEYS_ENV: &str = "COMPRESS_IMAGE_API_KEYS";

pub const TINIFY_ENDPOINT: &str = "https://api.tinify.com";
pub const TINIFY_SHRINK_PATH: &str = "/shrink";
pub const TINIFY_AUTH_USER: &str = "api";
pub const COMPRESSION_COUNT_HEADER: &str = "compression-count";
pub const REQUEST_TIMEOUT_SECS: u64 = 120;
pub const USER_AGENT: &str = concat!("tiny-squeeze/", env!("CARGO_PKG_VERSION"));

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}";
pub const PROGRESS_BAR_CHARS: &str = "=>-";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const INFO_PREFIX: &str = "📋";
pub const KEY_PREFIX: &str = "🔑";
