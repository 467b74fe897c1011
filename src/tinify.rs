use crate::constants::{
    COMPRESSION_COUNT_HEADER, REQUEST_TIMEOUT_SECS, TINIFY_AUTH_USER, TINIFY_ENDPOINT,
    TINIFY_SHRINK_PATH, USER_AGENT,
};
use crate::credentials::Credential;
use crate::error::{CompressionError, Result};
use crate::service::CompressionService;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Debug, Deserialize)]
struct ShrinkResponse {
    output: ShrinkOutput,
}

#[derive(Debug, Deserialize)]
struct ShrinkOutput {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
    message: String,
}

/// Blocking client for the Tinify HTTP API.
///
/// Requests run on a private single-threaded tokio runtime. The
/// `Compression-Count` header of every response is remembered per key and
/// served back by [`CompressionService::usage_snapshot`].
pub struct TinifyClient {
    http: reqwest::Client,
    runtime: Runtime,
    endpoint: String,
    usage: Mutex<HashMap<String, u32>>,
}

impl TinifyClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(TINIFY_ENDPOINT)
    }

    /// Client against a custom API base URL, e.g. a proxy.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CompressionError::Runtime(e.to_string()))?;

        Ok(Self {
            http,
            runtime,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            usage: Mutex::new(HashMap::new()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn record_usage(&self, credential: &Credential, headers: &HeaderMap) {
        if let Some(count) = parse_compression_count(headers) {
            if let Ok(mut usage) = self.usage.lock() {
                usage.insert(credential.expose().to_string(), count);
            }
        }
    }

    async fn shrink(&self, credential: &Credential, body: Vec<u8>) -> Result<Response> {
        let response = self
            .http
            .post(format!("{}{}", self.endpoint, TINIFY_SHRINK_PATH))
            .basic_auth(TINIFY_AUTH_USER, Some(credential.expose()))
            .body(body)
            .send()
            .await?;
        self.record_usage(credential, response.headers());
        Ok(response)
    }

    async fn validate_async(&self, credential: &Credential) -> Result<()> {
        // An empty upload is rejected as a client error, but only after the
        // key itself has been accepted.
        let response = self.shrink(credential, Vec::new()).await?;
        if accepts_credential(response.status()) {
            Ok(())
        } else {
            Err(remote_error(response).await)
        }
    }

    async fn compress_async(&self, credential: &Credential, source: &[u8]) -> Result<Vec<u8>> {
        let response = self.shrink(credential, source.to_vec()).await?;
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let location = match location {
            Some(location) => location,
            None => response.json::<ShrinkResponse>().await?.output.url,
        };

        let output = self
            .http
            .get(&location)
            .basic_auth(TINIFY_AUTH_USER, Some(credential.expose()))
            .send()
            .await?;
        self.record_usage(credential, output.headers());
        if !output.status().is_success() {
            return Err(remote_error(output).await);
        }

        Ok(output.bytes().await?.to_vec())
    }
}

impl CompressionService for TinifyClient {
    fn validate(&self, credential: &Credential) -> Result<()> {
        self.runtime.block_on(self.validate_async(credential))
    }

    fn usage_snapshot(&self, credential: &Credential) -> u32 {
        self.usage
            .lock()
            .ok()
            .and_then(|usage| usage.get(credential.expose()).copied())
            .unwrap_or(0)
    }

    fn compress(&self, credential: &Credential, source: &[u8]) -> Result<Vec<u8>> {
        self.runtime.block_on(self.compress_async(credential, source))
    }
}

/// Whether a response to the validation request means the key is usable.
///
/// 401 is a bad key and 5xx a service fault. 429 means the monthly limit was
/// hit, which still proves the key exists; other client errors are expected
/// for the empty upload.
fn accepts_credential(status: StatusCode) -> bool {
    if status == StatusCode::UNAUTHORIZED || status.is_server_error() {
        return false;
    }
    status.is_success() || status.is_client_error()
}

fn parse_compression_count(headers: &HeaderMap) -> Option<u32> {
    headers
        .get(COMPRESSION_COUNT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

async fn remote_error(response: Response) -> CompressionError {
    let status = response.status();
    let message = match response.json::<ApiError>().await {
        Ok(body) => format!("{} ({})", body.message, body.error),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string(),
    };
    CompressionError::Remote {
        status: status.as_u16(),
        message,
    }
}
