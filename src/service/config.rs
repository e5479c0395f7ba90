//! Endpoint and timeout settings for the HTTP backend.

use super::ServiceError;
use std::time::Duration;
use url::Url;

/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: Url,
    timeout: Duration,
}

impl ClientConfig {
    /// Parses the API base URL.
    ///
    /// # Errors
    /// Returns `ServiceError::Config` if the URL is empty or invalid.
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::Config("API base URL is empty".to_string()));
        }

        let mut base_url = Url::parse(trimmed)
            .map_err(|err| ServiceError::Config(format!("Invalid API base URL: {err}")))?;

        // Url::join drops the last path segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Zero timeouts fall back to the default.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves an API path against the base URL.
    ///
    /// # Errors
    /// Returns `ServiceError::Config` if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path.trim().trim_start_matches('/'))
            .map_err(|err| ServiceError::Config(format!("Invalid endpoint {path}: {err}")))
    }
}
