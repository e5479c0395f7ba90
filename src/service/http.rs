//! HTTP client for the verification API.
//!
//! Every request carries the configured timeout. Transport failures are mapped
//! onto `ServiceError` so the screen can tell "wrong code" apart from "call
//! failed". Error bodies are trimmed before they can reach the UI.

use super::{
    config::ClientConfig, CredentialService, IssuanceService, LoginRequest, LoginResponse,
    ResendRequest, ResendResponse, ServiceError, VerificationService, VerifyRequest,
    VerifyResponse,
};
use crate::otp::mask_email;
use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument, warn};

pub const VERIFY_PATH: &str = "/v1/otp/verify";
pub const RESEND_PATH: &str = "/v1/otp/resend";
pub const LOGIN_PATH: &str = "/v1/auth/login";

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct HttpOtpClient {
    client: Client,
    config: ClientConfig,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

impl HttpOtpClient {
    /// # Errors
    /// Returns `ServiceError::Config` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|err| ServiceError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, ServiceError> {
        let url = self.config.endpoint(path)?;
        debug!(%url, "POST");
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_request_error)
    }
}

#[async_trait]
impl VerificationService for HttpOtpClient {
    #[instrument(skip_all, fields(email = %mask_email(&request.email)))]
    async fn verify(&self, request: &VerifyRequest) -> Result<VerifyResponse, ServiceError> {
        let response = self.post(VERIFY_PATH, request).await?;
        let status = response.status();

        if status.is_success() {
            return read_json(response).await;
        }

        let body = response.text().await.unwrap_or_default();

        // A rejected code comes back as a 4xx carrying the regular verdict body.
        if status.is_client_error() {
            if let Ok(verdict) = serde_json::from_str::<VerifyResponse>(&body) {
                if !verdict.verified {
                    return Ok(verdict);
                }
            }
        }

        warn!(status = status.as_u16(), "verification call failed");
        Err(ServiceError::Http {
            status: status.as_u16(),
            message: sanitize_body(&body),
        })
    }
}

#[async_trait]
impl IssuanceService for HttpOtpClient {
    #[instrument(skip_all, fields(email = %mask_email(&request.email)))]
    async fn resend(&self, request: &ResendRequest) -> Result<ResendResponse, ServiceError> {
        let response = self.post(RESEND_PATH, request).await?;
        let status = response.status();

        if status.is_success() {
            // The acknowledgment body is optional.
            let body = response.text().await.map_err(map_request_error)?;
            if body.trim().is_empty() {
                return Ok(ResendResponse::default());
            }
            return serde_json::from_str(&body)
                .map_err(|err| ServiceError::Parse(format!("Failed to decode response: {err}")));
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "resend call failed");
        Err(ServiceError::Http {
            status: status.as_u16(),
            message: sanitize_body(&body),
        })
    }
}

#[async_trait]
impl CredentialService for HttpOtpClient {
    #[instrument(skip_all, fields(username = %request.username))]
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ServiceError> {
        let body = LoginBody {
            username: &request.username,
            password: request.password.expose_secret(),
        };
        let response = self.post(LOGIN_PATH, &body).await?;
        let status = response.status();

        if status.is_success() {
            return read_json(response).await;
        }

        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::Http {
            status: status.as_u16(),
            message: sanitize_body(&body),
        })
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    response.json::<T>().await.map_err(|err| {
        if err.is_timeout() {
            map_request_error(err)
        } else {
            ServiceError::Parse(format!("Failed to decode response: {err}"))
        }
    })
}

/// Maps transport errors into user-facing variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        ServiceError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Trims and truncates an error body for display.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "Request failed.".to_string();
    }

    let mut sanitized: String = trimmed.chars().take(MAX_ERROR_CHARS).collect();
    if trimmed.chars().count() > MAX_ERROR_CHARS {
        sanitized.push_str("...");
    }
    sanitized
}
