//! Backends consumed by the access flow.
//!
//! Code issuance, code validation and credential checks all live outside this
//! crate. The flow only talks to them through the traits below, so the same
//! screen logic runs against the HTTP API ([`http::HttpOtpClient`]), the
//! in-process [`simulated::SimulatedOtpService`], or a test double.

pub mod config;
pub mod http;
pub mod simulated;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
}

/// Body of a verification call.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

impl std::fmt::Debug for VerifyRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyRequest")
            .field("email", &crate::otp::mask_email(&self.email))
            .field("code", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ResendRequest {
    pub email: String,
}

/// Acknowledgment returned when a new code has been dispatched.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ResendResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Address the verification code was sent to.
    pub email: String,
}

/// Checks a submitted code.
#[async_trait]
pub trait VerificationService: Send + Sync {
    /// Returns the service verdict; `Err` only when the call itself failed.
    async fn verify(&self, request: &VerifyRequest) -> Result<VerifyResponse, ServiceError>;
}

/// Sends a fresh code to an address.
#[async_trait]
pub trait IssuanceService: Send + Sync {
    async fn resend(&self, request: &ResendRequest) -> Result<ResendResponse, ServiceError>;
}

/// Checks username and password and starts email verification.
#[async_trait]
pub trait CredentialService: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_request_debug_hides_code() {
        let request = VerifyRequest {
            email: "user@example.com".to_string(),
            code: "123456".to_string(),
        };
        let debug = format!("{request:?}");
        assert!(!debug.contains("123456"));
        assert!(debug.contains("u**r@example.com"));
    }

    #[test]
    fn verify_response_optional_fields_default() -> Result<(), serde_json::Error> {
        let response: VerifyResponse = serde_json::from_str(r#"{"verified":false}"#)?;
        assert!(!response.verified);
        assert_eq!(response.message, None);
        assert_eq!(response.session_token, None);
        Ok(())
    }

    #[test]
    fn service_error_display() {
        let err = ServiceError::Http {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed (503): maintenance");
        assert_eq!(
            ServiceError::Timeout("slow".to_string()).to_string(),
            "Timeout: slow"
        );
    }
}
