//! In-process backend used when no API is configured.
//!
//! Mirrors the behavior of the first front end: verification answers after a
//! short delay and accepts one fixed code, resend answers after a shorter delay,
//! and any non-empty credentials log in as a fixed user. It never creates codes.

use super::{
    CredentialService, IssuanceService, LoginRequest, LoginResponse, ResendRequest,
    ResendResponse, ServiceError, VerificationService, VerifyRequest, VerifyResponse,
};
use crate::otp::mask_email;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;
use ulid::Ulid;

pub const DEFAULT_ACCEPTED_CODE: &str = "123456";
pub const DEFAULT_EMAIL: &str = "user@example.com";
pub const DEFAULT_VERIFY_LATENCY: Duration = Duration::from_millis(2000);
pub const DEFAULT_RESEND_LATENCY: Duration = Duration::from_millis(1000);

#[derive(Clone, Debug)]
pub struct SimulatedOtpService {
    accepted_code: String,
    email: String,
    verify_latency: Duration,
    resend_latency: Duration,
}

impl Default for SimulatedOtpService {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedOtpService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            accepted_code: DEFAULT_ACCEPTED_CODE.to_string(),
            email: DEFAULT_EMAIL.to_string(),
            verify_latency: DEFAULT_VERIFY_LATENCY,
            resend_latency: DEFAULT_RESEND_LATENCY,
        }
    }

    #[must_use]
    pub fn with_accepted_code(mut self, code: impl Into<String>) -> Self {
        self.accepted_code = code.into();
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the verify latency; resend answers in half that time.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.verify_latency = latency;
        self.resend_latency = latency / 2;
        self
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

#[async_trait]
impl VerificationService for SimulatedOtpService {
    async fn verify(&self, request: &VerifyRequest) -> Result<VerifyResponse, ServiceError> {
        sleep(self.verify_latency).await;

        if request.code == self.accepted_code {
            Ok(VerifyResponse {
                verified: true,
                message: None,
                session_token: Some(Ulid::new().to_string()),
            })
        } else {
            Ok(VerifyResponse {
                verified: false,
                message: None,
                session_token: None,
            })
        }
    }
}

#[async_trait]
impl IssuanceService for SimulatedOtpService {
    async fn resend(&self, request: &ResendRequest) -> Result<ResendResponse, ServiceError> {
        sleep(self.resend_latency).await;

        let dispatch_id = Ulid::new().to_string();
        info!(
            email = %mask_email(&request.email),
            %dispatch_id,
            "simulated code dispatch"
        );
        Ok(ResendResponse {
            dispatch_id: Some(dispatch_id),
        })
    }
}

#[async_trait]
impl CredentialService for SimulatedOtpService {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ServiceError> {
        sleep(self.resend_latency).await;

        if request.username.trim().is_empty() || request.password.expose_secret().is_empty() {
            return Err(ServiceError::Http {
                status: 401,
                message: "Invalid username or password.".to_string(),
            });
        }

        Ok(LoginResponse {
            email: self.email.clone(),
        })
    }
}
