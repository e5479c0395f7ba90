//! Verification status and the errors a submit can end in.

use crate::service::{ServiceError, VerifyResponse};
use thiserror::Error;

pub const INCOMPLETE_CODE_MESSAGE: &str = "Please enter the complete 6-digit OTP";
pub const VERIFIED_MESSAGE: &str = "Email verified successfully! Redirecting...";
pub const MISMATCH_MESSAGE: &str = "Invalid OTP code. Please try again.";
pub const VERIFY_UNAVAILABLE_MESSAGE: &str = "Verification failed. Please try again.";
pub const RESEND_UNAVAILABLE_MESSAGE: &str = "Failed to resend OTP. Please try again.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum VerificationStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

impl VerificationStatus {
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Which external call an unavailability refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Verify,
    Resend,
}

impl Operation {
    #[must_use]
    pub const fn unavailable_message(self) -> &'static str {
        match self {
            Self::Verify => VERIFY_UNAVAILABLE_MESSAGE,
            Self::Resend => RESEND_UNAVAILABLE_MESSAGE,
        }
    }
}

/// Every variant is recoverable; `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("{}", INCOMPLETE_CODE_MESSAGE)]
    IncompleteCode,
    #[error("{}", .message.as_deref().unwrap_or(MISMATCH_MESSAGE))]
    CodeMismatch { message: Option<String> },
    #[error("{}", .operation.unavailable_message())]
    ServiceUnavailable {
        operation: Operation,
        #[source]
        source: ServiceError,
    },
}

impl OtpError {
    #[must_use]
    pub fn unavailable(operation: Operation, source: ServiceError) -> Self {
        Self::ServiceUnavailable { operation, source }
    }
}

/// Splits a verification call result into "verified" or a typed failure.
///
/// # Errors
/// Returns `CodeMismatch` when the service rejected the code and
/// `ServiceUnavailable` when the call itself failed.
pub fn classify(result: Result<VerifyResponse, ServiceError>) -> Result<VerifyResponse, OtpError> {
    match result {
        Ok(response) if response.verified => Ok(response),
        Ok(response) => Err(OtpError::CodeMismatch {
            message: response.message.filter(|message| !message.trim().is_empty()),
        }),
        Err(err) => Err(OtpError::unavailable(Operation::Verify, err)),
    }
}
