//! # InvoicePro account access
//!
//! Login followed by email ownership verification with a six-digit one-time
//! code.
//!
//! ## Flow
//!
//! 1. The [`login::LoginForm`] checks username and password against a
//!    [`service::CredentialService`], which answers with the address to verify.
//! 2. An [`otp::OtpScreen`] collects the code in six cells, counts down the code
//!    expiry and, once the code expired, allows asking for a new one.
//! 3. [`otp::OtpFlow`] drives the screen: it owns the tick, dispatches verify and
//!    resend calls without blocking input, and drops answers that arrive after
//!    the screen was dismissed or superseded by a resend.
//!
//! The flow keeps no global state. A successful verification returns an
//! [`session::AuthSession`] to the caller.
//!
//! ## Backends
//!
//! Codes are generated, stored and checked elsewhere. [`service::http`] talks to
//! the InvoicePro API, [`service::simulated`] stands in for it locally, and
//! [`stub`] serves the simulated backend over HTTP for client development.

pub mod cli;
pub mod login;
pub mod otp;
pub mod service;
pub mod session;
pub mod stub;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
