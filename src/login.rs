//! Credential form shown before email verification.

use crate::service::{CredentialService, LoginRequest, LoginResponse, ServiceError};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoginStatus {
    #[default]
    Idle,
    Submitting,
    Failed(String),
    /// Credentials accepted; the address is the one to verify next.
    Accepted(String),
}

#[derive(Debug)]
pub struct LoginForm {
    username: String,
    password: SecretString,
    username_touched: bool,
    password_touched: bool,
    show_password: bool,
    status: LoginStatus,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginForm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            username: String::new(),
            password: SecretString::from(String::new()),
            username_touched: false,
            password_touched: false,
            show_password: false,
            status: LoginStatus::Idle,
        }
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = SecretString::from(password.into());
    }

    pub fn blur_username(&mut self) {
        self.username_touched = true;
    }

    pub fn blur_password(&mut self) {
        self.password_touched = true;
    }

    /// Only changes how the password is rendered.
    pub fn toggle_password_visibility(&mut self) {
        self.show_password = !self.show_password;
    }

    #[must_use]
    pub fn show_password(&self) -> bool {
        self.show_password
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password as it should be drawn: plain when visible, bullets otherwise.
    #[must_use]
    pub fn password_display(&self) -> String {
        let password = self.password.expose_secret();
        if self.show_password {
            password.to_string()
        } else {
            "•".repeat(password.chars().count())
        }
    }

    #[must_use]
    pub fn username_invalid(&self) -> bool {
        self.username_touched && self.username.trim().is_empty()
    }

    #[must_use]
    pub fn password_invalid(&self) -> bool {
        self.password_touched && self.password.expose_secret().is_empty()
    }

    #[must_use]
    pub fn status(&self) -> &LoginStatus {
        &self.status
    }

    /// Marks both fields touched and returns the request to send, or `None`
    /// when a field is empty or a login is already outstanding.
    pub fn begin_submit(&mut self) -> Option<LoginRequest> {
        self.username_touched = true;
        self.password_touched = true;

        if self.status == LoginStatus::Submitting
            || self.username.trim().is_empty()
            || self.password.expose_secret().is_empty()
        {
            return None;
        }

        self.status = LoginStatus::Submitting;
        Some(LoginRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }

    pub fn finish_submit(&mut self, result: Result<LoginResponse, ServiceError>) -> &LoginStatus {
        self.status = match result {
            Ok(response) => LoginStatus::Accepted(response.email),
            Err(ServiceError::Http {
                status: 401 | 403, ..
            }) => LoginStatus::Failed(INVALID_CREDENTIALS_MESSAGE.to_string()),
            Err(err) => LoginStatus::Failed(err.to_string()),
        };
        &self.status
    }

    /// Runs a full submit against `service`.
    ///
    /// Returns the address to verify when the credentials were accepted.
    #[instrument(skip_all)]
    pub async fn submit(&mut self, service: &dyn CredentialService) -> Option<String> {
        let request = self.begin_submit()?;
        let result = service.login(&request).await;
        match self.finish_submit(result) {
            LoginStatus::Accepted(email) => {
                info!("credentials accepted");
                Some(email.clone())
            }
            LoginStatus::Failed(message) => {
                warn!(%message, "login failed");
                None
            }
            LoginStatus::Idle | LoginStatus::Submitting => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::simulated::SimulatedOtpService;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingService {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CredentialService for CountingService {
        async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ServiceError::Network("connection refused".to_string()))
        }
    }

    #[test]
    fn fields_are_invalid_only_once_touched() {
        let mut form = LoginForm::new();
        assert!(!form.username_invalid());
        assert!(!form.password_invalid());

        form.blur_username();
        assert!(form.username_invalid());
        form.set_username("uday");
        assert!(!form.username_invalid());
        assert!(!form.password_invalid());
    }

    #[test]
    fn empty_submit_marks_fields_and_sends_nothing() {
        let mut form = LoginForm::new();
        assert!(form.begin_submit().is_none());
        assert!(form.username_invalid());
        assert!(form.password_invalid());
        assert_eq!(form.status(), &LoginStatus::Idle);
    }

    #[test]
    fn password_visibility_only_affects_display() {
        let mut form = LoginForm::new();
        form.set_password("hunter2");
        assert_eq!(form.password_display(), "•••••••");
        form.toggle_password_visibility();
        assert!(form.show_password());
        assert_eq!(form.password_display(), "hunter2");
        assert!(!format!("{form:?}").contains("hunter2"));
    }

    #[test]
    fn rejected_credentials_use_fixed_message() {
        let mut form = LoginForm::new();
        form.set_username("uday");
        form.set_password("wrong");
        assert!(form.begin_submit().is_some());
        // A second submit while outstanding is masked.
        assert!(form.begin_submit().is_none());

        let status = form.finish_submit(Err(ServiceError::Http {
            status: 401,
            message: "nope".to_string(),
        }));
        assert_eq!(
            status,
            &LoginStatus::Failed(INVALID_CREDENTIALS_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn empty_fields_never_reach_the_service() {
        let service = CountingService::default();
        let mut form = LoginForm::new();
        form.set_username("  ");
        form.set_password("secret");
        assert_eq!(form.submit(&service).await, None);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn service_failure_surfaces_message() {
        let service = CountingService::default();
        let mut form = LoginForm::new();
        form.set_username("uday");
        form.set_password("secret");
        assert_eq!(form.submit(&service).await, None);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            form.status(),
            &LoginStatus::Failed("Network error: connection refused".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_credentials_return_address_to_verify() {
        let service = SimulatedOtpService::new().with_email("billing@invoicepro.io");
        let mut form = LoginForm::new();
        form.set_username("uday");
        form.set_password("secret");
        assert_eq!(
            form.submit(&service).await.as_deref(),
            Some("billing@invoicepro.io")
        );
    }
}
