//! Result of a completed access flow.
//!
//! The flow keeps no global auth state. On success it hands this value back to
//! the caller, which decides where the session lives.

use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct AuthSession {
    /// Address that proved ownership with a code.
    pub email: String,
    /// Session token issued by the verification service, if any.
    pub session_token: Option<SecretString>,
}

impl AuthSession {
    #[must_use]
    pub fn new(email: impl Into<String>, session_token: Option<String>) -> Self {
        Self {
            email: email.into(),
            session_token: session_token.map(SecretString::from),
        }
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.session_token.is_some()
    }
}
