//! State of one OTP verification screen.
//!
//! `OtpScreen` is synchronous: a submit or resend is split into a `begin_*` call
//! that flips the in-flight state and hands back the request to send, and a
//! `finish_*` call that applies the service answer. Every request carries a
//! [`Ticket`] holding the screen generation at dispatch time. A successful resend
//! starts a new generation, and a torn-down screen accepts nothing, so late or
//! superseded answers are dropped instead of being applied.

use super::{
    cells::CodeCells,
    email::mask_email,
    resend::{ResendStatus, RESENT_MESSAGE},
    timer::ExpiryTimer,
    verification::{classify, Operation, OtpError, VerificationStatus, VERIFIED_MESSAGE},
};
use crate::service::{ResendRequest, ResendResponse, ServiceError, VerifyRequest, VerifyResponse};
use crate::session::AuthSession;
use tracing::{debug, info, warn};

/// Screen generation a request was dispatched in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct PendingVerify {
    pub ticket: Ticket,
    pub request: VerifyRequest,
}

#[derive(Debug)]
pub struct PendingResend {
    pub ticket: Ticket,
    pub request: ResendRequest,
}

/// Feedback from the last resend attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Everything a renderer needs, detached from the screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenView {
    pub masked_email: String,
    pub cells: CodeCells,
    pub seconds_remaining: u32,
    pub time_left: String,
    pub expired: bool,
    pub status: VerificationStatus,
    pub error: Option<String>,
    pub success: Option<String>,
    pub inputs_enabled: bool,
    pub submit_enabled: bool,
    pub resend: ResendStatus,
}

#[derive(Debug)]
pub struct OtpScreen {
    email: String,
    cells: CodeCells,
    timer: ExpiryTimer,
    status: VerificationStatus,
    resend_in_flight: bool,
    notice: Option<Notice>,
    generation: u64,
    torn_down: bool,
}

impl OtpScreen {
    #[must_use]
    pub fn new(email: impl Into<String>, ttl_seconds: u32) -> Self {
        Self {
            email: email.into(),
            cells: CodeCells::new(),
            timer: ExpiryTimer::new(ttl_seconds),
            status: VerificationStatus::Idle,
            resend_in_flight: false,
            notice: None,
            generation: 0,
            torn_down: false,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn cells(&self) -> &CodeCells {
        &self.cells
    }

    #[must_use]
    pub fn timer(&self) -> &ExpiryTimer {
        &self.timer
    }

    #[must_use]
    pub fn status(&self) -> &VerificationStatus {
        &self.status
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    #[must_use]
    pub fn resend_status(&self) -> ResendStatus {
        ResendStatus {
            allowed: self.timer.is_expired(),
            in_flight: self.resend_in_flight,
        }
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Cells accept edits unless a call is outstanding or the code was accepted.
    #[must_use]
    pub fn inputs_enabled(&self) -> bool {
        !self.torn_down
            && !self.resend_in_flight
            && !matches!(
                self.status,
                VerificationStatus::Submitting | VerificationStatus::Succeeded
            )
    }

    pub fn set_digit(&mut self, index: usize, value: &str) -> bool {
        if !self.inputs_enabled() {
            return false;
        }
        let applied = self.cells.set_digit(index, value);
        if applied {
            debug!(index, focus = self.cells.focus().index(), "cell edited");
            self.clear_failure();
        }
        applied
    }

    pub fn handle_backspace(&mut self, index: usize) {
        if self.inputs_enabled() {
            self.cells.handle_backspace(index);
        }
    }

    pub fn handle_paste(&mut self, raw: &str) -> bool {
        if !self.inputs_enabled() {
            return false;
        }
        let applied = self.cells.handle_paste(raw);
        if applied {
            debug!(focus = self.cells.focus().index(), "paste distributed");
            self.clear_failure();
        } else {
            debug!("paste ignored");
        }
        applied
    }

    pub fn focus_on(&mut self, index: usize) {
        if self.inputs_enabled() {
            self.cells.focus_on(index);
        }
    }

    /// Advances the expiry clock by one second.
    pub fn tick(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        let ticked = self.timer.tick();
        if ticked && self.timer.is_expired() {
            info!(email = %mask_email(&self.email), "code expired, resend available");
        }
        ticked
    }

    /// Starts a verification.
    ///
    /// Returns `Ok(None)` when submitting is currently masked (a call is
    /// outstanding, the code was already accepted, or the screen is gone).
    ///
    /// # Errors
    /// Returns `OtpError::IncompleteCode` if fewer than six digits are entered;
    /// the status becomes `Failed` and nothing is sent.
    pub fn begin_submit(&mut self) -> Result<Option<PendingVerify>, OtpError> {
        if !self.inputs_enabled() {
            debug!(status = ?self.status, "submit masked");
            return Ok(None);
        }

        let Some(code) = self.cells.complete_code() else {
            let err = OtpError::IncompleteCode;
            self.status = VerificationStatus::Failed(err.to_string());
            return Err(err);
        };

        self.status = VerificationStatus::Submitting;
        self.notice = None;
        info!(email = %mask_email(&self.email), "submitting code");

        Ok(Some(PendingVerify {
            ticket: Ticket(self.generation),
            request: VerifyRequest {
                email: self.email.clone(),
                code,
            },
        }))
    }

    /// Applies a verification answer. Returns `None` if the answer is stale.
    pub fn finish_submit(
        &mut self,
        ticket: Ticket,
        result: Result<VerifyResponse, ServiceError>,
    ) -> Option<Result<AuthSession, OtpError>> {
        if self.is_stale(ticket) || !self.status.is_submitting() {
            debug!(?ticket, "dropping stale verification response");
            return None;
        }

        match classify(result) {
            Ok(response) => {
                info!(email = %mask_email(&self.email), "code verified");
                self.status = VerificationStatus::Succeeded;
                Some(Ok(AuthSession::new(
                    self.email.clone(),
                    response.session_token,
                )))
            }
            Err(err) => {
                warn!(error = ?err, "verification failed");
                self.status = VerificationStatus::Failed(err.to_string());
                Some(Err(err))
            }
        }
    }

    /// Starts a resend if the code expired and no resend is outstanding.
    /// Anything else is a no-op.
    pub fn begin_resend(&mut self) -> Option<PendingResend> {
        if self.torn_down || !self.resend_status().can_resend() {
            debug!(resend = ?self.resend_status(), "resend masked");
            return None;
        }

        self.resend_in_flight = true;
        self.notice = None;
        info!(email = %mask_email(&self.email), "requesting a new code");

        Some(PendingResend {
            ticket: Ticket(self.generation),
            request: ResendRequest {
                email: self.email.clone(),
            },
        })
    }

    /// Applies a resend answer. Returns `None` if the answer is stale.
    ///
    /// Success clears the cells, restarts the timer, drops any verification
    /// state and opens a new generation. Failure leaves the timer expired so the
    /// user can retry right away.
    pub fn finish_resend(
        &mut self,
        ticket: Ticket,
        result: Result<ResendResponse, ServiceError>,
    ) -> Option<Result<(), OtpError>> {
        if self.is_stale(ticket) || !self.resend_in_flight {
            debug!(?ticket, "dropping stale resend response");
            return None;
        }
        self.resend_in_flight = false;

        match result {
            Ok(ack) => {
                info!(dispatch_id = ?ack.dispatch_id, "new code sent");
                self.cells.reset();
                self.timer.reset();
                self.status = VerificationStatus::Idle;
                self.generation += 1;
                self.notice = Some(Notice::Success(RESENT_MESSAGE.to_string()));
                Some(Ok(()))
            }
            Err(source) => {
                warn!(error = %source, "resend failed");
                let err = OtpError::unavailable(Operation::Resend, source);
                self.notice = Some(Notice::Error(err.to_string()));
                Some(Err(err))
            }
        }
    }

    /// Marks the screen as dismissed; later answers are ignored.
    pub fn tear_down(&mut self) {
        self.torn_down = true;
    }

    #[must_use]
    pub fn view(&self) -> ScreenView {
        let error = match &self.notice {
            Some(Notice::Error(message)) => Some(message.clone()),
            _ => self.status.error_message().map(str::to_string),
        };
        let success = match (&self.status, &self.notice) {
            (VerificationStatus::Succeeded, _) => Some(VERIFIED_MESSAGE.to_string()),
            (_, Some(Notice::Success(message))) => Some(message.clone()),
            _ => None,
        };
        let inputs_enabled = self.inputs_enabled();

        ScreenView {
            masked_email: mask_email(&self.email),
            cells: self.cells.clone(),
            seconds_remaining: self.timer.seconds_remaining(),
            time_left: self.timer.format(),
            expired: self.timer.is_expired(),
            status: self.status.clone(),
            error,
            success,
            inputs_enabled,
            submit_enabled: inputs_enabled && self.cells.is_complete(),
            resend: self.resend_status(),
        }
    }

    fn is_stale(&self, ticket: Ticket) -> bool {
        self.torn_down || ticket.0 != self.generation
    }

    fn clear_failure(&mut self) {
        if matches!(self.status, VerificationStatus::Failed(_)) {
            self.status = VerificationStatus::Idle;
        }
    }
}
