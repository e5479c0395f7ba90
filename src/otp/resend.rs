//! Resend gating.

pub const RESENT_MESSAGE: &str = "New OTP has been sent to your email!";

/// Snapshot of the resend affordance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResendStatus {
    /// Mirrors timer expiry.
    pub allowed: bool,
    pub in_flight: bool,
}

impl ResendStatus {
    /// The resend link is clickable.
    #[must_use]
    pub fn can_resend(self) -> bool {
        self.allowed && !self.in_flight
    }
}
