//! One-time-code email verification.
//!
//! The leaf modules hold plain state (cells, timer, status); [`screen`] composes
//! them and [`flow`] drives a screen against the verification and issuance
//! services.

pub mod cells;
pub mod email;
pub mod flow;
pub mod resend;
pub mod screen;
pub mod timer;
pub mod verification;

pub use self::{
    cells::{CodeCells, FocusCursor, CODE_LENGTH},
    email::{mask_email, valid_email},
    flow::{FlowExit, Input, OtpFlow, Render},
    resend::ResendStatus,
    screen::{Notice, OtpScreen, ScreenView},
    timer::{format_mm_ss, ExpiryTimer, DEFAULT_TTL_SECONDS},
    verification::{OtpError, VerificationStatus},
};
