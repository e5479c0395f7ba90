//! Event loop driving an [`OtpScreen`].
//!
//! One task owns the screen and processes one event at a time: user input, the
//! once-per-second tick, or the completion of a service call. Service calls run
//! as separate tasks in a `JoinSet`, so awaiting them never blocks input; the
//! screen's in-flight flags mask retriggering. The tick is a single deadline that
//! advances by one period per tick and is dropped once the code expires. Time comes from
//! the tokio clock, so tests can run on paused time.
//!
//! When the loop ends (dismissed, input closed, or verified) the screen is torn
//! down and outstanding calls are aborted with the `JoinSet`.

use super::{
    screen::{OtpScreen, ScreenView, Ticket},
    timer::TICK,
};
use crate::service::{
    IssuanceService, ResendResponse, ServiceError, VerificationService, VerifyResponse,
};
use crate::session::AuthSession;
use std::sync::Arc;
use tokio::{
    sync::mpsc,
    task::JoinSet,
    time::{sleep_until, Instant},
};
use tracing::{debug, error, instrument};

/// A discrete user action on the screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// New content of one cell (empty clears it).
    Digit { index: usize, value: String },
    Backspace { index: usize },
    Focus { index: usize },
    Paste(String),
    Submit,
    Resend,
    Dismiss,
}

/// How the screen was left.
#[derive(Debug)]
pub enum FlowExit {
    Verified(AuthSession),
    Dismissed,
}

/// Receives a fresh view after every processed event.
pub trait Render {
    fn render(&mut self, view: &ScreenView);
}

impl<F> Render for F
where
    F: FnMut(&ScreenView),
{
    fn render(&mut self, view: &ScreenView) {
        self(view);
    }
}

enum Completion {
    Verify(Ticket, Result<VerifyResponse, ServiceError>),
    Resend(Ticket, Result<ResendResponse, ServiceError>),
}

pub struct OtpFlow {
    screen: OtpScreen,
    verifier: Arc<dyn VerificationService>,
    issuer: Arc<dyn IssuanceService>,
    calls: JoinSet<Completion>,
}

impl OtpFlow {
    #[must_use]
    pub fn new(
        screen: OtpScreen,
        verifier: Arc<dyn VerificationService>,
        issuer: Arc<dyn IssuanceService>,
    ) -> Self {
        Self {
            screen,
            verifier,
            issuer,
            calls: JoinSet::new(),
        }
    }

    #[must_use]
    pub fn screen(&self) -> &OtpScreen {
        &self.screen
    }

    /// Runs until the code is verified or the screen is dismissed.
    ///
    /// A closed input channel counts as a dismissal.
    #[instrument(skip_all, fields(email = %super::mask_email(self.screen.email())))]
    pub async fn run<R: Render>(
        mut self,
        mut inputs: mpsc::Receiver<Input>,
        mut renderer: R,
    ) -> FlowExit {
        let mut deadline = self.next_deadline();
        renderer.render(&self.screen.view());

        let exit = loop {
            let was_expired = self.screen.timer().is_expired();
            let exit = tokio::select! {
                input = inputs.recv() => match input {
                    None | Some(Input::Dismiss) => Some(FlowExit::Dismissed),
                    Some(input) => {
                        self.apply(input);
                        None
                    }
                },
                () = tick_at(deadline) => {
                    self.screen.tick();
                    // Keep the cadence anchored to the first deadline so a late
                    // poll never swallows a second.
                    deadline = deadline.map(|at| at + TICK);
                    None
                }
                Some(joined) = self.calls.join_next() => match joined {
                    Ok(completion) => self.complete(completion),
                    Err(err) => {
                        error!(error = %err, "service call task failed");
                        None
                    }
                },
            };

            // Ticking stops at expiry and resumes after a resend resets the timer.
            if self.screen.timer().is_expired() {
                deadline = None;
            } else if was_expired {
                deadline = self.next_deadline();
            }

            renderer.render(&self.screen.view());

            if let Some(exit) = exit {
                break exit;
            }
        };

        self.screen.tear_down();
        self.calls.abort_all();
        debug!(?exit, "verification screen closed");
        exit
    }

    fn next_deadline(&self) -> Option<Instant> {
        (!self.screen.timer().is_expired()).then(|| Instant::now() + TICK)
    }

    fn apply(&mut self, input: Input) {
        match input {
            Input::Digit { index, value } => {
                self.screen.set_digit(index, &value);
            }
            Input::Backspace { index } => self.screen.handle_backspace(index),
            Input::Focus { index } => self.screen.focus_on(index),
            Input::Paste(text) => {
                self.screen.handle_paste(&text);
            }
            Input::Submit => self.submit(),
            Input::Resend => self.resend(),
            Input::Dismiss => {}
        }
    }

    fn submit(&mut self) {
        match self.screen.begin_submit() {
            Ok(Some(pending)) => {
                let verifier = Arc::clone(&self.verifier);
                self.calls.spawn(async move {
                    let result = verifier.verify(&pending.request).await;
                    Completion::Verify(pending.ticket, result)
                });
            }
            Ok(None) => {}
            Err(err) => debug!(error = %err, "submit rejected locally"),
        }
    }

    fn resend(&mut self) {
        if let Some(pending) = self.screen.begin_resend() {
            let issuer = Arc::clone(&self.issuer);
            self.calls.spawn(async move {
                let result = issuer.resend(&pending.request).await;
                Completion::Resend(pending.ticket, result)
            });
        }
    }

    fn complete(&mut self, completion: Completion) -> Option<FlowExit> {
        match completion {
            Completion::Verify(ticket, result) => match self.screen.finish_submit(ticket, result)? {
                Ok(session) => Some(FlowExit::Verified(session)),
                Err(_) => None,
            },
            Completion::Resend(ticket, result) => {
                self.screen.finish_resend(ticket, result);
                None
            }
        }
    }
}

async fn tick_at(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::{
        resend::RESENT_MESSAGE,
        verification::{
            INCOMPLETE_CODE_MESSAGE, MISMATCH_MESSAGE, RESEND_UNAVAILABLE_MESSAGE,
            VERIFY_UNAVAILABLE_MESSAGE,
        },
        VerificationStatus,
    };
    use crate::service::{ResendRequest, VerifyRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::task::JoinHandle;

    const EMAIL: &str = "user@example.com";

    #[derive(Default)]
    struct FakeBackend {
        verify_calls: AtomicUsize,
        resend_calls: AtomicUsize,
        resend_down: AtomicBool,
    }

    #[async_trait]
    impl VerificationService for FakeBackend {
        async fn verify(&self, request: &VerifyRequest) -> Result<VerifyResponse, ServiceError> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(500)).await;
            match request.code.as_str() {
                "123456" => Ok(VerifyResponse {
                    verified: true,
                    message: None,
                    session_token: Some("tok".to_string()),
                }),
                "999999" => Err(ServiceError::Timeout("slow".to_string())),
                _ => Ok(VerifyResponse {
                    verified: false,
                    message: None,
                    session_token: None,
                }),
            }
        }
    }

    #[async_trait]
    impl IssuanceService for FakeBackend {
        async fn resend(&self, _request: &ResendRequest) -> Result<ResendResponse, ServiceError> {
            self.resend_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(200)).await;
            if self.resend_down.load(Ordering::SeqCst) {
                Err(ServiceError::Network("down".to_string()))
            } else {
                Ok(ResendResponse::default())
            }
        }
    }

    struct Harness {
        backend: Arc<FakeBackend>,
        inputs: mpsc::Sender<Input>,
        views: mpsc::UnboundedReceiver<ScreenView>,
        handle: JoinHandle<FlowExit>,
    }

    impl Harness {
        fn start(ttl_seconds: u32) -> Self {
            let backend = Arc::new(FakeBackend::default());
            let (inputs, rx) = mpsc::channel(16);
            let (views_tx, views) = mpsc::unbounded_channel();
            let flow = OtpFlow::new(
                OtpScreen::new(EMAIL, ttl_seconds),
                backend.clone(),
                backend.clone(),
            );
            let handle = tokio::spawn(flow.run(rx, move |view: &ScreenView| {
                let _ = views_tx.send(view.clone());
            }));
            Self {
                backend,
                inputs,
                views,
                handle,
            }
        }

        async fn send(&self, input: Input) {
            self.inputs.send(input).await.expect("flow stopped");
        }

        async fn wait_for(&mut self, mut predicate: impl FnMut(&ScreenView) -> bool) -> ScreenView {
            loop {
                let view = self.views.recv().await.expect("flow stopped rendering");
                if predicate(&view) {
                    return view;
                }
            }
        }

        fn verify_calls(&self) -> usize {
            self.backend.verify_calls.load(Ordering::SeqCst)
        }

        fn resend_calls(&self) -> usize {
            self.backend.resend_calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn digits_then_submit_verifies() {
        let mut harness = Harness::start(900);
        for (index, c) in "123456".chars().enumerate() {
            harness
                .send(Input::Digit {
                    index,
                    value: c.to_string(),
                })
                .await;
        }
        harness.send(Input::Submit).await;

        let view = harness
            .wait_for(|view| view.status == VerificationStatus::Succeeded)
            .await;
        assert_eq!(view.cells.current_code(), "123456");
        assert!(view.success.is_some());

        match (&mut harness.handle).await.expect("flow panicked") {
            FlowExit::Verified(session) => {
                assert_eq!(session.email, EMAIL);
                assert!(session.has_token());
            }
            FlowExit::Dismissed => panic!("expected verification"),
        }
        assert_eq!(harness.verify_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn incomplete_submit_never_calls_service() {
        let mut harness = Harness::start(900);
        harness.send(Input::Paste("12345".to_string())).await;
        harness.send(Input::Submit).await;

        let view = harness
            .wait_for(|view| matches!(view.status, VerificationStatus::Failed(_)))
            .await;
        assert_eq!(view.error.as_deref(), Some(INCOMPLETE_CODE_MESSAGE));
        assert_eq!(harness.verify_calls(), 0);

        harness.send(Input::Dismiss).await;
        assert!(matches!(
            (&mut harness.handle).await.expect("flow panicked"),
            FlowExit::Dismissed
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn mismatch_keeps_code_and_allows_resubmit() {
        let mut harness = Harness::start(900);
        harness.send(Input::Paste("000000".to_string())).await;
        harness.send(Input::Submit).await;
        // Duplicate submits while the first is outstanding are masked.
        harness.send(Input::Submit).await;

        let view = harness
            .wait_for(|view| matches!(view.status, VerificationStatus::Failed(_)))
            .await;
        assert_eq!(view.error.as_deref(), Some(MISMATCH_MESSAGE));
        assert_eq!(view.cells.current_code(), "000000");
        assert!(view.inputs_enabled);
        assert_eq!(harness.verify_calls(), 1);

        harness.send(Input::Paste("123456".to_string())).await;
        harness.send(Input::Submit).await;
        assert!(matches!(
            (&mut harness.handle).await.expect("flow panicked"),
            FlowExit::Verified(_)
        ));
        assert_eq!(harness.verify_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn service_failure_is_reported_separately() {
        let mut harness = Harness::start(900);
        harness.send(Input::Paste("999999".to_string())).await;
        harness.send(Input::Submit).await;

        let view = harness
            .wait_for(|view| matches!(view.status, VerificationStatus::Failed(_)))
            .await;
        assert_eq!(view.error.as_deref(), Some(VERIFY_UNAVAILABLE_MESSAGE));
        assert_eq!(view.cells.current_code(), "999999");
        harness.send(Input::Dismiss).await;
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_once_per_second_and_stops_at_zero() {
        let mut harness = Harness::start(3);
        let mut seen = Vec::new();
        let view = harness
            .wait_for(|view| {
                seen.push(view.seconds_remaining);
                view.expired
            })
            .await;
        assert_eq!(view.seconds_remaining, 0);
        seen.dedup();
        assert_eq!(seen, vec![3, 2, 1, 0]);

        // No further ticks once expired: time can pass freely.
        tokio::time::sleep(Duration::from_secs(10)).await;
        harness.send(Input::Focus { index: 2 }).await;
        let view = harness.wait_for(|_| true).await;
        assert_eq!(view.seconds_remaining, 0);
        assert!(view.expired);
        harness.send(Input::Dismiss).await;
    }

    #[tokio::test(start_paused = true)]
    async fn input_at_each_deadline_never_drops_a_tick() {
        let mut harness = Harness::start(900);
        harness.wait_for(|view| view.seconds_remaining == 900).await;
        let started = Instant::now();

        for _ in 0..100 {
            tokio::time::advance(TICK).await;
            harness.send(Input::Focus { index: 0 }).await;
        }

        harness.wait_for(|view| view.seconds_remaining == 800).await;
        assert!(
            started.elapsed() <= Duration::from_secs(100),
            "800 seconds left only after {:?}",
            started.elapsed()
        );
        harness.send(Input::Dismiss).await;
    }

    #[tokio::test(start_paused = true)]
    async fn resend_before_expiry_does_nothing() {
        let mut harness = Harness::start(900);
        harness.send(Input::Paste("12".to_string())).await;
        harness.send(Input::Resend).await;
        let view = harness
            .wait_for(|view| view.cells.current_code() == "12")
            .await;
        assert!(!view.resend.allowed);
        assert_eq!(view.success, None);
        harness.send(Input::Dismiss).await;
        (&mut harness.handle).await.expect("flow panicked");
        assert_eq!(harness.resend_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn resend_after_expiry_resets_cells_and_timer() {
        let mut harness = Harness::start(2);
        harness.send(Input::Paste("000000".to_string())).await;
        harness.wait_for(|view| view.expired).await;

        harness.send(Input::Resend).await;
        let view = harness.wait_for(|view| view.success.is_some()).await;
        assert_eq!(view.success.as_deref(), Some(RESENT_MESSAGE));
        assert_eq!(view.cells.current_code(), "");
        assert_eq!(view.cells.focus().index(), 0);
        assert_eq!(view.seconds_remaining, 2);
        assert!(!view.expired);
        assert!(!view.resend.allowed);
        assert_eq!(harness.resend_calls(), 1);

        // The clock runs again after the reset.
        let view = harness.wait_for(|view| view.seconds_remaining == 1).await;
        assert!(!view.expired);
        harness.send(Input::Dismiss).await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_resend_can_be_retried_immediately() {
        let mut harness = Harness::start(1);
        harness.backend.resend_down.store(true, Ordering::SeqCst);
        harness.wait_for(|view| view.expired).await;

        harness.send(Input::Resend).await;
        let view = harness.wait_for(|view| view.error.is_some()).await;
        assert_eq!(view.error.as_deref(), Some(RESEND_UNAVAILABLE_MESSAGE));
        assert!(view.expired);
        assert!(view.resend.can_resend());

        harness.backend.resend_down.store(false, Ordering::SeqCst);
        harness.send(Input::Resend).await;
        let view = harness.wait_for(|view| view.success.is_some()).await;
        assert!(!view.expired);
        assert_eq!(harness.resend_calls(), 2);
        harness.send(Input::Dismiss).await;
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_drops_outstanding_verification() {
        let mut harness = Harness::start(900);
        harness.send(Input::Paste("123456".to_string())).await;
        harness.send(Input::Submit).await;
        harness
            .wait_for(|view| view.status == VerificationStatus::Submitting)
            .await;
        harness.send(Input::Dismiss).await;

        assert!(matches!(
            (&mut harness.handle).await.expect("flow panicked"),
            FlowExit::Dismissed
        ));
        assert!(harness.verify_calls() <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_channel_dismisses() {
        let Harness { inputs, handle, .. } = Harness::start(900);
        drop(inputs);
        assert!(matches!(
            handle.await.expect("flow panicked"),
            FlowExit::Dismissed
        ));
    }
}
