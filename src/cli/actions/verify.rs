use crate::{
    cli::{
        actions::backend::{Backend, Services},
        terminal::{parse_line, Line, TerminalRenderer, HELP},
    },
    otp::{mask_email, valid_email, FlowExit, OtpFlow, OtpScreen},
};
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines},
    sync::mpsc,
};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub email: String,
    pub backend: Backend,
}

/// Execute the verify action.
/// # Errors
/// Returns an error if the email is invalid, the backend cannot be built, or stdin fails.
pub async fn execute(args: Args) -> Result<()> {
    if !valid_email(&args.email) {
        bail!("invalid email address: {}", mask_email(&args.email));
    }

    let services = args.backend.services()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let exit = run_screen(
        &args.email,
        args.backend.otp_ttl_seconds,
        &services,
        &mut lines,
    )
    .await?;
    report(&exit);

    Ok(())
}

/// Shows the verification screen for `email` and feeds it commands read from `lines`.
///
/// End of input dismisses the screen.
///
/// # Errors
/// Returns an error if reading input fails or the screen task dies.
pub async fn run_screen<R>(
    email: &str,
    ttl_seconds: u32,
    services: &Services,
    lines: &mut Lines<R>,
) -> Result<FlowExit>
where
    R: AsyncBufRead + Unpin,
{
    let (tx, rx) = mpsc::channel(16);
    let flow = OtpFlow::new(
        OtpScreen::new(email, ttl_seconds),
        Arc::clone(&services.verifier),
        Arc::clone(&services.issuer),
    );
    let mut handle = tokio::spawn(flow.run(rx, TerminalRenderer::new(std::io::stdout())));

    println!("Enter the code (h for help)");

    loop {
        tokio::select! {
            joined = &mut handle => {
                return joined.context("verification screen stopped unexpectedly");
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    debug!("stdin closed, dismissing");
                    if tx.send(crate::otp::Input::Dismiss).await.is_err() {
                        debug!("verification screen already closed");
                    }
                    return handle.await.context("verification screen stopped unexpectedly");
                };

                match parse_line(&line) {
                    Ok(Line::Help) => println!("{HELP}"),
                    Ok(Line::Inputs(inputs)) => {
                        for input in inputs {
                            // A closed channel means the screen already ended.
                            if tx.send(input).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(message) => eprintln!("{message}"),
                }
            }
        }
    }
}

/// Prints how the screen ended.
pub fn report(exit: &FlowExit) {
    match exit {
        FlowExit::Verified(session) => {
            println!("\nSigned in as {}", mask_email(&session.email));
            if session.has_token() {
                println!("Session token issued.");
            }
        }
        FlowExit::Dismissed => println!("\nVerification cancelled."),
    }
}
