use crate::{
    cli::actions::{backend::Backend, verify},
    login::{LoginForm, LoginStatus},
};
use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

#[derive(Debug)]
pub struct Args {
    pub backend: Backend,
}

/// Execute the login action: credentials first, then the code screen.
/// # Errors
/// Returns an error if the backend cannot be built or stdin fails.
pub async fn execute(args: Args) -> Result<()> {
    let services = args.backend.services()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut form = LoginForm::new();

    println!("Sign in to InvoicePro");

    let email = loop {
        let Some(username) = prompt(&mut lines, "Username: ").await? else {
            return Ok(());
        };
        form.set_username(username);
        form.blur_username();

        let Some(password) = prompt(&mut lines, "Password: ").await? else {
            return Ok(());
        };
        form.set_password(password);
        form.blur_password();

        if form.username_invalid() {
            println!("Username is required.");
        }
        if form.password_invalid() {
            println!("Password is required.");
        }

        if let Some(email) = form.submit(services.credentials.as_ref()).await {
            break email;
        }
        if let LoginStatus::Failed(message) = form.status() {
            println!("Error: {message}");
        }
    };

    let exit = verify::run_screen(&email, args.backend.otp_ttl_seconds, &services, &mut lines).await?;
    verify::report(&exit);

    Ok(())
}

async fn prompt<R>(lines: &mut Lines<R>, label: &str) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    print!("{label}");
    std::io::stdout().flush().context("failed to write prompt")?;
    lines.next_line().await.context("failed to read stdin")
}
