use crate::cli::{
    actions::{backend::Backend, login, serve, verify, Action},
    commands::{backend as args, CMD_LOGIN, CMD_SERVE, CMD_VERIFY},
};
use anyhow::{bail, Context, Result};

fn backend(matches: &clap::ArgMatches) -> Result<Backend> {
    Ok(Backend {
        api_base_url: matches
            .get_one::<String>(args::ARG_API_BASE_URL)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty()),
        request_timeout_seconds: matches
            .get_one::<u64>(args::ARG_REQUEST_TIMEOUT)
            .copied()
            .unwrap_or(10),
        otp_ttl_seconds: matches
            .get_one::<u32>(args::ARG_OTP_TTL)
            .copied()
            .context("missing required argument: --otp-ttl-seconds")?,
        simulated_code: matches
            .get_one::<String>(args::ARG_SIMULATED_CODE)
            .cloned()
            .context("missing required argument: --simulated-code")?,
        simulated_latency_ms: matches
            .get_one::<u64>(args::ARG_SIMULATED_LATENCY)
            .copied()
            .unwrap_or(2000),
    })
}

/// # Errors
/// Returns an error if required arguments are missing or the subcommand is unknown.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((CMD_LOGIN, sub)) => Ok(Action::Login(login::Args {
            backend: backend(sub)?,
        })),
        Some((CMD_VERIFY, sub)) => Ok(Action::Verify(verify::Args {
            email: sub
                .get_one::<String>("email")
                .map(|email| email.trim().to_string())
                .context("missing required argument: --email")?,
            backend: backend(sub)?,
        })),
        Some((CMD_SERVE, sub)) => Ok(Action::Serve(serve::Args {
            port: sub.get_one::<u16>("port").copied().unwrap_or(8080),
            backend: backend(sub)?,
        })),
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("missing command"),
    }
}
