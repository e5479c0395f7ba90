use crate::service::simulated::DEFAULT_ACCEPTED_CODE;
use clap::{Arg, Command};

pub const ARG_API_BASE_URL: &str = "api-base-url";
pub const ARG_REQUEST_TIMEOUT: &str = "request-timeout-seconds";
pub const ARG_OTP_TTL: &str = "otp-ttl-seconds";
pub const ARG_SIMULATED_CODE: &str = "simulated-code";
pub const ARG_SIMULATED_LATENCY: &str = "simulated-latency-ms";

/// Backend selection shared by every subcommand.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_BASE_URL)
                .long(ARG_API_BASE_URL)
                .help("InvoicePro API base URL, example: https://api.invoicepro.io")
                .long_help(
                    "InvoicePro API base URL. When not set, an in-process simulated backend is used.",
                )
                .env("INVOICEPRO_API_BASE_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT)
                .long(ARG_REQUEST_TIMEOUT)
                .help("Timeout in seconds for each API call")
                .default_value("10")
                .env("INVOICEPRO_REQUEST_TIMEOUT_SECONDS")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_OTP_TTL)
                .long(ARG_OTP_TTL)
                .help("Seconds before an issued code expires and resend becomes available")
                .default_value("900")
                .env("INVOICEPRO_OTP_TTL_SECONDS")
                .global(true)
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_SIMULATED_CODE)
                .long(ARG_SIMULATED_CODE)
                .help("Code accepted by the simulated backend")
                .default_value(DEFAULT_ACCEPTED_CODE)
                .env("INVOICEPRO_SIMULATED_CODE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SIMULATED_LATENCY)
                .long(ARG_SIMULATED_LATENCY)
                .help("Verify latency of the simulated backend in milliseconds, resend takes half")
                .default_value("2000")
                .env("INVOICEPRO_SIMULATED_LATENCY_MS")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
}
