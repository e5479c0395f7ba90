pub mod backend;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const CMD_LOGIN: &str = "login";
pub const CMD_VERIFY: &str = "verify";
pub const CMD_SERVE: &str = "serve";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("invoicepro")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_LOGIN).about("Sign in, then verify the email address with a code"),
        )
        .subcommand(
            Command::new(CMD_VERIFY)
                .about("Verify an email address with a code")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Address the code was sent to")
                        .env("INVOICEPRO_EMAIL")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new(CMD_SERVE)
                .about("Serve the simulated backend over HTTP for local development")
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .help("Port to listen on")
                        .default_value("8080")
                        .env("INVOICEPRO_PORT")
                        .value_parser(clap::value_parser!(u16)),
                ),
        );

    let command = backend::with_args(command);
    logging::with_args(command)
}
