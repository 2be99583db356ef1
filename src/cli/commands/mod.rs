pub mod logging;
pub mod provider;
pub mod vault;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

use self::provider::ARG_PROVIDER_API_KEY;
use self::vault::{ARG_VAULT_ROLE_ID, ARG_VAULT_SECRET_ID, ARG_VAULT_URL, ARG_VAULT_WRAPPED_TOKEN};

/// Check that the provider API key has a source.
///
/// Without Vault the key must come from `--provider-api-key`; with Vault the
/// `AppRole` credentials are required instead.
///
/// # Errors
/// Returns an error string naming the missing argument.
pub fn validate(matches: &clap::ArgMatches) -> Result<(), String> {
    if matches.contains_id(ARG_VAULT_URL) {
        if !matches.contains_id(ARG_VAULT_ROLE_ID) {
            return Err(format!(
                "Missing required argument: --{ARG_VAULT_ROLE_ID} (required with --{ARG_VAULT_URL})"
            ));
        }
        if !matches.contains_id(ARG_VAULT_SECRET_ID)
            && !matches.contains_id(ARG_VAULT_WRAPPED_TOKEN)
        {
            return Err(format!(
                "Missing required argument: --{ARG_VAULT_SECRET_ID} or --{ARG_VAULT_WRAPPED_TOKEN} (required with --{ARG_VAULT_URL})"
            ));
        }
    } else if !matches.contains_id(ARG_PROVIDER_API_KEY) {
        return Err(format!(
            "Missing required argument: --{ARG_PROVIDER_API_KEY} (or configure --{ARG_VAULT_URL})"
        ));
    }
    Ok(())
}

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

    let command = Command::new("authgate")
        .about("Credential facade over an external identity provider")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("AUTHGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("dsn")
                .short('d')
                .long("dsn")
                .help("Profile store connection string")
                .long_help("Postgres connection string for the profile store (see sql/schema.sql).")
                .env("AUTHGATE_DSN")
                .required(true),
        );

    let command = provider::with_args(command);
    let command = vault::with_args(command);
    logging::with_args(command)
}
