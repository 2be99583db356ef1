use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_PROVIDER_URL: &str = "provider-url";
pub const ARG_PROVIDER_API_KEY: &str = "provider-api-key";
pub const ARG_PROVIDER_SERVICE_TOKEN: &str = "provider-service-token";
pub const ARG_PROVIDER_TIMEOUT_SECONDS: &str = "provider-timeout-seconds";

pub const DEFAULT_PROVIDER_URL: &str = "https://identitytoolkit.googleapis.com";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PROVIDER_URL)
                .long(ARG_PROVIDER_URL)
                .help("Identity provider base URL")
                .env("AUTHGATE_PROVIDER_URL")
                .default_value(DEFAULT_PROVIDER_URL),
        )
        .arg(
            Arg::new(ARG_PROVIDER_API_KEY)
                .long(ARG_PROVIDER_API_KEY)
                .help("Identity provider API key (read from Vault when --vault-url is set)")
                .env("AUTHGATE_PROVIDER_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_PROVIDER_SERVICE_TOKEN)
                .long(ARG_PROVIDER_SERVICE_TOKEN)
                .help("Service account bearer token sent to the identity provider")
                .env("AUTHGATE_PROVIDER_SERVICE_TOKEN")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_PROVIDER_TIMEOUT_SECONDS)
                .long(ARG_PROVIDER_TIMEOUT_SECONDS)
                .help("Request timeout for identity provider calls")
                .env("AUTHGATE_PROVIDER_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub url: String,
    pub api_key: Option<SecretString>,
    pub service_token: Option<SecretString>,
    pub timeout_seconds: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if a defaulted argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<String>(ARG_PROVIDER_URL)
            .cloned()
            .context("missing required argument: --provider-url")?;

        let secret = |id: &str| {
            matches
                .get_one::<String>(id)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(|value| SecretString::from(value.to_string()))
        };

        Ok(Self {
            url,
            api_key: secret(ARG_PROVIDER_API_KEY),
            service_token: secret(ARG_PROVIDER_SERVICE_TOKEN),
            timeout_seconds: matches
                .get_one::<u64>(ARG_PROVIDER_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(10),
        })
    }
}
