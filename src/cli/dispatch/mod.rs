//! Map validated CLI arguments to an action.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{provider, vault};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    crate::cli::commands::validate(matches).map_err(|e| anyhow::anyhow!(e))?;

    let provider_opts = provider::Options::parse(matches)?;
    let vault_opts = vault::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        provider_url: provider_opts.url,
        provider_api_key: provider_opts.api_key,
        provider_service_token: provider_opts.service_token,
        provider_timeout_seconds: provider_opts.timeout_seconds,
        vault: vault_opts,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const DSN: &str = "postgres://user@localhost:5432/authgate";

    #[test]
    fn provider_api_key_required_without_vault() {
        temp_env::with_vars(
            [
                ("AUTHGATE_DSN", Some(DSN)),
                ("AUTHGATE_PROVIDER_API_KEY", None),
                ("AUTHGATE_VAULT_URL", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["authgate"]);
                let result = handler(&matches);
                assert!(result.is_err());
                if let Err(err) = result {
                    assert!(err.to_string().contains("--provider-api-key"));
                }
            },
        );
    }

    #[test]
    fn server_args_from_env() {
        temp_env::with_vars(
            [
                ("AUTHGATE_DSN", Some(DSN)),
                ("AUTHGATE_PORT", Some("9000")),
                ("AUTHGATE_PROVIDER_API_KEY", Some("api-key")),
                ("AUTHGATE_PROVIDER_SERVICE_TOKEN", None),
                ("AUTHGATE_PROVIDER_URL", None),
                ("AUTHGATE_PROVIDER_TIMEOUT_SECONDS", None),
                ("AUTHGATE_VAULT_URL", None),
                ("AUTHGATE_VAULT_ROLE_ID", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["authgate"]);
                let result = handler(&matches);
                assert!(result.is_ok());
                if let Ok(Action::Server(args)) = result {
                    assert_eq!(args.port, 9000);
                    assert_eq!(args.dsn, DSN);
                    assert_eq!(args.provider_url, provider::DEFAULT_PROVIDER_URL);
                    assert_eq!(args.provider_timeout_seconds, 10);
                    assert_eq!(
                        args.provider_api_key
                            .as_ref()
                            .map(|key| key.expose_secret().to_string()),
                        Some("api-key".to_string())
                    );
                    assert!(args.provider_service_token.is_none());
                    assert!(args.vault.is_none());
                }
            },
        );
    }

    #[test]
    fn vault_options_from_env() {
        temp_env::with_vars(
            [
                ("AUTHGATE_DSN", Some(DSN)),
                ("AUTHGATE_PROVIDER_API_KEY", None),
                (
                    "AUTHGATE_VAULT_URL",
                    Some("http://127.0.0.1:8200/v1/auth/approle/login"),
                ),
                ("AUTHGATE_VAULT_ROLE_ID", Some("role-id")),
                ("AUTHGATE_VAULT_SECRET_ID", None),
                ("AUTHGATE_VAULT_WRAPPED_TOKEN", Some("wrapped")),
                ("AUTHGATE_VAULT_KV_PATH", Some("authgate/prod")),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["authgate"]);
                let result = handler(&matches);
                assert!(result.is_ok());
                if let Ok(Action::Server(args)) = result {
                    let vault = args.vault;
                    assert!(vault.is_some());
                    if let Some(vault) = vault {
                        assert_eq!(vault.role_id, "role-id");
                        assert!(vault.secret_id.is_none());
                        assert!(vault.wrapped_token.is_some());
                        assert_eq!(vault.kv_mount, "secret");
                        assert_eq!(vault.kv_path, "authgate/prod");
                    }
                }
            },
        );
    }
}
