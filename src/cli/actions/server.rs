use crate::{
    api,
    cli::{commands::vault::Options as VaultOptions, globals::GlobalArgs},
    credentials::CredentialFacade,
    profile::PgProfileStore,
    provider::ToolkitProvider,
    vault,
};
use anyhow::{Context, Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub provider_url: String,
    pub provider_api_key: Option<SecretString>,
    pub provider_service_token: Option<SecretString>,
    pub provider_timeout_seconds: u64,
    pub vault: Option<VaultOptions>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if Vault login fails, the provider secrets cannot be
/// resolved, the profile store is unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let mut globals = GlobalArgs::new();

    match &args.vault {
        Some(vault_opts) => {
            let token = vault_login(vault_opts).await?;
            let secrets = vault::kv::read_provider_secrets(
                &vault_opts.url,
                &token,
                &vault_opts.kv_mount,
                &vault_opts.kv_path,
            )
            .await
            .context("Could not read identity provider credentials from Vault")?;

            // Vault values replace the flags; a flag-only service token still applies
            let service_token = secrets.service_token.or(args.provider_service_token);
            globals.set_provider_secrets(secrets.api_key, service_token);
        }
        None => {
            let api_key = args
                .provider_api_key
                .ok_or_else(|| anyhow!("Identity provider API key is required"))?;
            globals.set_provider_secrets(api_key, args.provider_service_token);
        }
    }

    debug!("Global args: {:?}", globals);

    let provider = ToolkitProvider::new(
        &args.provider_url,
        globals.provider_api_key.clone(),
        globals.provider_service_token.clone(),
        Duration::from_secs(args.provider_timeout_seconds),
    )?;

    let profiles = PgProfileStore::connect(&args.dsn).await?;

    info!(provider_url = %args.provider_url, "Credential facade ready");

    let facade = Arc::new(CredentialFacade::new(
        Arc::new(provider),
        Arc::new(profiles),
    ));

    let result = api::new(args.port, facade).await;

    crate::cli::telemetry::shutdown_tracer();

    result
}

/// `AppRole` login, unwrapping the secret-id first when a wrapped token is given.
async fn vault_login(opts: &VaultOptions) -> Result<SecretString> {
    let secret_id = if let Some(wrapped) = &opts.wrapped_token {
        vault::unwrap(&opts.url, wrapped.expose_secret())
            .await
            .context("Could not unwrap Vault secret-id")?
    } else {
        opts.secret_id
            .as_ref()
            .map(|sid| sid.expose_secret().to_string())
            .ok_or_else(|| anyhow!("Vault secret-id is required"))?
    };

    let (token, lease_duration) = vault::approle_login(&opts.url, &secret_id, &opts.role_id)
        .await
        .context("Vault AppRole login failed")?;

    debug!("Vault token lease duration: {lease_duration}s");

    Ok(SecretString::from(token))
}
