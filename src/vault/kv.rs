use crate::vault;
use anyhow::{Context, Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::fmt;
use tracing::{Instrument, info_span, instrument};

const PROVIDER_API_KEY_FIELD: &str = "provider_api_key";
const PROVIDER_SERVICE_TOKEN_FIELD: &str = "provider_service_token";

/// Identity provider credentials kept in Vault.
pub struct ProviderSecrets {
    pub api_key: SecretString,
    pub service_token: Option<SecretString>,
}

impl fmt::Debug for ProviderSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSecrets")
            .field("api_key", &"***")
            .field(
                "service_token",
                &self.service_token.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

/// Read the provider credentials from the KV v2 secret at `kv_mount`/`kv_path`.
/// # Errors
/// Returns an error if the Vault request fails or the API key is missing.
#[instrument(skip(vault_token))]
pub async fn read_provider_secrets(
    vault_url: &str,
    vault_token: &SecretString,
    kv_mount: &str,
    kv_path: &str,
) -> Result<ProviderSecrets> {
    let client = vault::client()?;
    let path = format!("/v1/{kv_mount}/data/{kv_path}");
    let url = vault::endpoint_url(vault_url, &path)?;

    let span = info_span!(
        "vault.kv.read",
        http.method = "GET",
        url = %url
    );
    let response = client
        .get(&url)
        .header("X-Vault-Token", vault_token.expose_secret())
        .send()
        .instrument(span)
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let json_response: Value = response.json().await.unwrap_or(Value::Null);
        return Err(anyhow!(
            "vault kv read failed: {status} {}",
            vault::vault_error_message(&json_response)
        ));
    }

    let json: Value = response.json().await?;
    let data = json
        .get("data")
        .and_then(|data| data.get("data"))
        .context("secret data missing from vault response")?;

    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| SecretString::from(value.to_string()))
    };

    let api_key = field(PROVIDER_API_KEY_FIELD)
        .with_context(|| format!("{PROVIDER_API_KEY_FIELD} missing from vault secret"))?;

    Ok(ProviderSecrets {
        api_key,
        service_token: field(PROVIDER_SERVICE_TOKEN_FIELD),
    })
}
