use super::{Identity, IdentityProvider, ProviderError, Session};
use crate::{APP_USER_AGENT, BoxFuture};
use anyhow::{Context, Result, anyhow};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{Instrument, debug, info_span, instrument};
use url::Url;

const SIGN_UP: &str = "signUp";
const SIGN_IN: &str = "signInWithPassword";
const LOOKUP: &str = "lookup";
const REVOKE: &str = "revoke";
const UPDATE: &str = "update";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
}

/// HTTP client for an Identity Toolkit style provider (`/v1/accounts:*`).
pub struct ToolkitProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    service_token: Option<SecretString>,
}

impl std::fmt::Debug for ToolkitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolkitProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("service_token", &self.service_token.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

impl ToolkitProvider {
    /// Build a provider client rooted at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the base URL is not http(s) or the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        service_token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .with_context(|| format!("Invalid identity provider URL: {base_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Identity provider URL must use http or https: {base_url}"
            ));
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build identity provider HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            service_token,
        })
    }

    fn endpoint(&self, method: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&format!("{}/v1/accounts:{method}", self.base_url))
            .map_err(|e| ProviderError::InvalidResponse(format!("bad endpoint URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, ProviderError> {
        let url = self.endpoint(method)?;

        // never record the URL, it carries the API key
        let span = info_span!(
            "provider.request",
            http.method = "POST",
            provider.method = method
        );

        let mut request = self.client.post(url).json(&body);
        if let Some(token) = &self.service_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().instrument(span).await?;
        let status = response.status();

        if !status.is_success() {
            let json_response: Value = response.json().await.unwrap_or(Value::Null);
            let message = json_response["error"]["message"]
                .as_str()
                .unwrap_or_default();

            debug!("provider {} failed: {} {}", method, status, message);

            return Err(classify(status, message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

/// Map a provider error message onto the error taxonomy.
///
/// Messages look like `CODE` or `CODE : human readable detail`.
pub(crate) fn classify(status: StatusCode, message: &str) -> ProviderError {
    let code = message.split(" : ").next().unwrap_or_default().trim();

    match code {
        "EMAIL_EXISTS" => ProviderError::EmailExists,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            ProviderError::InvalidCredentials(code.to_string())
        }
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "TOKEN_REVOKED" | "USER_NOT_FOUND" => {
            ProviderError::InvalidToken
        }
        "INVALID_EMAIL" | "WEAK_PASSWORD" | "MISSING_PASSWORD" => {
            ProviderError::Rejected(code.to_string())
        }
        _ => ProviderError::Upstream {
            status: status.as_u16(),
            message: message.to_string(),
        },
    }
}

fn into_session(response: TokenResponse, email: &str) -> Result<Session, ProviderError> {
    if response.local_id.is_empty() {
        return Err(ProviderError::InvalidResponse("empty localId".to_string()));
    }

    if response.id_token.is_empty() {
        return Err(ProviderError::InvalidResponse("empty idToken".to_string()));
    }

    Ok(Session {
        user_id: response.local_id,
        email: response.email.unwrap_or_else(|| email.to_string()),
        token: response.id_token,
        expires_in: response
            .expires_in
            .and_then(|seconds| seconds.trim().parse::<u64>().ok()),
    })
}

impl IdentityProvider for ToolkitProvider {
    fn sign_up<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
        display_name: &'a str,
    ) -> BoxFuture<'a, Result<Session, ProviderError>> {
        Box::pin(sign_up(self, email, password, display_name))
    }

    fn sign_in<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<Session, ProviderError>> {
        Box::pin(sign_in(self, email, password))
    }

    fn lookup<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Identity, ProviderError>> {
        Box::pin(lookup(self, token))
    }

    fn revoke<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(revoke(self, token))
    }

    fn set_display_name<'a>(
        &'a self,
        token: &'a str,
        display_name: &'a str,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(set_display_name(self, token, display_name))
    }
}

#[instrument(skip(provider, password))]
async fn sign_up(
    provider: &ToolkitProvider,
    email: &str,
    password: &str,
    display_name: &str,
) -> Result<Session, ProviderError> {
    let body = json!({
        "email": email,
        "password": password,
        "displayName": display_name,
        "returnSecureToken": true,
    });

    let response: TokenResponse = provider.call(SIGN_UP, body).await?;

    into_session(response, email)
}

#[instrument(skip(provider, password))]
async fn sign_in(
    provider: &ToolkitProvider,
    email: &str,
    password: &str,
) -> Result<Session, ProviderError> {
    let body = json!({
        "email": email,
        "password": password,
        "returnSecureToken": true,
    });

    let response: TokenResponse = provider.call(SIGN_IN, body).await?;

    into_session(response, email)
}

#[instrument(skip_all)]
async fn lookup(provider: &ToolkitProvider, token: &str) -> Result<Identity, ProviderError> {
    let response: LookupResponse = provider.call(LOOKUP, json!({ "idToken": token })).await?;

    // an empty user list means the token no longer maps to an account
    let user = response
        .users
        .into_iter()
        .next()
        .ok_or(ProviderError::InvalidToken)?;

    Ok(Identity {
        user_id: user.local_id,
        email: user.email.unwrap_or_default(),
        display_name: user.display_name,
    })
}

#[instrument(skip_all)]
async fn revoke(provider: &ToolkitProvider, token: &str) -> Result<(), ProviderError> {
    let _: Value = provider.call(REVOKE, json!({ "idToken": token })).await?;

    Ok(())
}

#[instrument(skip(provider, token))]
async fn set_display_name(
    provider: &ToolkitProvider,
    token: &str,
    display_name: &str,
) -> Result<(), ProviderError> {
    let body = json!({
        "idToken": token,
        "displayName": display_name,
        "returnSecureToken": false,
    });

    let _: Value = provider.call(UPDATE, body).await?;

    Ok(())
}
