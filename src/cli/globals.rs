use secrecy::SecretString;

/// Identity provider secrets resolved at startup, either from flags or from Vault.
#[derive(Clone, Default)]
pub struct GlobalArgs {
    pub provider_api_key: SecretString,
    pub provider_service_token: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_provider_secrets(
        &mut self,
        api_key: SecretString,
        service_token: Option<SecretString>,
    ) {
        self.provider_api_key = api_key;
        self.provider_service_token = service_token;
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("provider_api_key", &"***")
            .field(
                "provider_service_token",
                &self.provider_service_token.as_ref().map(|_| "***"),
            )
            .finish()
    }
}
