//! In-process identity provider used by unit tests.

use super::{Identity, IdentityProvider, ProviderError, Session};
use crate::BoxFuture;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};
use ulid::Ulid;

const TOKEN_TTL_SECONDS: u64 = 3600;

struct Account {
    user_id: String,
    password: String,
    display_name: String,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    revoked: HashSet<String>,
}

#[derive(Default)]
pub(crate) struct MemoryProvider {
    state: Mutex<State>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryProvider {
    /// Number of provider calls made so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail as an upstream outage.
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn begin(&self) -> Result<std::sync::MutexGuard<'_, State>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::Upstream {
                status: 503,
                message: "UNAVAILABLE".to_string(),
            });
        }
        self.state.lock().map_err(|_| ProviderError::Upstream {
            status: 500,
            message: "poisoned".to_string(),
        })
    }

    fn sign_up_sync(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Session, ProviderError> {
        let mut state = self.begin()?;
        if state.accounts.contains_key(email) {
            return Err(ProviderError::EmailExists);
        }
        let user_id = Ulid::new().to_string();
        state.accounts.insert(
            email.to_string(),
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
                display_name: display_name.to_string(),
            },
        );
        Ok(issue(&mut state, &user_id, email))
    }

    fn sign_in_sync(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        let mut state = self.begin()?;
        let user_id = match state.accounts.get(email) {
            Some(account) if account.password == password => account.user_id.clone(),
            Some(_) => return Err(ProviderError::InvalidCredentials("INVALID_PASSWORD".into())),
            None => return Err(ProviderError::InvalidCredentials("EMAIL_NOT_FOUND".into())),
        };
        Ok(issue(&mut state, &user_id, email))
    }

    fn lookup_sync(&self, token: &str) -> Result<Identity, ProviderError> {
        let state = self.begin()?;
        if state.revoked.contains(token) {
            return Err(ProviderError::InvalidToken);
        }
        let email = state.tokens.get(token).ok_or(ProviderError::InvalidToken)?;
        let account = state.accounts.get(email).ok_or(ProviderError::InvalidToken)?;
        Ok(Identity {
            user_id: account.user_id.clone(),
            email: email.clone(),
            display_name: Some(account.display_name.clone()),
        })
    }

    fn set_display_name_sync(&self, token: &str, display_name: &str) -> Result<(), ProviderError> {
        let mut state = self.begin()?;
        if state.revoked.contains(token) {
            return Err(ProviderError::InvalidToken);
        }
        let email = state.tokens.get(token).cloned().ok_or(ProviderError::InvalidToken)?;
        let account = state.accounts.get_mut(&email).ok_or(ProviderError::InvalidToken)?;
        account.display_name = display_name.to_string();
        Ok(())
    }

    fn revoke_sync(&self, token: &str) -> Result<(), ProviderError> {
        let mut state = self.begin()?;
        if state.revoked.contains(token) || !state.tokens.contains_key(token) {
            return Err(ProviderError::InvalidToken);
        }
        state.revoked.insert(token.to_string());
        Ok(())
    }
}

fn issue(state: &mut State, user_id: &str, email: &str) -> Session {
    let token = format!("tok-{}", Ulid::new());
    state.tokens.insert(token.clone(), email.to_string());
    Session {
        user_id: user_id.to_string(),
        email: email.to_string(),
        token,
        expires_in: Some(TOKEN_TTL_SECONDS),
    }
}

impl IdentityProvider for MemoryProvider {
    fn sign_up<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
        display_name: &'a str,
    ) -> BoxFuture<'a, Result<Session, ProviderError>> {
        Box::pin(async move { self.sign_up_sync(email, password, display_name) })
    }

    fn sign_in<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<Session, ProviderError>> {
        Box::pin(async move { self.sign_in_sync(email, password) })
    }

    fn lookup<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Identity, ProviderError>> {
        Box::pin(async move { self.lookup_sync(token) })
    }

    fn revoke<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move { self.revoke_sync(token) })
    }

    fn set_display_name<'a>(
        &'a self,
        token: &'a str,
        display_name: &'a str,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move { self.set_display_name_sync(token, display_name) })
    }
}
