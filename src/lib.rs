//! # Authgate (credential facade)
//!
//! `authgate` is a thin authentication service. It validates inbound
//! credentials, delegates registration, sign-in and token revocation to an
//! external identity provider, and keeps profile metadata in a document store.
//!
//! ## Delegation
//!
//! The service never stores passwords and never signs tokens. Session tokens
//! are minted by the identity provider and are opaque here; logout asks the
//! provider to revoke them and every later use is checked by the provider.
//!
//! ## Profiles
//!
//! Each user owns one profile document keyed by the provider-assigned user id.
//! The document carries the display attributes (`alias`, `profile_image`) plus
//! immutable metadata written at registration time. Users are never deleted by
//! this service.

pub mod api;
pub mod cli;
pub mod credentials;
pub mod profile;
pub mod provider;
pub mod vault;

use std::{future::Future, pin::Pin};

/// Boxed future returned by the object-safe client traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
