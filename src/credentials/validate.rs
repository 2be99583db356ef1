//! Input checks run before any provider or store call.

use super::AuthError;
use regex::Regex;
use url::Url;

pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MIN_ALIAS_CHARS: usize = 3;
pub const MAX_ALIAS_CHARS: usize = 20;

/// Normalize an email for provider calls and profile documents.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

#[must_use]
pub fn valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
}

/// Aliases are 3-20 characters of ASCII letters, digits, `-` or `_`.
#[must_use]
pub fn valid_alias(alias: &str) -> bool {
    let len = alias.chars().count();
    (MIN_ALIAS_CHARS..=MAX_ALIAS_CHARS).contains(&len)
        && alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Profile images must be absolute http(s) URLs.
#[must_use]
pub fn valid_profile_image(image: &str) -> bool {
    Url::parse(image).is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

pub(super) fn check_email(email: &str) -> Result<(), AuthError> {
    if valid_email(email) {
        Ok(())
    } else {
        Err(AuthError::Validation("Invalid email".to_string()))
    }
}

pub(super) fn check_password(password: &str) -> Result<(), AuthError> {
    if valid_password(password) {
        Ok(())
    } else {
        Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )))
    }
}

pub(super) fn check_alias(alias: &str) -> Result<(), AuthError> {
    if valid_alias(alias) {
        Ok(())
    } else {
        Err(AuthError::Validation(format!(
            "Alias must be {MIN_ALIAS_CHARS}-{MAX_ALIAS_CHARS} characters of letters, digits, '-' or '_'"
        )))
    }
}

/// Empty input clears the image (`Ok(None)`).
pub(super) fn check_profile_image(image: &str) -> Result<Option<String>, AuthError> {
    let image = image.trim();
    if image.is_empty() {
        return Ok(None);
    }
    if valid_profile_image(image) {
        Ok(Some(image.to_string()))
    } else {
        Err(AuthError::Validation(
            "Profile image must be an http(s) URL".to_string(),
        ))
    }
}
