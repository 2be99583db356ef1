//! Register, login and logout endpoints.
//!
//! Flow Overview:
//! 1) Parse the JSON body (malformed bodies are a 400, never a 5xx).
//! 2) Hand the credentials to the facade, which validates before calling the
//!    identity provider.
//! 3) Render the outcome or map the error taxonomy to a status code.

pub mod login;
pub mod logout;
pub mod register;
pub mod types;
