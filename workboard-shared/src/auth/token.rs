//! Session token
//!
//! The backend issues an opaque token at login/signup. The client sends it
//! back as `Authorization: Token <token>` and never inspects it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization scheme expected by the backend
pub const AUTH_SCHEME: &str = "Token";

/// Opaque credential proving an authenticated identity
///
/// `Debug` output is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token string
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        format!("{} {}", AUTH_SCHEME, self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}
