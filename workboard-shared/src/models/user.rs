//! User model and authentication payloads
//!
//! Users are owned by the backend. Within a session a fetched user is never
//! mutated; a fresh identity replaces the old one wholesale.
//!
//! # Wire format
//!
//! ```json
//! { "id": 7, "username": "ada", "email": "ada@example.com",
//!   "first_name": "Ada", "last_name": "Lovelace" }
//! ```
//!
//! Login and signup answer with a flattened identity plus the session token:
//!
//! ```json
//! { "token": "9944b091...", "user_id": 7, "username": "ada",
//!   "email": "ada@example.com" }
//! ```

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::UserId;

/// A Workboard account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user ID
    pub id: UserId,

    /// Login name
    pub username: String,

    /// Email address (unique, case-insensitive on the backend)
    #[serde(default)]
    pub email: String,

    /// Optional given name
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::empty_as_none")]
    pub first_name: Option<String>,

    /// Optional family name
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::empty_as_none")]
    pub last_name: Option<String>,
}

impl User {
    /// Creates a user with only the required identity fields
    pub fn new(id: UserId, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
        }
    }

    /// Returns the full name when the backend knows it, else the username
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.username.clone(),
        }
    }
}

/// Login request body for `POST /login/`
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "Please provide both username and password"))]
    pub username: String,

    /// Password
    #[validate(length(min = 1, message = "Please provide both username and password"))]
    pub password: String,
}

impl LoginRequest {
    /// Builds a login request, trimming the username
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            password: password.to_string(),
        }
    }
}

/// Signup request body for `POST /signup/`
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SignupRequest {
    /// Desired username
    #[validate(length(min = 1, max = 150, message = "Username is required"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl SignupRequest {
    /// Builds a signup request, trimming username and email
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }
}

/// Response of `POST /login/` and `POST /signup/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Session token (signup may omit it)
    #[serde(default)]
    pub token: Option<String>,

    /// Authenticated user ID
    pub user_id: UserId,

    /// Username
    pub username: String,

    /// Email address
    #[serde(default)]
    pub email: String,

    /// Given name
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub first_name: Option<String>,

    /// Family name
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub last_name: Option<String>,

    /// Informational message (signup)
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    /// Extracts the identity carried by the response
    pub fn user(&self) -> User {
        User {
            id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_parses() {
        let json = r#"{
            "token": "abc123",
            "user_id": 4,
            "username": "ada",
            "email": "ada@example.com",
            "first_name": "",
            "last_name": ""
        }"#;

        let response: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.token.as_deref(), Some("abc123"));

        let user = response.user();
        assert_eq!(user.id, 4);
        assert_eq!(user.first_name, None);
        assert_eq!(user.display_name(), "ada");
    }

    #[test]
    fn test_signup_response_without_token() {
        let json = r#"{"message": "User created successfully", "user_id": 9, "username": "bob", "email": "bob@example.com"}"#;
        let response: AuthResponse = serde_json::from_str(json).unwrap();
        assert!(response.token.is_none());
        assert_eq!(response.message.as_deref(), Some("User created successfully"));
    }

    #[test]
    fn test_signup_request_validation() {
        assert!(SignupRequest::new("ada", "ada@example.com", "pw").validate().is_ok());

        let errors = SignupRequest::new("  ", "not-an-email", "").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_display_name() {
        let mut user = User::new(1, "ada", "ada@example.com");
        user.first_name = Some("Ada".to_string());
        user.last_name = Some("Lovelace".to_string());
        assert_eq!(user.display_name(), "Ada Lovelace");
    }
}
