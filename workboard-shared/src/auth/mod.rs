//! Authentication and authorization utilities
//!
//! # Modules
//!
//! - [`token`]: Opaque session token and its `Authorization` header form
//! - [`permissions`]: Ownership rules for editing and deleting boards and tasks
//!
//! # Example
//!
//! ```
//! use workboard_shared::auth::token::SessionToken;
//!
//! let token = SessionToken::new("9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b");
//! assert_eq!(token.authorization_header(), "Token 9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b");
//! ```

pub mod permissions;
pub mod token;
