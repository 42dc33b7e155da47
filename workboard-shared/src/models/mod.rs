//! Domain models for Workboard
//!
//! These are the shapes the Workboard REST backend returns and accepts.
//! The backend owns every record; the client only ever holds snapshots.
//!
//! # Models
//!
//! - `user`: Accounts, login/signup payloads
//! - `board`: Boards and their write payload
//! - `task`: Tasks, the three-valued `TaskStatus`, and task write payloads
//!
//! # Example
//!
//! ```
//! use workboard_shared::models::task::TaskStatus;
//!
//! let status: TaskStatus = serde_json::from_str("\"In Progress\"").unwrap();
//! assert_eq!(status, TaskStatus::InProgress);
//! ```

pub mod board;
pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Backend primary key of a user
pub type UserId = i64;

/// Backend primary key of a board
pub type BoardId = i64;

/// Backend primary key of a task
pub type TaskId = i64;

/// Deserializes an optional text field, treating `""` the same as `null`.
///
/// The backend stores blank descriptions as empty strings.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Trims a form value and maps blank input to `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
