//! Task model and write payloads
//!
//! A task is a unit of work on exactly one board. Its status partitions the
//! board into three columns.
//!
//! # Status
//!
//! ```text
//! To-Do ⇄ In Progress ⇄ Completed
//! ```
//!
//! Any status may move to any other one (drag-and-drop or edit form). The set
//! is closed: a status string outside the three values fails to decode, so an
//! unknown status can never become application state.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "id": 12, "title": "Design API", "description": "",
//!   "status": "To-Do", "board": 3,
//!   "assignee": null, "created_by": { "id": 1, "username": "ada", "email": "ada@example.com" },
//!   "created_at": "2024-05-01T09:30:00Z", "updated_at": "2024-05-01T09:30:00Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::user::User;
use super::{non_blank, BoardId, TaskId};

/// Task status, one per board column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    #[serde(rename = "To-Do")]
    ToDo,

    /// Being worked on
    #[serde(rename = "In Progress")]
    InProgress,

    /// Finished
    #[serde(rename = "Completed")]
    Completed,
}

impl TaskStatus {
    /// All statuses in column order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Completed];

    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To-Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Zero-based column position
    pub fn column_index(&self) -> usize {
        match self {
            TaskStatus::ToDo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Completed => 2,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status '{0}': expected one of To-Do, In Progress, Completed")]
pub struct ParseStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    /// Accepts the wire form as well as relaxed spellings such as
    /// `todo`, `in-progress` or `IN_PROGRESS`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "todo" => Ok(TaskStatus::ToDo),
            "inprogress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Task as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Backend task ID
    pub id: TaskId,

    /// Short title
    pub title: String,

    /// Optional longer description
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub description: Option<String>,

    /// Current column
    #[serde(default)]
    pub status: TaskStatus,

    /// Assigned user, if any
    #[serde(default)]
    pub assignee: Option<User>,

    /// Creator of the task
    #[serde(default)]
    pub created_by: Option<User>,

    /// Board the task belongs to (back-reference only)
    pub board: BoardId,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last modified
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Returns true when the task was created by the given user
    pub fn is_created_by(&self, user: &User) -> bool {
        self.created_by.as_ref().is_some_and(|c| c.id == user.id)
    }

    /// Builds the edit payload pre-filled with this task's values
    pub fn to_input(&self) -> TaskInput {
        TaskInput {
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
            status: self.status,
            board: self.board,
            assignee_email: self.assignee.as_ref().map(|a| a.email.clone()).filter(|e| !e.is_empty()),
        }
    }
}

/// Create/update payload for `POST /tasks/` and `PUT /tasks/{id}/`
///
/// The assignee is resolved by the backend from `assignee_email`; an absent
/// email leaves the task unassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct TaskInput {
    /// Title (required, trimmed)
    #[validate(length(min = 1, message = "Task title is required"))]
    pub title: String,

    /// Description (may be empty)
    pub description: String,

    /// Initial or new status
    pub status: TaskStatus,

    /// Owning board
    pub board: BoardId,

    /// Email address of the assignee
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Enter a valid email address."))]
    pub assignee_email: Option<String>,
}

impl TaskInput {
    /// Creates a payload with the given title on a board, in `To-Do`
    pub fn new(board: BoardId, title: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            description: String::new(),
            status: TaskStatus::default(),
            board,
            assignee_email: None,
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.trim().to_string();
        self
    }

    /// Sets the status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the assignee email; blank input clears it
    pub fn with_assignee_email(mut self, email: Option<&str>) -> Self {
        self.assignee_email = non_blank(email);
        self
    }
}

/// Body of `PATCH /tasks/{id}/status/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// New status
    pub status: TaskStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(status: &str) -> String {
        format!(
            r#"{{
                "id": 12,
                "title": "Design API",
                "description": "",
                "status": "{}",
                "board": 3,
                "assignee": null,
                "created_by": {{"id": 1, "username": "ada", "email": "ada@example.com"}},
                "created_at": "2024-05-01T09:30:00Z",
                "updated_at": "2024-05-01T09:30:00.123456Z"
            }}"#,
            status
        )
    }

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::ToDo.as_str(), "To-Do");
        assert_eq!(TaskStatus::InProgress.as_str(), "In Progress");
        assert_eq!(TaskStatus::Completed.as_str(), "Completed");
    }

    #[test]
    fn test_task_status_column_order() {
        for (index, status) in TaskStatus::ALL.iter().enumerate() {
            assert_eq!(status.column_index(), index);
        }
    }

    #[test]
    fn test_task_status_parse_relaxed() {
        assert_eq!("To-Do".parse::<TaskStatus>().unwrap(), TaskStatus::ToDo);
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::ToDo);
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("IN_PROGRESS".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("Completed".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert!("Blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_decodes() {
        let task: Task = serde_json::from_str(&sample_json("In Progress")).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.description, None);
        assert_eq!(task.board, 3);
        assert!(task.is_created_by(&User::new(1, "ada", "ada@example.com")));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: Result<Task, _> = serde_json::from_str(&sample_json("Blocked"));
        assert!(result.is_err());
    }

    #[test]
    fn test_task_input_omits_empty_assignee() {
        let input = TaskInput::new(3, "  Design API ").with_assignee_email(Some("  "));
        assert_eq!(input.title, "Design API");

        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("assignee_email").is_none());
        assert_eq!(json["status"], "To-Do");
        assert_eq!(json["board"], 3);
    }

    #[test]
    fn test_task_input_validation() {
        assert!(TaskInput::new(1, "ok").validate().is_ok());
        assert!(TaskInput::new(1, "   ").validate().is_err());
        assert!(TaskInput::new(1, "ok")
            .with_assignee_email(Some("nope"))
            .validate()
            .is_err());
    }
}
