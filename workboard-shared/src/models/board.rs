//! Board model and write payload
//!
//! A board is a named collection of tasks with a single owner. Board detail
//! and list responses nest the board's tasks; deleting a board deletes its
//! tasks on the backend.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "id": 3, "name": "Sprint 1", "description": "",
//!   "owner": { "id": 1, "username": "ada", "email": "ada@example.com" },
//!   "tasks": [],
//!   "created_at": "2024-05-01T09:00:00Z", "updated_at": "2024-05-01T09:00:00Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::task::{Task, TaskStatus};
use super::user::User;
use super::{BoardId, TaskId};

/// Board as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Backend board ID
    pub id: BoardId,

    /// Display name
    pub name: String,

    /// Optional description
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub description: Option<String>,

    /// Owner (only the owner may edit or delete the board)
    pub owner: User,

    /// Tasks on the board, newest first as served
    #[serde(default)]
    pub tasks: Vec<Task>,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last modified
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Board {
    /// Finds a task on this board by ID
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Mutable access to a task on this board by ID
    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Tasks with the given status, in board order
    pub fn tasks_with_status(&self, status: TaskStatus) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.status == status)
    }

    /// Returns true when the user owns the board
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.owner.id == user.id
    }

    /// Builds the edit payload pre-filled with this board's values
    pub fn to_input(&self) -> BoardInput {
        BoardInput {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
        }
    }

    /// One-line overview used by board listings
    pub fn summary(&self) -> BoardSummary {
        BoardSummary {
            id: self.id,
            name: self.name.clone(),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| "No description".to_string()),
            task_count: self.tasks.len(),
            owner: self.owner.username.clone(),
            created_on: self.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Listing row for the boards overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    /// Board ID
    pub id: BoardId,

    /// Board name
    pub name: String,

    /// Description, or "No description"
    pub description: String,

    /// Number of tasks on the board
    pub task_count: usize,

    /// Owner username
    pub owner: String,

    /// Creation date (YYYY-MM-DD)
    pub created_on: String,
}

/// Create/update payload for `POST /boards/` and `PUT /boards/{id}/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct BoardInput {
    /// Board name (required, trimmed)
    #[validate(length(min = 1, message = "Board title is required"))]
    pub name: String,

    /// Description (may be empty)
    pub description: String,
}

impl BoardInput {
    /// Creates a payload, trimming both fields
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
        }
    }
}
