//! Board and task forms
//!
//! Forms hold raw user input. `input()` trims it, validates it and produces
//! the request payload, so an invalid form never reaches the backend.
//!
//! # Example
//!
//! ```
//! use workboard_client::forms::{BoardForm, TaskForm};
//!
//! let form = BoardForm::new("  Sprint 1 ", "")
//!     .with_task(TaskForm::new("Design API"))
//!     .with_task(TaskForm::new("   "));
//!
//! assert_eq!(form.input().unwrap().name, "Sprint 1");
//! assert_eq!(form.draft_tasks().count(), 1);
//! ```

use validator::Validate;
use workboard_shared::models::board::{Board, BoardInput};
use workboard_shared::models::task::{Task, TaskInput, TaskStatus};
use workboard_shared::models::BoardId;

use crate::error::ApiResult;

/// Prompt shown before deleting a task
pub const DELETE_TASK_PROMPT: &str = "Are you sure you want to delete this task?";

/// Prompt shown before deleting a board
pub const DELETE_BOARD_PROMPT: &str =
    "Are you sure you want to delete this board? All tasks will be permanently deleted.";

/// Asks the user to confirm a destructive action
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way
#[derive(Debug, Clone, Copy)]
pub struct StaticConfirm(pub bool);

impl Confirm for StaticConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, answer = self.0, "Confirmation answered automatically");
        self.0
    }
}

/// Board create/edit form, optionally carrying tasks to create with the board
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardForm {
    pub name: String,
    pub description: String,
    pub tasks: Vec<TaskForm>,
}

impl BoardForm {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            tasks: Vec::new(),
        }
    }

    /// Form pre-filled with a board's current values
    pub fn from_board(board: &Board) -> Self {
        let input = board.to_input();
        Self::new(&input.name, &input.description)
    }

    /// Adds a draft task
    pub fn with_task(mut self, task: TaskForm) -> Self {
        self.tasks.push(task);
        self
    }

    /// Validated payload
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` when the trimmed name is empty.
    pub fn input(&self) -> ApiResult<BoardInput> {
        let input = BoardInput::new(&self.name, &self.description);
        input.validate()?;
        Ok(input)
    }

    /// Draft tasks with a non-blank title
    pub fn draft_tasks(&self) -> impl Iterator<Item = &TaskForm> {
        self.tasks.iter().filter(|t| !t.is_blank())
    }
}

/// Task create/edit form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee_email: String,
}

impl TaskForm {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Form pre-filled with a task's current values
    pub fn from_task(task: &Task) -> Self {
        let input = task.to_input();
        Self {
            title: input.title,
            description: input.description,
            status: input.status,
            assignee_email: input.assignee_email.unwrap_or_default(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_assignee(mut self, email: &str) -> Self {
        self.assignee_email = email.to_string();
        self
    }

    /// Returns true when the title is blank
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }

    /// Validated payload for a task on `board`
    ///
    /// A blank assignee email leaves the task unassigned.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` when the trimmed title is empty
    /// or the assignee email is malformed.
    pub fn input(&self, board: BoardId) -> ApiResult<TaskInput> {
        let input = TaskInput::new(board, &self.title)
            .with_description(&self.description)
            .with_status(self.status)
            .with_assignee_email(Some(self.assignee_email.as_str()));
        input.validate()?;
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    #[test]
    fn test_board_form_trims_and_validates() {
        let input = BoardForm::new("  Sprint 1  ", "  first sprint ").input().unwrap();
        assert_eq!(input.name, "Sprint 1");
        assert_eq!(input.description, "first sprint");

        match BoardForm::new("   ", "").input() {
            Err(ClientError::InvalidInput(errors)) => {
                assert_eq!(errors.field("name"), ["Board title is required"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_task_form_requires_title() {
        let err = TaskForm::new("  ").input(1).unwrap_err();
        assert_eq!(err.user_message(), "Task title is required");
    }

    #[test]
    fn test_task_form_blank_assignee_is_omitted() {
        let input = TaskForm::new("Design API").with_assignee("   ").input(3).unwrap();
        assert_eq!(input.assignee_email, None);
        assert_eq!(input.board, 3);
        assert_eq!(input.status, TaskStatus::ToDo);
    }

    #[test]
    fn test_task_form_rejects_bad_email() {
        let err = TaskForm::new("Design API")
            .with_assignee("not-an-email")
            .input(3)
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.field("assignee_email"), ["Enter a valid email address."]);
    }

    #[test]
    fn test_draft_tasks_skip_blank_titles() {
        let form = BoardForm::new("Sprint", "")
            .with_task(TaskForm::new("a"))
            .with_task(TaskForm::new(""))
            .with_task(TaskForm::new("b").with_status(TaskStatus::InProgress));

        let titles: Vec<_> = form.draft_tasks().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn test_static_confirm() {
        assert!(StaticConfirm(true).confirm(DELETE_TASK_PROMPT));
        assert!(!StaticConfirm(false).confirm(DELETE_BOARD_PROMPT));
    }
}
