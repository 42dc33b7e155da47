//! Backend API surface
//!
//! [`BoardsApi`] lists every call the client makes to the Workboard REST
//! backend. [`HttpApiClient`] implements it over HTTP; tests substitute an
//! in-memory implementation.
//!
//! # Endpoints
//!
//! ```text
//! GET    /                              reachability
//! POST   /login/  /signup/  /logout/
//! GET    /users/me/  /users/
//! GET    /users/{id}/assignments/  /users/{id}/assigned-boards/
//! GET    /boards/       POST /boards/
//! GET    /boards/{id}/  PUT  /boards/{id}/  DELETE /boards/{id}/
//! GET    /tasks/[?board=|?assignee=]        POST /tasks/
//! GET    /tasks/{id}/   PUT  /tasks/{id}/   DELETE /tasks/{id}/
//! PATCH  /tasks/{id}/status/
//! ```

pub mod http;

pub use http::HttpApiClient;

use async_trait::async_trait;
use workboard_shared::models::board::{Board, BoardInput};
use workboard_shared::models::task::{Task, TaskInput, TaskStatus};
use workboard_shared::models::user::{AuthResponse, LoginRequest, SignupRequest, User};
use workboard_shared::models::{BoardId, TaskId, UserId};

use crate::error::ApiResult;

/// Selects which tasks `GET /tasks/` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    /// Every task visible to the current user
    All,

    /// Tasks on one board
    Board(BoardId),

    /// Tasks assigned to one user
    Assignee(UserId),
}

impl TaskFilter {
    /// Query parameters for the filter
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            TaskFilter::All => Vec::new(),
            TaskFilter::Board(id) => vec![("board", id.to_string())],
            TaskFilter::Assignee(id) => vec![("assignee", id.to_string())],
        }
    }
}

/// Calls the Workboard backend
///
/// Implementations attach the current session token themselves; callers
/// never pass credentials except to `login`/`signup`.
#[async_trait]
pub trait BoardsApi: Send + Sync {
    /// Checks that the backend answers at all
    ///
    /// Any HTTP response counts as reachable; only transport failures are errors.
    async fn ping(&self) -> ApiResult<()>;

    /// Exchanges credentials for a session token
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse>;

    /// Creates an account
    async fn signup(&self, request: &SignupRequest) -> ApiResult<AuthResponse>;

    /// Invalidates the current token server-side
    async fn logout(&self) -> ApiResult<()>;

    /// Resolves the user owning the current token
    async fn current_user(&self) -> ApiResult<User>;

    /// Lists users
    async fn list_users(&self) -> ApiResult<Vec<User>>;

    /// Tasks assigned to a user
    async fn user_assignments(&self, user_id: UserId) -> ApiResult<Vec<Task>>;

    /// Boards on which a user has assignments
    async fn user_assigned_boards(&self, user_id: UserId) -> ApiResult<Vec<Board>>;

    /// Lists boards visible to the current user
    async fn list_boards(&self) -> ApiResult<Vec<Board>>;

    /// Fetches one board with its tasks
    async fn get_board(&self, id: BoardId) -> ApiResult<Board>;

    /// Creates a board owned by the current user
    async fn create_board(&self, input: &BoardInput) -> ApiResult<Board>;

    /// Replaces a board's name and description
    async fn update_board(&self, id: BoardId, input: &BoardInput) -> ApiResult<Board>;

    /// Deletes a board and its tasks
    async fn delete_board(&self, id: BoardId) -> ApiResult<()>;

    /// Lists tasks
    async fn list_tasks(&self, filter: TaskFilter) -> ApiResult<Vec<Task>>;

    /// Fetches one task
    async fn get_task(&self, id: TaskId) -> ApiResult<Task>;

    /// Creates a task
    async fn create_task(&self, input: &TaskInput) -> ApiResult<Task>;

    /// Replaces a task's fields
    async fn update_task(&self, id: TaskId, input: &TaskInput) -> ApiResult<Task>;

    /// Changes only a task's status
    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> ApiResult<Task>;

    /// Deletes a task
    async fn delete_task(&self, id: TaskId) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_filter_query() {
        assert!(TaskFilter::All.query().is_empty());
        assert_eq!(TaskFilter::Board(3).query(), vec![("board", "3".to_string())]);
        assert_eq!(
            TaskFilter::Assignee(7).query(),
            vec![("assignee", "7".to_string())]
        );
    }
}
