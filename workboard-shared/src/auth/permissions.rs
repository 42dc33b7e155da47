//! Ownership-based permission checks
//!
//! # Permission Model
//!
//! | Action | Allowed for |
//! |---|---|
//! | edit board | board owner |
//! | delete board | board owner |
//! | edit task (fields or status) | task creator, board owner |
//! | delete task | task creator, board owner |
//!
//! The backend is authoritative; these checks let the client hide actions
//! and refuse a request it already knows would be rejected.
//!
//! # Example
//!
//! ```no_run
//! use workboard_shared::auth::permissions::require_board_owner;
//! # use workboard_shared::models::{board::Board, user::User};
//! # fn example(user: &User, board: &Board) -> Result<(), Box<dyn std::error::Error>> {
//! require_board_owner(user, board)?;
//! # Ok(())
//! # }
//! ```

use crate::models::board::Board;
use crate::models::task::Task;
use crate::models::user::User;
use crate::models::{BoardId, TaskId};

/// Error type for permission checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    /// Only the board owner may perform the action
    #[error("You don't have permission to modify board {0}")]
    NotBoardOwner(BoardId),

    /// Only the task creator or board owner may perform the action
    #[error("You don't have permission to edit task {0}")]
    NotTaskEditor(TaskId),

    /// The task does not belong to the given board
    #[error("Task {task} does not belong to board {board}")]
    ForeignTask { task: TaskId, board: BoardId },
}

/// Returns true when the user may rename or re-describe the board
pub fn can_edit_board(user: &User, board: &Board) -> bool {
    board.is_owned_by(user)
}

/// Returns true when the user may delete the board
pub fn can_delete_board(user: &User, board: &Board) -> bool {
    board.is_owned_by(user)
}

/// Returns true when the user may edit, move or delete the task
pub fn can_edit_task(user: &User, board: &Board, task: &Task) -> bool {
    task.is_created_by(user) || board.is_owned_by(user)
}

/// Requires board ownership
///
/// # Errors
///
/// Returns `PermissionError::NotBoardOwner` if the user does not own the board
pub fn require_board_owner(user: &User, board: &Board) -> Result<(), PermissionError> {
    if can_delete_board(user, board) {
        Ok(())
    } else {
        Err(PermissionError::NotBoardOwner(board.id))
    }
}

/// Requires task edit rights
///
/// # Errors
///
/// - `PermissionError::ForeignTask` if the task is on another board
/// - `PermissionError::NotTaskEditor` if the user is neither creator nor owner
pub fn require_task_editor(user: &User, board: &Board, task: &Task) -> Result<(), PermissionError> {
    if task.board != board.id {
        return Err(PermissionError::ForeignTask {
            task: task.id,
            board: board.id,
        });
    }

    if can_edit_task(user, board, task) {
        Ok(())
    } else {
        Err(PermissionError::NotTaskEditor(task.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;
    use chrono::Utc;

    fn user(id: i64) -> User {
        User::new(id, format!("user{}", id), format!("user{}@example.com", id))
    }

    fn board(owner: User) -> Board {
        Board {
            id: 10,
            name: "Sprint".to_string(),
            description: None,
            owner,
            tasks: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn task(board: i64, creator: Option<User>) -> Task {
        Task {
            id: 5,
            title: "t".to_string(),
            description: None,
            status: TaskStatus::ToDo,
            assignee: None,
            created_by: creator,
            board,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_owner_deletes_board() {
        let owner = user(1);
        let other = user(2);
        let b = board(owner.clone());

        assert!(can_delete_board(&owner, &b));
        assert!(!can_delete_board(&other, &b));
        assert_eq!(
            require_board_owner(&other, &b),
            Err(PermissionError::NotBoardOwner(10))
        );
    }

    #[test]
    fn test_task_edit_rights() {
        let owner = user(1);
        let creator = user(2);
        let stranger = user(3);
        let b = board(owner.clone());
        let t = task(10, Some(creator.clone()));

        assert!(can_edit_task(&owner, &b, &t));
        assert!(can_edit_task(&creator, &b, &t));
        assert!(!can_edit_task(&stranger, &b, &t));
        assert_eq!(
            require_task_editor(&stranger, &b, &t),
            Err(PermissionError::NotTaskEditor(5))
        );
    }

    #[test]
    fn test_task_without_creator_is_owner_only() {
        let owner = user(1);
        let b = board(owner.clone());
        let t = task(10, None);

        assert!(can_edit_task(&owner, &b, &t));
        assert!(!can_edit_task(&user(2), &b, &t));
    }

    #[test]
    fn test_foreign_task_rejected() {
        let owner = user(1);
        let b = board(owner.clone());
        let t = task(99, None);

        assert_eq!(
            require_task_editor(&owner, &b, &t),
            Err(PermissionError::ForeignTask { task: 5, board: 10 })
        );
    }
}
