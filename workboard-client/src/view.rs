//! Kanban layout of a board
//!
//! [`BoardView`] splits a board's tasks into the three status columns, in
//! the fixed order To-Do, In Progress, Completed, keeping the board's task
//! order inside each column.

use std::fmt::Write as _;
use workboard_shared::models::board::Board;
use workboard_shared::models::task::{Task, TaskStatus};
use workboard_shared::models::user::User;
use workboard_shared::models::{BoardId, TaskId};

/// Presentation attributes of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnStyle {
    pub label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

/// Style for a status column
pub fn column_style(status: TaskStatus) -> ColumnStyle {
    match status {
        TaskStatus::ToDo => ColumnStyle {
            label: "To Do",
            color: "blue",
            icon: "○",
        },
        TaskStatus::InProgress => ColumnStyle {
            label: "In Progress",
            color: "yellow",
            icon: "◐",
        },
        TaskStatus::Completed => ColumnStyle {
            label: "Completed",
            color: "green",
            icon: "●",
        },
    }
}

/// One status column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

impl Column {
    pub fn style(&self) -> ColumnStyle {
        column_style(self.status)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == task_id)
    }
}

/// A board laid out in columns
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub board_id: BoardId,
    pub name: String,
    pub description: Option<String>,
    pub owner: User,
    columns: Vec<Column>,
}

impl BoardView {
    pub fn from_board(board: &Board) -> Self {
        let columns = TaskStatus::ALL
            .iter()
            .map(|&status| Column {
                status,
                tasks: board.tasks_with_status(status).cloned().collect(),
            })
            .collect();

        Self {
            board_id: board.id,
            name: board.name.clone(),
            description: board.description.clone(),
            owner: board.owner.clone(),
            columns,
        }
    }

    /// Columns in display order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, status: TaskStatus) -> &Column {
        &self.columns[status.column_index()]
    }

    /// Column holding the task, if it is on the board
    pub fn locate(&self, task_id: TaskId) -> Option<TaskStatus> {
        self.columns
            .iter()
            .find(|c| c.contains(task_id))
            .map(|c| c.status)
    }

    /// Number of columns the task appears in
    pub fn occurrences(&self, task_id: TaskId) -> usize {
        self.columns
            .iter()
            .flat_map(|c| c.tasks.iter())
            .filter(|t| t.id == task_id)
            .count()
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Plain-text rendering for the terminal
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{} (#{})  owner: {}", self.name, self.board_id, self.owner.username);
        if let Some(description) = &self.description {
            let _ = writeln!(out, "{}", description);
        }

        for column in &self.columns {
            let style = column.style();
            let _ = writeln!(out);
            let _ = writeln!(out, "{} {} ({})", style.icon, style.label, column.len());

            if column.is_empty() {
                let _ = writeln!(out, "    No tasks");
                continue;
            }

            for task in &column.tasks {
                let _ = write!(out, "  #{:<4} {}", task.id, task.title);
                if let Some(assignee) = &task.assignee {
                    let _ = write!(out, "  @{}", assignee.username);
                }
                let _ = writeln!(out);
                if let Some(description) = &task.description {
                    let _ = writeln!(out, "         {}", description);
                }
            }
        }

        out
    }
}
