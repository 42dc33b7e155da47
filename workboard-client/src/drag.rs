//! Drag-and-drop state machine for moving tasks between columns
//!
//! ```text
//! Idle --begin(task)--> Dragging { task, origin }
//! Dragging --drop_on(column != origin)--> Moved      --> Idle
//! Dragging --drop_on(column == origin)--> Unchanged  --> Idle
//! Dragging --drop_on(card | outside)----> Cancelled  --> Idle
//! Dragging --cancel()-------------------> Cancelled  --> Idle
//! ```
//!
//! The controller is pure: it decides what a drop means. Only a `Moved`
//! outcome leads to a backend call, made by the application facade.

use workboard_shared::models::task::{Task, TaskStatus};
use workboard_shared::models::TaskId;

/// Current drag state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { task_id: TaskId, origin: TaskStatus },
}

/// Where a dragged card was released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// A status column
    Column(TaskStatus),

    /// Another card
    Task(TaskId),

    /// Outside any drop zone
    Outside,
}

/// What a finished drag means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// The task should move to another column
    Moved {
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    /// Dropped on its own column
    Unchanged { task_id: TaskId },

    /// Released outside a column or cancelled
    Cancelled { task_id: TaskId },
}

impl DragOutcome {
    /// Task the drag was about
    pub fn task_id(&self) -> TaskId {
        match self {
            DragOutcome::Moved { task_id, .. }
            | DragOutcome::Unchanged { task_id }
            | DragOutcome::Cancelled { task_id } => *task_id,
        }
    }

    /// Returns true when the outcome needs a backend call
    pub fn is_move(&self) -> bool {
        matches!(self, DragOutcome::Moved { .. })
    }
}

/// Error type for invalid drag transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("Task {0} is already being dragged")]
    AlreadyDragging(TaskId),

    #[error("No task is being dragged")]
    NotDragging,
}

/// Tracks one drag gesture at a time
#[derive(Debug, Default, Clone)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Task currently being dragged
    pub fn active_task(&self) -> Option<TaskId> {
        match self.state {
            DragState::Dragging { task_id, .. } => Some(task_id),
            DragState::Idle => None,
        }
    }

    /// Picks up a task, remembering its current column
    ///
    /// # Errors
    ///
    /// Returns `DragError::AlreadyDragging` if a drag is in progress.
    pub fn begin(&mut self, task: &Task) -> Result<(), DragError> {
        if let DragState::Dragging { task_id, .. } = self.state {
            return Err(DragError::AlreadyDragging(task_id));
        }

        self.state = DragState::Dragging {
            task_id: task.id,
            origin: task.status,
        };
        tracing::trace!(task_id = task.id, origin = %task.status, "Drag started");
        Ok(())
    }

    /// Releases the task over a target
    ///
    /// # Errors
    ///
    /// Returns `DragError::NotDragging` if no drag is in progress.
    pub fn drop_on(&mut self, target: DropTarget) -> Result<DragOutcome, DragError> {
        let (task_id, origin) = self.finish()?;

        let outcome = match target {
            DropTarget::Column(status) if status == origin => DragOutcome::Unchanged { task_id },
            DropTarget::Column(status) => DragOutcome::Moved {
                task_id,
                from: origin,
                to: status,
            },
            DropTarget::Task(_) | DropTarget::Outside => DragOutcome::Cancelled { task_id },
        };

        tracing::trace!(?outcome, "Drag finished");
        Ok(outcome)
    }

    /// Abandons the drag
    ///
    /// # Errors
    ///
    /// Returns `DragError::NotDragging` if no drag is in progress.
    pub fn cancel(&mut self) -> Result<DragOutcome, DragError> {
        let (task_id, _) = self.finish()?;
        Ok(DragOutcome::Cancelled { task_id })
    }

    fn finish(&mut self) -> Result<(TaskId, TaskStatus), DragError> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { task_id, origin } => Ok((task_id, origin)),
            DragState::Idle => Err(DragError::NotDragging),
        }
    }
}
