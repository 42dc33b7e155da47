//! Application facade
//!
//! [`Workboard`] ties the API client, session, cache and notifier together
//! and implements every user-facing flow. Each mutation follows the same
//! shape:
//!
//! 1. Validate input and check permissions against cached data
//! 2. Call the backend
//! 3. On success, update or invalidate the affected cache entries and notify
//! 4. On failure, notify; a `401` also expires the session
//!
//! # Example
//!
//! ```no_run
//! use workboard_client::{app::Workboard, config::Config, forms::{BoardForm, StaticConfirm}};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let app = Workboard::new(&config, Arc::new(StaticConfirm(true)))?;
//! app.session().restore_session().await;
//!
//! let board = app.create_board(&BoardForm::new("Sprint 1", "")).await?;
//! println!("{}", app.board_view(board.id).await?.map(|v| v.render()).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use workboard_shared::auth::permissions::{require_board_owner, require_task_editor};
use workboard_shared::models::board::Board;
use workboard_shared::models::task::{Task, TaskStatus};
use workboard_shared::models::user::User;
use workboard_shared::models::{BoardId, TaskId, UserId};

use crate::api::{BoardsApi, HttpApiClient, TaskFilter};
use crate::cache::{BoardCache, BoardState, CacheKey};
use crate::config::Config;
use crate::drag::{DragController, DragOutcome, DropTarget};
use crate::error::{ApiResult, ClientError};
use crate::forms::{BoardForm, Confirm, TaskForm, DELETE_BOARD_PROMPT, DELETE_TASK_PROMPT};
use crate::notify::{LogNotifier, Notifier};
use crate::session::{BackendStatus, FileTokenStore, SessionContext, SessionManager, TokenStore};
use crate::view::BoardView;

/// Outcome of creating a board together with draft tasks
#[derive(Debug, Clone)]
pub struct CreatedBoard {
    pub board: Board,
    pub tasks: Vec<Task>,
    pub failed: Vec<(String, ClientError)>,
}

/// Workboard client application
pub struct Workboard {
    api: Arc<dyn BoardsApi>,
    session: SessionManager,
    cache: BoardCache,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
}

impl Workboard {
    /// Creates an application talking HTTP to the configured backend
    ///
    /// The session is persisted at `config.session.store_path` and
    /// notifications go to the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config, confirm: Arc<dyn Confirm>) -> anyhow::Result<Self> {
        Self::with_notifier(config, confirm, Arc::new(LogNotifier))
    }

    /// Like [`Workboard::new`] with a custom notifier
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_notifier(
        config: &Config,
        confirm: Arc<dyn Confirm>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let context = SessionContext::new();
        let api = Arc::new(HttpApiClient::new(config, context.clone())?);
        let store = Arc::new(FileTokenStore::new(&config.session.store_path));

        Ok(Self::with_parts(
            api,
            context,
            store,
            notifier,
            confirm,
            config.session.restore_timeout(),
        ))
    }

    /// Assembles an application from its parts
    ///
    /// `api` must read its token from `context`.
    pub fn with_parts(
        api: Arc<dyn BoardsApi>,
        context: SessionContext,
        store: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
        restore_timeout: Duration,
    ) -> Self {
        let session = SessionManager::new(
            Arc::clone(&api),
            store,
            Arc::clone(&notifier),
            context,
            restore_timeout,
        );
        let cache = BoardCache::new(Arc::clone(&api));

        Self {
            api,
            session,
            cache,
            notifier,
            confirm,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn cache(&self) -> &BoardCache {
        &self.cache
    }

    /// Checks backend reachability
    pub async fn backend_status(&self) -> BackendStatus {
        self.session.check_backend().await
    }

    /// Drops cached data and ends the session
    pub async fn logout(&self) {
        self.session.logout().await;
        self.cache.invalidate_all().await;
    }

    // ---- reads ----

    /// Boards visible to the current user
    ///
    /// # Errors
    ///
    /// Returns the API error; a `401` also expires the session.
    pub async fn boards(&self) -> ApiResult<Vec<Board>> {
        let result = self.cache.fetch_boards().await;
        self.observe(result)
    }

    /// One board; a missing board is `BoardState::NotFound`
    ///
    /// # Errors
    ///
    /// Returns the API error for failures other than 404.
    pub async fn board(&self, id: BoardId) -> ApiResult<BoardState> {
        let result = self.cache.fetch_board(id).await;
        self.observe(result)
    }

    /// One board laid out in columns; `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns the API error for failures other than 404.
    pub async fn board_view(&self, id: BoardId) -> ApiResult<Option<BoardView>> {
        Ok(self
            .board(id)
            .await?
            .board()
            .map(BoardView::from_board))
    }

    /// Tasks of one board; a 404 is an empty list
    ///
    /// # Errors
    ///
    /// Returns the API error for failures other than 404.
    pub async fn board_tasks(&self, board_id: BoardId) -> ApiResult<Vec<Task>> {
        let result = self.cache.fetch_tasks(board_id).await;
        self.observe(result)
    }

    /// Every task visible to the current user
    ///
    /// # Errors
    ///
    /// Returns the API error.
    pub async fn all_tasks(&self) -> ApiResult<Vec<Task>> {
        let result = self.api.list_tasks(TaskFilter::All).await;
        self.observe(result)
    }

    /// One task
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the task does not exist.
    pub async fn task(&self, id: TaskId) -> ApiResult<Task> {
        let result = self.api.get_task(id).await;
        self.observe(result)
    }

    /// All users
    ///
    /// # Errors
    ///
    /// Returns the API error.
    pub async fn users(&self) -> ApiResult<Vec<User>> {
        let result = self.api.list_users().await;
        self.observe(result)
    }

    /// Tasks assigned to a user
    ///
    /// Falls back to `GET /tasks/?assignee=` when the assignments endpoint is
    /// missing. Failures degrade to an empty list.
    pub async fn assignments(&self, user_id: UserId) -> Vec<Task> {
        let result = match self.api.user_assignments(user_id).await {
            Err(ClientError::NotFound(_)) => {
                tracing::debug!(user_id, "Assignments endpoint missing, filtering tasks");
                self.api.list_tasks(TaskFilter::Assignee(user_id)).await
            }
            other => other,
        };

        self.degrade(result, "assignments")
    }

    /// Boards on which a user has assignments
    ///
    /// Falls back to collecting the boards of the user's assigned tasks when
    /// the endpoint is missing. Failures degrade to an empty list.
    pub async fn assigned_boards(&self, user_id: UserId) -> Vec<Board> {
        match self.api.user_assigned_boards(user_id).await {
            Err(ClientError::NotFound(_)) => {
                tracing::debug!(user_id, "Assigned-boards endpoint missing, deriving from tasks");
            }
            other => return self.degrade(other, "assigned boards"),
        }

        let board_ids: BTreeSet<BoardId> = self
            .assignments(user_id)
            .await
            .iter()
            .map(|t| t.board)
            .collect();

        let mut boards = Vec::with_capacity(board_ids.len());
        for id in board_ids {
            match self.cache.fetch_board(id).await {
                Ok(BoardState::Found(board)) => boards.push(board),
                Ok(BoardState::NotFound) => {}
                Err(e) => tracing::warn!(board_id = id, error = %e, "Skipping assigned board"),
            }
        }
        boards
    }

    // ---- board mutations ----

    /// Creates a board, then each non-blank draft task on it
    ///
    /// A failing draft task is reported and does not undo the board.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for a blank name, or the API error
    /// if the board itself cannot be created.
    pub async fn create_board(&self, form: &BoardForm) -> ApiResult<Board> {
        self.create_board_with_tasks(form).await.map(|created| created.board)
    }

    /// Like [`Workboard::create_board`], also reporting the draft task results
    ///
    /// # Errors
    ///
    /// See [`Workboard::create_board`].
    pub async fn create_board_with_tasks(&self, form: &BoardForm) -> ApiResult<CreatedBoard> {
        let input = self.checked(form.input())?;
        let result = self.api.create_board(&input).await;
        let board = self.settle(result, "Work Board created successfully!")?;

        tracing::info!(board_id = board.id, name = %board.name, "Board created");

        let mut created = CreatedBoard {
            board,
            tasks: Vec::new(),
            failed: Vec::new(),
        };

        for draft in form.draft_tasks() {
            let outcome = match draft.input(created.board.id) {
                Ok(input) => self.api.create_task(&input).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(task) => created.tasks.push(task),
                Err(e) => {
                    tracing::warn!(board_id = created.board.id, title = %draft.title, error = %e, "Draft task not created");
                    self.notifier.error(&format!(
                        "Failed to create task '{}': {}",
                        draft.title.trim(),
                        e.user_message()
                    ));
                    let expired = e.is_unauthorized();
                    created.failed.push((draft.title.clone(), e));
                    if expired {
                        self.session.expire();
                        break;
                    }
                }
            }
        }

        self.cache.invalidate(CacheKey::Boards).await;
        Ok(created)
    }

    /// Renames or re-describes a board
    ///
    /// # Errors
    ///
    /// - `ClientError::InvalidInput` for a blank name
    /// - `ClientError::Forbidden` if the current user does not own the cached board
    /// - The API error otherwise
    pub async fn update_board(&self, id: BoardId, form: &BoardForm) -> ApiResult<Board> {
        let input = self.checked(form.input())?;
        self.check_board_owner(id).await?;

        let result = self.api.update_board(id, &input).await;
        let board = self.settle(result, "Board updated successfully!")?;

        self.cache.set_board(board.clone()).await;
        self.cache.invalidate(CacheKey::Boards).await;
        Ok(board)
    }

    /// Deletes a board and its tasks after confirmation
    ///
    /// Returns false when the user declined.
    ///
    /// # Errors
    ///
    /// - `ClientError::Forbidden` if the current user does not own the cached board
    /// - The API error otherwise
    pub async fn delete_board(&self, id: BoardId) -> ApiResult<bool> {
        if !self.confirm.confirm(DELETE_BOARD_PROMPT) {
            return Ok(false);
        }
        self.check_board_owner(id).await?;

        let result = self.api.delete_board(id).await;
        self.settle(result, "Board deleted successfully!")?;

        tracing::info!(board_id = id, "Board deleted");
        self.cache.remove_board(id).await;
        Ok(true)
    }

    // ---- task mutations ----

    /// Creates a task on a board
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidInput` for invalid input, or the API error.
    pub async fn create_task(&self, board_id: BoardId, form: &TaskForm) -> ApiResult<Task> {
        let input = self.checked(form.input(board_id))?;
        let result = self.api.create_task(&input).await;
        let task = self.settle(result, "Task created successfully!")?;

        self.invalidate_board(board_id).await;
        Ok(task)
    }

    /// Edits a task
    ///
    /// # Errors
    ///
    /// - `ClientError::InvalidInput` for invalid input
    /// - `ClientError::Forbidden` if the cached board shows the user may not edit it
    /// - The API error otherwise
    pub async fn update_task(&self, board_id: BoardId, id: TaskId, form: &TaskForm) -> ApiResult<Task> {
        let input = self.checked(form.input(board_id))?;
        self.check_task_editor(board_id, id).await?;

        let result = self.api.update_task(id, &input).await;
        let task = self.settle(result, "Task updated successfully!")?;

        self.invalidate_board(board_id).await;
        Ok(task)
    }

    /// Deletes a task after confirmation
    ///
    /// Returns false when the user declined.
    ///
    /// # Errors
    ///
    /// - `ClientError::Forbidden` if the cached board shows the user may not delete it
    /// - The API error otherwise
    pub async fn delete_task(&self, board_id: BoardId, id: TaskId) -> ApiResult<bool> {
        if !self.confirm.confirm(DELETE_TASK_PROMPT) {
            return Ok(false);
        }
        self.check_task_editor(board_id, id).await?;

        let result = self.api.delete_task(id).await;
        self.settle(result, "Task deleted successfully!")?;

        self.invalidate_board(board_id).await;
        Ok(true)
    }

    /// Applies a finished drag to the board
    ///
    /// Only `DragOutcome::Moved` reaches the backend. The cached board shows
    /// the task in its new column right away; if the status update fails the
    /// task is put back in its original column.
    ///
    /// # Errors
    ///
    /// - `ClientError::Forbidden` if the cached board shows the user may not move the task
    /// - The API error from the status update
    pub async fn apply_drop(&self, board_id: BoardId, outcome: DragOutcome) -> ApiResult<DragOutcome> {
        let DragOutcome::Moved { task_id, from, to } = outcome else {
            return Ok(outcome);
        };

        self.check_task_editor(board_id, task_id).await?;

        self.cache
            .update_board(board_id, |board| {
                if let Some(task) = board.task_mut(task_id) {
                    task.status = to;
                }
            })
            .await;

        match self.api.update_task_status(task_id, to).await {
            Ok(task) => {
                tracing::info!(task_id, %from, to = %task.status, "Task moved");
                self.notifier.success("Task moved successfully!");
                self.invalidate_board(board_id).await;
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(task_id, %from, %to, error = %e, "Move failed, rolling back");
                // Revert in place so an entry already marked stale stays stale
                self.cache
                    .update_board(board_id, |board| {
                        if let Some(task) = board.task_mut(task_id) {
                            task.status = from;
                        }
                    })
                    .await;
                self.notifier
                    .error(&format!("Failed to move task: {}", e.user_message()));
                if e.is_unauthorized() {
                    self.session.expire();
                }
                Err(e)
            }
        }
    }

    /// Moves a task to another column, as a complete drag gesture
    ///
    /// # Errors
    ///
    /// - `ClientError::NotFound` if the task or its board does not exist
    /// - Errors from [`Workboard::apply_drop`]
    pub async fn move_task(&self, task_id: TaskId, status: TaskStatus) -> ApiResult<DragOutcome> {
        let task = self.task(task_id).await?;
        let board_id = task.board;

        let board = match self.board(board_id).await? {
            BoardState::Found(board) => board,
            BoardState::NotFound => {
                return Err(ClientError::NotFound(format!("Board {} not found", board_id)))
            }
        };
        // The board detail is authoritative for the task's current column
        let current = board.task(task_id).unwrap_or(&task);

        let mut drag = DragController::new();
        drag.begin(current).map_err(drag_error)?;
        let outcome = drag.drop_on(DropTarget::Column(status)).map_err(drag_error)?;

        self.apply_drop(board_id, outcome).await
    }

    // ---- helpers ----

    async fn invalidate_board(&self, board_id: BoardId) {
        self.cache.invalidate(CacheKey::Board(board_id)).await;
        self.cache.invalidate(CacheKey::Tasks(board_id)).await;
        self.cache.invalidate(CacheKey::Boards).await;
    }

    async fn check_board_owner(&self, board_id: BoardId) -> ApiResult<()> {
        let (Some(user), Some(board)) = (
            self.session.current_user(),
            self.cache.peek_board(board_id).await,
        ) else {
            return Ok(());
        };

        require_board_owner(&user, &board).map_err(|e| self.refuse(e.into()))
    }

    async fn check_task_editor(&self, board_id: BoardId, task_id: TaskId) -> ApiResult<()> {
        let (Some(user), Some(board)) = (
            self.session.current_user(),
            self.cache.peek_board(board_id).await,
        ) else {
            return Ok(());
        };

        match board.task(task_id) {
            Some(task) => require_task_editor(&user, &board, task).map_err(|e| self.refuse(e.into())),
            None => Ok(()),
        }
    }

    fn refuse(&self, err: ClientError) -> ClientError {
        tracing::warn!(error = %err, "Refused locally");
        self.notifier.error(&err.user_message());
        err
    }

    fn checked<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        result.map_err(|e| {
            self.notifier.error(&e.user_message());
            e
        })
    }

    /// Reports a mutation result
    fn settle<T>(&self, result: ApiResult<T>, success: &str) -> ApiResult<T> {
        match result {
            Ok(value) => {
                self.notifier.success(success);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Mutation failed");
                self.notifier.error(&e.user_message());
                if e.is_unauthorized() {
                    self.session.expire();
                }
                Err(e)
            }
        }
    }

    /// Expires the session when a read is rejected as unauthorized
    fn observe<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(e) = &result {
            if e.is_unauthorized() {
                self.session.expire();
            }
        }
        result
    }

    /// Turns a failed secondary read into an empty list
    fn degrade<T>(&self, result: ApiResult<Vec<T>>, what: &str) -> Vec<T> {
        match self.observe(result) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load {}, showing none", what);
                Vec::new()
            }
        }
    }
}

fn drag_error(err: crate::drag::DragError) -> ClientError {
    ClientError::InvalidInput(workboard_shared::validation::FieldErrors::with_message(
        err.to_string(),
    ))
}
