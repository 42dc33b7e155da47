//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An in-memory backend implementing `BoardsApi` with the backend's
//!   ownership and validation rules
//! - Failure injection (offline backend, failing status updates, missing endpoints)
//! - A `TestContext` wiring the backend into a `Workboard`

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use workboard_client::api::{BoardsApi, TaskFilter};
use workboard_client::app::Workboard;
use workboard_client::error::{ApiResult, ClientError};
use workboard_client::forms::Confirm;
use workboard_client::notify::MemoryNotifier;
use workboard_client::session::{MemoryTokenStore, PersistedSession, SessionContext, TokenStore};
use workboard_shared::auth::token::SessionToken;
use workboard_shared::models::board::{Board, BoardInput};
use workboard_shared::models::task::{Task, TaskInput, TaskStatus};
use workboard_shared::models::user::{AuthResponse, LoginRequest, SignupRequest, User};
use workboard_shared::models::{non_blank, BoardId, TaskId, UserId};
use workboard_shared::validation::FieldErrors;

pub const PASSWORD: &str = "secret";

struct Account {
    user: User,
    password: String,
}

struct BoardRecord {
    id: BoardId,
    name: String,
    description: Option<String>,
    owner: UserId,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct BackendState {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    boards: Vec<BoardRecord>,
    tasks: Vec<Task>,
    next_id: i64,
    calls: Vec<String>,
    offline: bool,
    fail_status_updates: bool,
    me_missing: bool,
    assignment_endpoints_missing: bool,
    delay: Option<Duration>,
}

impl BackendState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: UserId) -> Option<User> {
        self.accounts.iter().find(|a| a.user.id == id).map(|a| a.user.clone())
    }

    fn user_by_email(&self, email: &str) -> Option<User> {
        self.accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email))
            .map(|a| a.user.clone())
    }

    fn board_record(&self, id: BoardId) -> Option<&BoardRecord> {
        self.boards.iter().find(|b| b.id == id)
    }

    fn board(&self, record: &BoardRecord) -> Board {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.board == record.id)
            .cloned()
            .collect();
        // Newest first
        tasks.reverse();

        Board {
            id: record.id,
            name: record.name.clone(),
            description: record.description.clone(),
            owner: self.user(record.owner).unwrap_or_else(|| User::new(record.owner, "ghost", "")),
            tasks,
            created_at: record.created_at,
            updated_at: Some(record.created_at),
        }
    }

    fn board_visible(&self, record: &BoardRecord, user: &User) -> bool {
        record.owner == user.id
            || self
                .tasks
                .iter()
                .any(|t| t.board == record.id && t.assignee.as_ref().is_some_and(|a| a.id == user.id))
    }

    fn task_visible(&self, task: &Task, user: &User) -> bool {
        let owns_board = self
            .board_record(task.board)
            .is_some_and(|b| b.owner == user.id);
        owns_board
            || task.is_created_by(user)
            || task.assignee.as_ref().is_some_and(|a| a.id == user.id)
    }

    fn may_edit_task(&self, task: &Task, user: &User) -> bool {
        let owns_board = self
            .board_record(task.board)
            .is_some_and(|b| b.owner == user.id);
        owns_board || task.is_created_by(user)
    }

    fn resolve_assignee(&self, email: Option<&str>) -> ApiResult<Option<User>> {
        match email {
            None => Ok(None),
            Some(email) => match self.user_by_email(email) {
                Some(user) => Ok(Some(user)),
                None => {
                    let mut errors = FieldErrors::new();
                    errors.add("assignee_email", "User with this email does not exist.");
                    Err(ClientError::Validation(errors))
                }
            },
        }
    }
}

/// In-memory stand-in for the Workboard backend
pub struct InMemoryBackend {
    context: SessionContext,
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    /// Creates a backend that reads the caller's token from `context`
    pub fn new(context: SessionContext) -> Self {
        Self {
            context,
            state: Mutex::new(BackendState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    /// Registers an account
    pub fn add_user(&self, username: &str, email: &str, password: &str) -> User {
        let mut state = self.lock();
        let user = User::new(state.next_id(), username, email);
        state.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    /// Issues a token for a user without a login call
    pub fn issue_token(&self, user_id: UserId) -> String {
        let mut state = self.lock();
        let token = format!("token-{}-{}", user_id, state.next_id());
        state.tokens.insert(token.clone(), user_id);
        token
    }

    /// Revokes every token
    pub fn revoke_all_tokens(&self) {
        self.lock().tokens.clear();
    }

    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn fail_status_updates(&self, fail: bool) {
        self.lock().fail_status_updates = fail;
    }

    pub fn set_me_missing(&self, missing: bool) {
        self.lock().me_missing = missing;
    }

    pub fn set_assignment_endpoints_missing(&self, missing: bool) {
        self.lock().assignment_endpoints_missing = missing;
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        self.lock().delay = delay;
    }

    /// Every request received, as `METHOD /path/`
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of requests whose line starts with `prefix`
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Stored status of a task
    pub fn task_status(&self, id: TaskId) -> Option<TaskStatus> {
        self.lock().tasks.iter().find(|t| t.id == id).map(|t| t.status)
    }

    pub fn task_count(&self) -> usize {
        self.lock().tasks.len()
    }

    async fn open(&self, line: String) -> ApiResult<MutexGuard<'_, BackendState>> {
        let delay = self.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        state.calls.push(line);
        if state.offline {
            return Err(ClientError::NetworkUnreachable("connection refused".to_string()));
        }
        Ok(state)
    }

    fn authenticate(&self, state: &BackendState) -> ApiResult<User> {
        let token = self
            .context
            .token()
            .ok_or_else(|| ClientError::Unauthorized("Authentication credentials were not provided.".to_string()))?;

        state
            .tokens
            .get(token.as_str())
            .and_then(|id| state.user(*id))
            .ok_or_else(|| ClientError::Unauthorized("Invalid token.".to_string()))
    }
}

#[async_trait]
impl BoardsApi for InMemoryBackend {
    async fn ping(&self) -> ApiResult<()> {
        self.open("GET /".to_string()).await.map(|_| ())
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        let mut state = self.open("POST /login/".to_string()).await?;

        let user = state
            .accounts
            .iter()
            .find(|a| a.user.username == request.username && a.password == request.password)
            .map(|a| a.user.clone())
            .ok_or_else(|| ClientError::Unauthorized("Invalid username or password".to_string()))?;

        let token = format!("token-{}-{}", user.id, state.next_id());
        state.tokens.insert(token.clone(), user.id);

        Ok(AuthResponse {
            token: Some(token),
            user_id: user.id,
            username: user.username,
            email: user.email,
            first_name: None,
            last_name: None,
            message: None,
        })
    }

    async fn signup(&self, request: &SignupRequest) -> ApiResult<AuthResponse> {
        let mut state = self.open("POST /signup/".to_string()).await?;

        if state.accounts.iter().any(|a| a.user.username == request.username) {
            return Err(ClientError::Validation(FieldErrors::with_message("Username already exists")));
        }
        if state.user_by_email(&request.email).is_some() {
            return Err(ClientError::Validation(FieldErrors::with_message("Email already exists")));
        }

        let user = User::new(state.next_id(), request.username.clone(), request.email.clone());
        state.accounts.push(Account {
            user: user.clone(),
            password: request.password.clone(),
        });
        let token = format!("token-{}-{}", user.id, state.next_id());
        state.tokens.insert(token.clone(), user.id);

        Ok(AuthResponse {
            token: Some(token),
            user_id: user.id,
            username: user.username,
            email: user.email,
            first_name: None,
            last_name: None,
            message: Some("User created successfully".to_string()),
        })
    }

    async fn logout(&self) -> ApiResult<()> {
        let mut state = self.open("POST /logout/".to_string()).await?;
        self.authenticate(&state)?;
        if let Some(token) = self.context.token() {
            state.tokens.remove(token.as_str());
        }
        Ok(())
    }

    async fn current_user(&self) -> ApiResult<User> {
        let state = self.open("GET /users/me/".to_string()).await?;
        if state.me_missing {
            return Err(ClientError::NotFound("Not found.".to_string()));
        }
        self.authenticate(&state)
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        let state = self.open("GET /users/".to_string()).await?;
        self.authenticate(&state)?;
        Ok(state.accounts.iter().map(|a| a.user.clone()).collect())
    }

    async fn user_assignments(&self, user_id: UserId) -> ApiResult<Vec<Task>> {
        let state = self.open(format!("GET /users/{}/assignments/", user_id)).await?;
        if state.assignment_endpoints_missing {
            return Err(ClientError::NotFound("Not found.".to_string()));
        }
        self.authenticate(&state)?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.assignee.as_ref().is_some_and(|a| a.id == user_id))
            .cloned()
            .collect())
    }

    async fn user_assigned_boards(&self, user_id: UserId) -> ApiResult<Vec<Board>> {
        let state = self.open(format!("GET /users/{}/assigned-boards/", user_id)).await?;
        if state.assignment_endpoints_missing {
            return Err(ClientError::NotFound("Not found.".to_string()));
        }
        self.authenticate(&state)?;
        Ok(state
            .boards
            .iter()
            .filter(|b| {
                state
                    .tasks
                    .iter()
                    .any(|t| t.board == b.id && t.assignee.as_ref().is_some_and(|a| a.id == user_id))
            })
            .map(|b| state.board(b))
            .collect())
    }

    async fn list_boards(&self) -> ApiResult<Vec<Board>> {
        let state = self.open("GET /boards/".to_string()).await?;
        let user = self.authenticate(&state)?;
        Ok(state
            .boards
            .iter()
            .filter(|b| state.board_visible(b, &user))
            .map(|b| state.board(b))
            .collect())
    }

    async fn get_board(&self, id: BoardId) -> ApiResult<Board> {
        let state = self.open(format!("GET /boards/{}/", id)).await?;
        let user = self.authenticate(&state)?;
        state
            .board_record(id)
            .filter(|b| state.board_visible(b, &user))
            .map(|b| state.board(b))
            .ok_or_else(|| ClientError::NotFound("Not found.".to_string()))
    }

    async fn create_board(&self, input: &BoardInput) -> ApiResult<Board> {
        let mut state = self.open("POST /boards/".to_string()).await?;
        let user = self.authenticate(&state)?;
        if input.name.trim().is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("name", "This field may not be blank.");
            return Err(ClientError::Validation(errors));
        }

        let id = state.next_id();
        state.boards.push(BoardRecord {
            id,
            name: input.name.clone(),
            description: non_blank(Some(&input.description)),
            owner: user.id,
            created_at: Utc::now(),
        });
        Ok(state.board(state.board_record(id).unwrap()))
    }

    async fn update_board(&self, id: BoardId, input: &BoardInput) -> ApiResult<Board> {
        let mut state = self.open(format!("PUT /boards/{}/", id)).await?;
        let user = self.authenticate(&state)?;
        let record = state
            .boards
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ClientError::NotFound("Not found.".to_string()))?;
        if record.owner != user.id {
            return Err(ClientError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ));
        }

        record.name = input.name.clone();
        record.description = non_blank(Some(&input.description));
        Ok(state.board(state.board_record(id).unwrap()))
    }

    async fn delete_board(&self, id: BoardId) -> ApiResult<()> {
        let mut state = self.open(format!("DELETE /boards/{}/", id)).await?;
        let user = self.authenticate(&state)?;
        let owner = state
            .board_record(id)
            .map(|b| b.owner)
            .ok_or_else(|| ClientError::NotFound("Not found.".to_string()))?;
        if owner != user.id {
            return Err(ClientError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ));
        }

        state.boards.retain(|b| b.id != id);
        state.tasks.retain(|t| t.board != id);
        Ok(())
    }

    async fn list_tasks(&self, filter: TaskFilter) -> ApiResult<Vec<Task>> {
        let query = filter
            .query()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let line = if query.is_empty() {
            "GET /tasks/".to_string()
        } else {
            format!("GET /tasks/?{}", query)
        };

        let state = self.open(line).await?;
        let user = self.authenticate(&state)?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| state.task_visible(t, &user))
            .filter(|t| match filter {
                TaskFilter::All => true,
                TaskFilter::Board(id) => t.board == id,
                TaskFilter::Assignee(id) => t.assignee.as_ref().is_some_and(|a| a.id == id),
            })
            .cloned()
            .collect())
    }

    async fn get_task(&self, id: TaskId) -> ApiResult<Task> {
        let state = self.open(format!("GET /tasks/{}/", id)).await?;
        let user = self.authenticate(&state)?;
        state
            .tasks
            .iter()
            .find(|t| t.id == id && state.task_visible(t, &user))
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Task not found".to_string()))
    }

    async fn create_task(&self, input: &TaskInput) -> ApiResult<Task> {
        let mut state = self.open("POST /tasks/".to_string()).await?;
        let user = self.authenticate(&state)?;

        match state.board_record(input.board) {
            Some(board) if board.owner == user.id => {}
            _ => {
                let mut errors = FieldErrors::new();
                errors.add("board", "You don't have permission to add tasks to this board.");
                return Err(ClientError::Validation(errors));
            }
        }
        let assignee = state.resolve_assignee(input.assignee_email.as_deref())?;

        let now = Utc::now();
        let task = Task {
            id: state.next_id(),
            title: input.title.clone(),
            description: non_blank(Some(&input.description)),
            status: input.status,
            assignee,
            created_by: Some(user),
            board: input.board,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: TaskId, input: &TaskInput) -> ApiResult<Task> {
        let mut state = self.open(format!("PUT /tasks/{}/", id)).await?;
        let user = self.authenticate(&state)?;
        let existing = state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Task not found".to_string()))?;
        if !state.may_edit_task(&existing, &user) {
            return Err(ClientError::Forbidden(
                "You don't have permission to edit this task.".to_string(),
            ));
        }
        let assignee = state.resolve_assignee(input.assignee_email.as_deref())?;

        let task = state.tasks.iter_mut().find(|t| t.id == id).unwrap();
        task.title = input.title.clone();
        task.description = non_blank(Some(&input.description));
        task.status = input.status;
        task.assignee = assignee;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> ApiResult<Task> {
        let mut state = self.open(format!("PATCH /tasks/{}/status/", id)).await?;
        let user = self.authenticate(&state)?;
        if state.fail_status_updates {
            return Err(ClientError::Server {
                status: 500,
                detail: "status update failed".to_string(),
            });
        }
        let existing = state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Task not found".to_string()))?;
        if !state.may_edit_task(&existing, &user) {
            return Err(ClientError::Forbidden(
                "You don't have permission to edit this task.".to_string(),
            ));
        }

        let task = state.tasks.iter_mut().find(|t| t.id == id).unwrap();
        task.status = status;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> ApiResult<()> {
        let mut state = self.open(format!("DELETE /tasks/{}/", id)).await?;
        let user = self.authenticate(&state)?;
        let existing = state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Task not found".to_string()))?;
        if !state.may_edit_task(&existing, &user) {
            return Err(ClientError::Forbidden(
                "You don't have permission to delete this task.".to_string(),
            ));
        }

        state.tasks.retain(|t| t.id != id);
        Ok(())
    }
}

/// Confirmation prompt with a switchable answer that records what it was asked
pub struct RecordingConfirm {
    answer: AtomicBool,
    prompts: Mutex<Vec<String>>,
}

impl RecordingConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: AtomicBool::new(answer),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn answer(&self, answer: bool) {
        self.answer.store(answer, Ordering::SeqCst);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Confirm for RecordingConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.load(Ordering::SeqCst)
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub backend: Arc<InMemoryBackend>,
    pub context: SessionContext,
    pub store: Arc<MemoryTokenStore>,
    pub notifier: Arc<MemoryNotifier>,
    pub confirm: Arc<RecordingConfirm>,
    pub app: Workboard,
    pub ada: User,
    pub bob: User,
}

impl TestContext {
    /// Creates an anonymous context with two registered users, `ada` and `bob`
    pub fn new() -> Self {
        let context = SessionContext::new();
        let backend = Arc::new(InMemoryBackend::new(context.clone()));
        let ada = backend.add_user("ada", "ada@example.com", PASSWORD);
        let bob = backend.add_user("bob", "bob@example.com", PASSWORD);

        let store = Arc::new(MemoryTokenStore::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let confirm = Arc::new(RecordingConfirm::new(true));

        let app = Workboard::with_parts(
            backend.clone(),
            context.clone(),
            store.clone(),
            notifier.clone(),
            confirm.clone(),
            Duration::from_secs(1),
        );

        Self {
            backend,
            context,
            store,
            notifier,
            confirm,
            app,
            ada,
            bob,
        }
    }

    /// Creates a context logged in as `ada`
    pub async fn logged_in() -> Self {
        let ctx = Self::new();
        ctx.app.session().login("ada", PASSWORD).await.unwrap();
        ctx.notifier.take();
        ctx.backend.clear_calls();
        ctx
    }

    /// Switches the session to another registered user
    pub async fn login_as(&self, username: &str) {
        self.app.session().login(username, PASSWORD).await.unwrap();
        self.notifier.take();
    }

    /// Stores a session as if left behind by a previous run
    pub fn persist(&self, token: &str, user: Option<User>) {
        self.store
            .save(&PersistedSession {
                token: SessionToken::new(token),
                user,
            })
            .unwrap();
    }

    /// Last notification message
    pub fn last_message(&self) -> Option<String> {
        self.notifier.last().map(|n| n.message)
    }
}
