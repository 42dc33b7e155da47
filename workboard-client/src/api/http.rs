//! HTTP implementation of [`BoardsApi`] on reqwest
//!
//! Every request carries `Authorization: Token <token>` when the shared
//! [`SessionContext`] holds a token, and is bounded by the configured
//! request timeout. Non-success responses are classified by
//! [`ClientError::from_status`].
//!
//! # Example
//!
//! ```no_run
//! use workboard_client::api::{BoardsApi, HttpApiClient};
//! use workboard_client::config::Config;
//! use workboard_client::session::SessionContext;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let client = HttpApiClient::new(&config, SessionContext::new())?;
//! let boards = client.list_boards().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use workboard_shared::models::board::{Board, BoardInput};
use workboard_shared::models::task::{StatusUpdate, Task, TaskInput, TaskStatus};
use workboard_shared::models::user::{AuthResponse, LoginRequest, SignupRequest, User};
use workboard_shared::models::{BoardId, TaskId, UserId};

use super::{BoardsApi, TaskFilter};
use crate::config::Config;
use crate::error::{ApiResult, ClientError};
use crate::session::SessionContext;

/// reqwest-backed API client
#[derive(Clone)]
pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
    ping_timeout: Duration,
}

impl HttpApiClient {
    /// Creates a client for the configured backend
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NetworkUnreachable` if the HTTP client cannot be
    /// initialized (TLS backend failure).
    pub fn new(config: &Config, session: SessionContext) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.api.request_timeout())
            .user_agent(concat!("workboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ClientError::NetworkUnreachable(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            session,
            ping_timeout: config.api.ping_timeout(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = self.session.token() {
            builder = builder.header(AUTHORIZATION, token.authorization_header());
        }
        builder
    }

    /// Sends a request and reads the body, classifying non-success statuses
    async fn execute(&self, builder: RequestBuilder) -> ApiResult<(StatusCode, String)> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().to_string();

        tracing::debug!(%method, %url, "Sending request");

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "Request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(%method, %url, status = status.as_u16(), "Received response");

        if status.is_success() {
            Ok((status, body))
        } else {
            Err(ClientError::from_status(status.as_u16(), &body, &url))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let (_, body) = self.execute(builder).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> ApiResult<()> {
        self.execute(builder).await.map(|_| ())
    }
}

#[async_trait]
impl BoardsApi for HttpApiClient {
    async fn ping(&self) -> ApiResult<()> {
        let response = self
            .http
            .get(self.url("/"))
            .timeout(self.ping_timeout)
            .send()
            .await?;

        tracing::debug!(status = response.status().as_u16(), "Backend reachable");
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        // Credentials replace whatever token is held, so send none
        let builder = self.http.post(self.url("/login/")).json(request);
        self.send_json(builder).await
    }

    async fn signup(&self, request: &SignupRequest) -> ApiResult<AuthResponse> {
        let builder = self.http.post(self.url("/signup/")).json(request);
        self.send_json(builder).await
    }

    async fn logout(&self) -> ApiResult<()> {
        self.send_empty(self.request(Method::POST, "/logout/")).await
    }

    async fn current_user(&self) -> ApiResult<User> {
        self.send_json(self.request(Method::GET, "/users/me/")).await
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.send_json(self.request(Method::GET, "/users/")).await
    }

    async fn user_assignments(&self, user_id: UserId) -> ApiResult<Vec<Task>> {
        let path = format!("/users/{}/assignments/", user_id);
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn user_assigned_boards(&self, user_id: UserId) -> ApiResult<Vec<Board>> {
        let path = format!("/users/{}/assigned-boards/", user_id);
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn list_boards(&self) -> ApiResult<Vec<Board>> {
        self.send_json(self.request(Method::GET, "/boards/")).await
    }

    async fn get_board(&self, id: BoardId) -> ApiResult<Board> {
        let path = format!("/boards/{}/", id);
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn create_board(&self, input: &BoardInput) -> ApiResult<Board> {
        self.send_json(self.request(Method::POST, "/boards/").json(input))
            .await
    }

    async fn update_board(&self, id: BoardId, input: &BoardInput) -> ApiResult<Board> {
        let path = format!("/boards/{}/", id);
        self.send_json(self.request(Method::PUT, &path).json(input))
            .await
    }

    async fn delete_board(&self, id: BoardId) -> ApiResult<()> {
        let path = format!("/boards/{}/", id);
        self.send_empty(self.request(Method::DELETE, &path)).await
    }

    async fn list_tasks(&self, filter: TaskFilter) -> ApiResult<Vec<Task>> {
        let builder = self.request(Method::GET, "/tasks/").query(&filter.query());
        self.send_json(builder).await
    }

    async fn get_task(&self, id: TaskId) -> ApiResult<Task> {
        let path = format!("/tasks/{}/", id);
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn create_task(&self, input: &TaskInput) -> ApiResult<Task> {
        self.send_json(self.request(Method::POST, "/tasks/").json(input))
            .await
    }

    async fn update_task(&self, id: TaskId, input: &TaskInput) -> ApiResult<Task> {
        let path = format!("/tasks/{}/", id);
        self.send_json(self.request(Method::PUT, &path).json(input))
            .await
    }

    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> ApiResult<Task> {
        let path = format!("/tasks/{}/status/", id);
        self.send_json(self.request(Method::PATCH, &path).json(&StatusUpdate { status }))
            .await
    }

    async fn delete_task(&self, id: TaskId) -> ApiResult<()> {
        let path = format!("/tasks/{}/", id);
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}
