//! # Workboard Client Library
//!
//! Client for the Workboard kanban backend: authentication, cached board
//! reads, task and board mutations, and drag-and-drop moves between the
//! To-Do, In Progress and Completed columns.
//!
//! ## Modules
//!
//! - `api`: Backend calls (`BoardsApi` trait, reqwest implementation)
//! - `app`: Application facade implementing the user flows
//! - `cache`: Read-through board/task cache with request deduplication
//! - `config`: Configuration management
//! - `drag`: Drag-and-drop state machine
//! - `error`: Client error taxonomy
//! - `forms`: Board/task input validation and delete confirmation
//! - `notify`: User-visible notifications
//! - `session`: Token, current user and backend reachability
//! - `view`: Column layout of a board

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod drag;
pub mod error;
pub mod forms;
pub mod notify;
pub mod session;
pub mod view;
