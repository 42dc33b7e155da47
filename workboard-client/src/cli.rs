//! Command-line interface

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use workboard_client::app::Workboard;
use workboard_client::cache::BoardState;
use workboard_client::config::Config;
use workboard_client::drag::DragOutcome;
use workboard_client::forms::{BoardForm, Confirm, StaticConfirm, TaskForm};
use workboard_client::notify::{Notification, Notifier};
use workboard_client::session::{AuthError, BackendStatus, RestoreOutcome};
use workboard_shared::models::task::TaskStatus;
use workboard_shared::models::{BoardId, TaskId};

#[derive(Parser)]
#[command(name = "workboard")]
#[command(version, about = "Kanban boards from the terminal")]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether the backend is reachable
    Status,
    /// Log in
    Login {
        username: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        username: String,
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out
    Logout,
    /// Show the current user
    Whoami,
    /// List boards
    Boards,
    /// Show a board as columns
    Board { id: BoardId },
    /// Create a board
    CreateBoard {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Task to create on the new board (repeatable)
        #[arg(short, long = "task")]
        tasks: Vec<String>,
    },
    /// Rename or re-describe a board
    EditBoard {
        id: BoardId,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a board and all its tasks
    DeleteBoard { id: BoardId },
    /// Add a task to a board
    AddTask {
        board: BoardId,
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// To-Do, In Progress or Completed
        #[arg(short, long, default_value = "To-Do")]
        status: TaskStatus,
        /// Assignee email
        #[arg(short, long)]
        assignee: Option<String>,
    },
    /// Edit a task
    EditTask {
        task: TaskId,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        status: Option<TaskStatus>,
        /// Assignee email; empty to unassign
        #[arg(short, long)]
        assignee: Option<String>,
    },
    /// Move a task to another column
    Move { task: TaskId, status: TaskStatus },
    /// Delete a task
    DeleteTask { task: TaskId },
    /// Show tasks assigned to you
    Assignments {
        /// List the boards instead of the tasks
        #[arg(long)]
        boards: bool,
    },
}

/// Prints notifications to stderr
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(level = ?notification.level, message = %notification.message, "notification");
        eprintln!("{}", notification);
    }
}

/// Asks on the terminal
struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let confirm: Arc<dyn Confirm> = if cli.yes {
        Arc::new(StaticConfirm(true))
    } else {
        Arc::new(PromptConfirm)
    };
    let app = Workboard::with_notifier(&config, confirm, Arc::new(ConsoleNotifier))?;

    tracing::debug!(base_url = %config.base_url(), "Using backend");

    match cli.command {
        Commands::Status => {
            let status = app.backend_status().await;
            println!("Backend {} is {}", config.base_url(), status);
            if status == BackendStatus::Offline {
                bail!("backend unreachable");
            }
        }
        Commands::Login { username, password } => {
            let password = password_or_prompt(password)?;
            let user = app.session().login(&username, &password).await.map_err(auth_failure)?;
            println!("Logged in as {} <{}>", user.display_name(), user.email);
        }
        Commands::Signup {
            username,
            email,
            password,
        } => {
            let password = password_or_prompt(password)?;
            match app
                .session()
                .signup(&username, &email, &password)
                .await
                .map_err(auth_failure)?
            {
                Some(user) => println!("Logged in as {}", user.username),
                None => println!("Run `workboard login {}` to sign in", username),
            }
        }
        Commands::Logout => {
            restore(&app).await;
            app.logout().await;
        }
        Commands::Whoami => match restore(&app).await {
            Some(user) => println!("{} <{}> (id {})", user.display_name(), user.email, user.id),
            None => bail!("not logged in"),
        },
        Commands::Boards => {
            require_login(&app).await?;
            let boards = app.boards().await?;
            if boards.is_empty() {
                println!("No boards yet. Create one with `workboard create-board <name>`.");
            }
            for summary in boards.iter().map(|b| b.summary()) {
                println!(
                    "#{:<4} {:<24} {:>3} tasks  {}  {}  ({})",
                    summary.id,
                    summary.name,
                    summary.task_count,
                    summary.owner,
                    summary.created_on,
                    summary.description
                );
            }
        }
        Commands::Board { id } => {
            require_login(&app).await?;
            match app.board_view(id).await? {
                Some(view) => print!("{}", view.render()),
                None => bail!("Board not found"),
            }
        }
        Commands::CreateBoard {
            name,
            description,
            tasks,
        } => {
            require_login(&app).await?;
            let form = tasks
                .iter()
                .fold(BoardForm::new(&name, &description), |form, title| {
                    form.with_task(TaskForm::new(title))
                });
            let created = app.create_board_with_tasks(&form).await?;
            println!(
                "Created board #{} with {} task(s)",
                created.board.id,
                created.tasks.len()
            );
            if !created.failed.is_empty() {
                bail!("{} task(s) could not be created", created.failed.len());
            }
        }
        Commands::EditBoard {
            id,
            name,
            description,
        } => {
            require_login(&app).await?;
            let board = match app.board(id).await? {
                BoardState::Found(board) => board,
                BoardState::NotFound => bail!("Board not found"),
            };
            let mut form = BoardForm::from_board(&board);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(description) = description {
                form.description = description;
            }
            app.update_board(id, &form).await?;
        }
        Commands::DeleteBoard { id } => {
            require_login(&app).await?;
            // Load the board so ownership is checked before asking
            app.board(id).await?;
            if !app.delete_board(id).await? {
                println!("Cancelled");
            }
        }
        Commands::AddTask {
            board,
            title,
            description,
            status,
            assignee,
        } => {
            require_login(&app).await?;
            let form = TaskForm::new(&title)
                .with_description(&description)
                .with_status(status)
                .with_assignee(assignee.as_deref().unwrap_or_default());
            let task = app.create_task(board, &form).await?;
            println!("Created task #{}", task.id);
        }
        Commands::EditTask {
            task,
            title,
            description,
            status,
            assignee,
        } => {
            require_login(&app).await?;
            let current = app.task(task).await?;
            app.board(current.board).await?;

            let mut form = TaskForm::from_task(&current);
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(status) = status {
                form.status = status;
            }
            if let Some(assignee) = assignee {
                form.assignee_email = assignee;
            }
            app.update_task(current.board, task, &form).await?;
        }
        Commands::Move { task, status } => {
            require_login(&app).await?;
            match app.move_task(task, status).await? {
                DragOutcome::Moved { from, to, .. } => println!("#{}: {} -> {}", task, from, to),
                DragOutcome::Unchanged { .. } => println!("#{} is already in {}", task, status),
                DragOutcome::Cancelled { .. } => println!("Cancelled"),
            }
        }
        Commands::DeleteTask { task } => {
            require_login(&app).await?;
            let current = app.task(task).await?;
            app.board(current.board).await?;
            if !app.delete_task(current.board, task).await? {
                println!("Cancelled");
            }
        }
        Commands::Assignments { boards } => {
            let user = require_login(&app).await?;
            if boards {
                for board in app.assigned_boards(user.id).await {
                    println!("#{:<4} {}", board.id, board.name);
                }
            } else {
                let tasks = app.assignments(user.id).await;
                if tasks.is_empty() {
                    println!("Nothing assigned to you");
                }
                for task in tasks {
                    println!("#{:<4} [{}] {} (board #{})", task.id, task.status, task.title, task.board);
                }
            }
        }
    }

    Ok(())
}

/// Resumes the persisted session, returning the known user
async fn restore(app: &Workboard) -> Option<workboard_shared::models::user::User> {
    match app.session().restore_session().await {
        RestoreOutcome::Authenticated(user) => Some(user),
        RestoreOutcome::Offline(user) | RestoreOutcome::Unverified(user) => user,
        RestoreOutcome::NoSession | RestoreOutcome::Expired => None,
    }
}

async fn require_login(app: &Workboard) -> Result<workboard_shared::models::user::User> {
    match restore(app).await {
        Some(user) => Ok(user),
        None if app.session().is_authenticated() => {
            bail!("Session user unknown; log in again with `workboard login`")
        }
        None => bail!("Not logged in. Run `workboard login <username>` first."),
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => Ok(dialoguer::Password::new().with_prompt("Password").interact()?),
    }
}

fn auth_failure(err: AuthError) -> anyhow::Error {
    match err {
        AuthError::Validation(errors) => {
            for (field, messages) in &errors.fields {
                for message in messages {
                    eprintln!("  {}: {}", field, message);
                }
            }
            anyhow::anyhow!(errors.summary())
        }
        other => other.into(),
    }
}
