//! Read-through cache for boards and tasks
//!
//! [`QueryCache`] keeps one entry per key. An entry is served until it is
//! invalidated; the next read then refetches. Concurrent readers of a key
//! share a single in-flight request.
//!
//! # Generations
//!
//! Every invalidation or `set` stamps the entry with a fresh generation from
//! a cache-wide counter. A fetch remembers the generation it started under
//! and only stores its result if the entry still carries it, so a fetch
//! overtaken by an invalidation hands its result to its waiters but never
//! overwrites newer state.
//!
//! [`BoardCache`] wires three such caches to the backend:
//!
//! | Key | Value | Source |
//! |---|---|---|
//! | `CacheKey::Boards` | `Vec<Board>` | `GET /boards/` |
//! | `CacheKey::Board(id)` | `BoardState` | `GET /boards/{id}/` (404 is `NotFound`) |
//! | `CacheKey::Tasks(id)` | `Vec<Task>` | `GET /tasks/?board={id}` (404 is empty) |

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use workboard_shared::models::board::Board;
use workboard_shared::models::task::Task;
use workboard_shared::models::BoardId;

use crate::api::{BoardsApi, TaskFilter};
use crate::error::{ApiResult, ClientError};

type SharedFetch<V> = Shared<BoxFuture<'static, ApiResult<V>>>;

struct InFlight<V: Clone> {
    id: u64,
    generation: u64,
    future: SharedFetch<V>,
}

struct Entry<V: Clone> {
    value: Option<V>,
    stale: bool,
    generation: u64,
    in_flight: Option<InFlight<V>>,
}

struct State<K, V: Clone> {
    entries: HashMap<K, Entry<V>>,
    counter: u64,
}

impl<K, V: Clone> State<K, V> {
    fn next(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }
}

/// Keyed read-through cache with request deduplication
pub struct QueryCache<K, V: Clone> {
    name: &'static str,
    state: Mutex<State<K, V>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send,
    V: Clone + Send + Sync + 'static,
{
    /// Creates an empty cache; `name` labels log lines
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(State {
                entries: HashMap::new(),
                counter: 0,
            }),
        }
    }

    /// Returns the fresh cached value or fetches it
    ///
    /// `fetch` is only invoked when no fresh value and no current in-flight
    /// request exist for the key.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the entry is left as it was.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> ApiResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<V>> + Send + 'static,
    {
        let (fetch_id, generation, future) = {
            let mut state = self.state.lock().await;
            let new_id = state.next();
            let entry = state.entries.entry(key.clone()).or_insert_with(|| Entry {
                value: None,
                stale: false,
                generation: new_id,
                in_flight: None,
            });

            if !entry.stale {
                if let Some(value) = &entry.value {
                    tracing::trace!(cache = self.name, ?key, "Cache hit");
                    return Ok(value.clone());
                }
            }

            let current = entry
                .in_flight
                .as_ref()
                .filter(|flight| flight.generation == entry.generation)
                .map(|flight| (flight.id, flight.generation, flight.future.clone()));

            match current {
                Some(joined) => {
                    tracing::debug!(cache = self.name, ?key, "Joining in-flight request");
                    joined
                }
                None => {
                    tracing::debug!(cache = self.name, ?key, "Cache miss, fetching");
                    let future = fetch().boxed().shared();
                    entry.in_flight = Some(InFlight {
                        id: new_id,
                        generation: entry.generation,
                        future: future.clone(),
                    });
                    (new_id, entry.generation, future)
                }
            }
        };

        // Lock released; the shared request is awaited unlocked
        let result = future.await;

        let mut state = self.state.lock().await;
        if let Some(entry) = state.entries.get_mut(&key) {
            if entry.in_flight.as_ref().is_some_and(|f| f.id == fetch_id) {
                entry.in_flight = None;
            }

            if entry.generation == generation {
                if let Ok(value) = &result {
                    entry.value = Some(value.clone());
                    entry.stale = false;
                }
            } else {
                tracing::debug!(cache = self.name, ?key, "Discarding superseded result");
            }
        }

        result
    }

    /// Marks a key stale and supersedes any in-flight request for it
    pub async fn invalidate(&self, key: &K) {
        let mut state = self.state.lock().await;
        let generation = state.next();
        if let Some(entry) = state.entries.get_mut(key) {
            entry.stale = true;
            entry.generation = generation;
            entry.in_flight = None;
            tracing::debug!(cache = self.name, ?key, "Invalidated");
        }
    }

    /// Marks every key stale
    pub async fn invalidate_all(&self) {
        let mut state = self.state.lock().await;
        let generation = state.next();
        for entry in state.entries.values_mut() {
            entry.stale = true;
            entry.generation = generation;
            entry.in_flight = None;
        }
    }

    /// Stores a server-confirmed value as fresh
    pub async fn set(&self, key: K, value: V) {
        let mut state = self.state.lock().await;
        let generation = state.next();
        let entry = state.entries.entry(key).or_insert_with(|| Entry {
            value: None,
            stale: false,
            generation,
            in_flight: None,
        });
        entry.value = Some(value);
        entry.stale = false;
        entry.generation = generation;
        entry.in_flight = None;
    }

    /// Changes a cached value in place without touching its freshness
    ///
    /// Returns false when nothing is cached for the key.
    pub async fn update<F>(&self, key: &K, f: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        let mut state = self.state.lock().await;
        match state.entries.get_mut(key).and_then(|e| e.value.as_mut()) {
            Some(value) => {
                f(value);
                true
            }
            None => false,
        }
    }

    /// Drops an entry
    pub async fn remove(&self, key: &K) {
        self.state.lock().await.entries.remove(key);
    }

    /// Cached value, fresh or stale
    pub async fn peek(&self, key: &K) -> Option<V> {
        self.state
            .lock()
            .await
            .entries
            .get(key)
            .and_then(|e| e.value.clone())
    }

    /// Returns true when the key has a value that has been invalidated
    pub async fn is_stale(&self, key: &K) -> bool {
        self.state
            .lock()
            .await
            .entries
            .get(key)
            .is_some_and(|e| e.stale)
    }
}

/// Result of looking up a board
#[derive(Debug, Clone, PartialEq)]
pub enum BoardState {
    Found(Board),
    NotFound,
}

impl BoardState {
    /// The board, when it exists
    pub fn board(&self) -> Option<&Board> {
        match self {
            BoardState::Found(board) => Some(board),
            BoardState::NotFound => None,
        }
    }

    /// Consumes the state, returning the board when it exists
    pub fn into_board(self) -> Option<Board> {
        match self {
            BoardState::Found(board) => Some(board),
            BoardState::NotFound => None,
        }
    }
}

/// Identifies a cached resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The board list
    Boards,

    /// One board's detail
    Board(BoardId),

    /// One board's task list
    Tasks(BoardId),
}

/// Board and task cache backed by the API client
pub struct BoardCache {
    api: Arc<dyn BoardsApi>,
    boards: QueryCache<(), Vec<Board>>,
    details: QueryCache<BoardId, BoardState>,
    tasks: QueryCache<BoardId, Vec<Task>>,
}

impl BoardCache {
    pub fn new(api: Arc<dyn BoardsApi>) -> Self {
        Self {
            api,
            boards: QueryCache::new("boards"),
            details: QueryCache::new("board"),
            tasks: QueryCache::new("tasks"),
        }
    }

    /// Boards visible to the current user
    ///
    /// # Errors
    ///
    /// Returns the API error when the list cannot be fetched.
    pub async fn fetch_boards(&self) -> ApiResult<Vec<Board>> {
        let api = Arc::clone(&self.api);
        self.boards
            .get_or_fetch((), move || async move { api.list_boards().await })
            .await
    }

    /// One board with its tasks; a missing board is `BoardState::NotFound`
    ///
    /// # Errors
    ///
    /// Returns the API error for failures other than 404.
    pub async fn fetch_board(&self, id: BoardId) -> ApiResult<BoardState> {
        let api = Arc::clone(&self.api);
        self.details
            .get_or_fetch(id, move || async move {
                match api.get_board(id).await {
                    Ok(board) => Ok(BoardState::Found(board)),
                    Err(ClientError::NotFound(_)) => Ok(BoardState::NotFound),
                    Err(e) => Err(e),
                }
            })
            .await
    }

    /// Tasks of one board; a 404 is an empty list
    ///
    /// # Errors
    ///
    /// Returns the API error for failures other than 404.
    pub async fn fetch_tasks(&self, board_id: BoardId) -> ApiResult<Vec<Task>> {
        let api = Arc::clone(&self.api);
        self.tasks
            .get_or_fetch(board_id, move || async move {
                match api.list_tasks(TaskFilter::Board(board_id)).await {
                    Err(ClientError::NotFound(_)) => {
                        tracing::warn!(board_id, "Task list not found, treating as empty");
                        Ok(Vec::new())
                    }
                    other => other,
                }
            })
            .await
    }

    /// Marks an entry stale
    pub async fn invalidate(&self, key: CacheKey) {
        match key {
            CacheKey::Boards => self.boards.invalidate(&()).await,
            CacheKey::Board(id) => self.details.invalidate(&id).await,
            CacheKey::Tasks(id) => self.tasks.invalidate(&id).await,
        }
    }

    /// Marks every entry stale
    pub async fn invalidate_all(&self) {
        self.boards.invalidate_all().await;
        self.details.invalidate_all().await;
        self.tasks.invalidate_all().await;
    }

    /// Replaces a board's detail entry with a server-confirmed value
    pub async fn set_board(&self, board: Board) {
        self.details.set(board.id, BoardState::Found(board)).await;
    }

    /// Cached board detail, fresh or stale
    pub async fn peek_board(&self, id: BoardId) -> Option<Board> {
        self.details
            .peek(&id)
            .await
            .and_then(BoardState::into_board)
    }

    /// Edits a cached board in place; returns false when it is not cached
    pub async fn update_board<F>(&self, id: BoardId, f: F) -> bool
    where
        F: FnOnce(&mut Board),
    {
        self.details
            .update(&id, |state| {
                if let BoardState::Found(board) = state {
                    f(board);
                }
            })
            .await
    }

    /// Forgets a deleted board: its detail entry, its task list, and the list entry
    pub async fn remove_board(&self, id: BoardId) {
        self.details.remove(&id).await;
        self.tasks.remove(&id).await;
        self.boards.invalidate(&()).await;
    }

    /// Returns true when the entry exists and has been invalidated
    pub async fn is_stale(&self, key: CacheKey) -> bool {
        match key {
            CacheKey::Boards => self.boards.is_stale(&()).await,
            CacheKey::Board(id) => self.details.is_stale(&id).await,
            CacheKey::Tasks(id) => self.tasks.is_stale(&id).await,
        }
    }
}
