//! Session storage and management.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

use super::SessionId;
use crate::error::PlaygroundError;
use crate::Result;

/// A playground session.
///
/// `C` is the evaluation context of the language front-end. It is created
/// lazily on first use and then lives as long as the session, so definitions
/// made over one connection are visible after a reconnect.
pub struct Session<C> {
    /// Unique identifier.
    pub id: SessionId,
    /// Time when session was created.
    pub created_at: Instant,
    last_access: Mutex<Instant>,
    context: Arc<AsyncMutex<Option<C>>>,
    binding: Mutex<Option<(u64, CancellationToken)>>,
    generation: AtomicU64,
}

impl<C> Session<C> {
    /// Create a new session with no evaluation context yet.
    pub fn new(id: SessionId) -> Self {
        let now = Instant::now();
        Self {
            id,
            created_at: now,
            last_access: Mutex::new(now),
            context: Arc::new(AsyncMutex::new(None)),
            binding: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Update the last access timestamp.
    pub fn touch(&self) {
        self.touch_at(Instant::now());
    }

    /// Set the last access timestamp to a specific instant.
    pub fn touch_at(&self, at: Instant) {
        *self
            .last_access
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = at;
    }

    /// Time of last access.
    pub fn last_access(&self) -> Instant {
        *self
            .last_access
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the idle duration since last access.
    pub fn idle_duration(&self) -> Duration {
        self.last_access().elapsed()
    }

    /// Run `f` against the evaluation context, creating it with `init` first
    /// if this is the first use.
    ///
    /// `f` runs on the blocking pool with the context lock held, so two
    /// evaluations against one session never interleave.
    pub async fn with_context<R, I, F>(&self, init: I, f: F) -> Result<R>
    where
        C: Send + 'static,
        R: Send + 'static,
        I: FnOnce() -> C + Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        let guard = Arc::clone(&self.context).lock_owned().await;
        run_blocking(guard, init, f).await
    }

    /// Whether the evaluation context has been created.
    pub async fn has_context(&self) -> bool {
        self.context.lock().await.is_some()
    }

    /// Attach a live connection to this session.
    ///
    /// Any previous binding is cancelled; its serve loop observes the
    /// cancellation and ends, leaving this binding as the only one.
    pub fn bind(self: &Arc<Self>) -> Binding<C> {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let token = CancellationToken::new();

        if let Ok(mut slot) = self.binding.lock() {
            if let Some((previous, old)) = slot.replace((generation, token.clone())) {
                tracing::info!(session = %self.id, previous, "Taking over session binding");
                old.cancel();
            }
        }

        Binding {
            session: Arc::clone(self),
            generation,
            token,
        }
    }

    /// Whether a live connection is currently bound.
    pub fn is_bound(&self) -> bool {
        self.binding
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    fn unbind(&self, generation: u64) {
        if let Ok(mut slot) = self.binding.lock() {
            if matches!(*slot, Some((current, _)) if current == generation) {
                *slot = None;
            }
        }
    }
}

impl<C> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("last_access", &self.last_access())
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// A live connection's claim on a session.
///
/// Dropping the binding releases the slot unless a newer connection has
/// already taken it over. The session itself is untouched.
pub struct Binding<C> {
    session: Arc<Session<C>>,
    generation: u64,
    token: CancellationToken,
}

impl<C> Binding<C> {
    /// The bound session.
    pub fn session(&self) -> &Arc<Session<C>> {
        &self.session
    }

    /// Resolves when another connection takes over this session.
    pub async fn superseded(&self) {
        self.token.cancelled().await
    }

    /// Whether another connection has taken over this session.
    pub fn is_superseded(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<C: Send + 'static> Binding<C> {
    /// [`Session::with_context`] for the bound connection.
    ///
    /// Returns `Ok(None)` without touching the context once another
    /// connection has taken the session over. The check happens after the
    /// context lock is acquired.
    pub async fn with_context<R, I, F>(&self, init: I, f: F) -> Result<Option<R>>
    where
        R: Send + 'static,
        I: FnOnce() -> C + Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        let guard = Arc::clone(&self.session.context).lock_owned().await;
        if self.is_superseded() {
            return Ok(None);
        }
        run_blocking(guard, init, f).await.map(Some)
    }
}

async fn run_blocking<C, R, I, F>(mut guard: OwnedMutexGuard<Option<C>>, init: I, f: F) -> Result<R>
where
    C: Send + 'static,
    R: Send + 'static,
    I: FnOnce() -> C + Send + 'static,
    F: FnOnce(&mut C) -> R + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(guard.get_or_insert_with(init)))
        .await
        .map_err(|e| PlaygroundError::Evaluation(e.to_string()))
}

impl<C> Drop for Binding<C> {
    fn drop(&mut self) {
        self.session.unbind(self.generation);
    }
}

/// Thread-safe registry of sessions.
///
/// Every operation, including the idle sweep, runs inside one critical
/// section.
pub struct SessionStore<C> {
    sessions: Mutex<HashMap<SessionId, Arc<Session<C>>>>,
}

impl<C> SessionStore<C> {
    /// Create a new empty session store.
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Insert or overwrite the entry for `id`.
    pub fn put(&self, id: SessionId, session: Arc<Session<C>>) -> Result<()> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| PlaygroundError::LockPoisoned)?;
        sessions.insert(id, session);
        Ok(())
    }

    /// Get the session with the given ID.
    pub fn get(&self, id: &SessionId) -> Result<Option<Arc<Session<C>>>> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| PlaygroundError::LockPoisoned)?;
        Ok(sessions.get(id).cloned())
    }

    /// Get the session with the given ID and refresh its last access time.
    ///
    /// Lookup and refresh happen under the registry lock, so a concurrent
    /// sweep cannot evict the session between the two.
    pub fn checkout(&self, id: &SessionId) -> Result<Option<Arc<Session<C>>>> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| PlaygroundError::LockPoisoned)?;
        let session = sessions.get(id).cloned();
        if let Some(session) = &session {
            session.touch();
        }
        Ok(session)
    }

    /// Create, register and return a session under a fresh identifier.
    pub fn create(&self) -> Result<Arc<Session<C>>> {
        let id = SessionId::new();
        let session = Arc::new(Session::new(id));
        self.put(id, Arc::clone(&session))?;
        Ok(session)
    }

    /// Remove a session from the store.
    pub fn remove(&self, id: &SessionId) -> Result<Option<Arc<Session<C>>>> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| PlaygroundError::LockPoisoned)?;
        Ok(sessions.remove(id))
    }

    /// Remove every session whose last access is more than `timeout` behind
    /// `now`.
    ///
    /// Returns the evicted identifiers.
    pub fn sweep(&self, now: Instant, timeout: Duration) -> Result<Vec<SessionId>> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| PlaygroundError::LockPoisoned)?;

        let mut evicted = Vec::new();
        sessions.retain(|id, session| {
            let idle = now.saturating_duration_since(session.last_access());
            if idle > timeout {
                tracing::info!(session = %id, idle_secs = idle.as_secs(), "Collecting");
                evicted.push(*id);
                false
            } else {
                true
            }
        });
        Ok(evicted)
    }

    /// Get the number of sessions in the store.
    pub fn count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// List all session IDs.
    pub fn list_ids(&self) -> Result<Vec<SessionId>> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| PlaygroundError::LockPoisoned)?;
        Ok(sessions.keys().copied().collect())
    }
}

impl<C> Default for SessionStore<C> {
    fn default() -> Self {
        Self::new()
    }
}
