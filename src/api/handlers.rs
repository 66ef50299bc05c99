//! HTTP handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::State, Json};

use super::types::StatusResponse;
use crate::forms::ReplForm;
use crate::lang::{Language, Lisp};
use crate::session::{SessionStore, DEFAULT_IDLE_TIMEOUT};
use crate::share::SnippetStore;

/// Shared application state.
pub struct AppState<L: Language = Lisp> {
    pub store: Arc<SessionStore<L::Context>>,
    pub language: Arc<L>,
    pub form: Arc<ReplForm<L>>,
    pub idle_timeout: Duration,
    pub started_at: Instant,
}

impl AppState<Lisp> {
    /// State for the built-in language with sharing disabled.
    pub fn new() -> Self {
        Self::with_language(Lisp)
    }
}

impl Default for AppState<Lisp> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Language> AppState<L> {
    pub fn with_language(language: L) -> Self {
        let language = Arc::new(language);
        Self {
            store: Arc::new(SessionStore::new()),
            form: Arc::new(ReplForm::new(Arc::clone(&language), None)),
            language,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            started_at: Instant::now(),
        }
    }

    /// Enable the Share action, storing snippets in `snippets`.
    pub fn with_snippets(mut self, snippets: Arc<SnippetStore>) -> Self {
        self.form = Arc::new(ReplForm::new(Arc::clone(&self.language), Some(snippets)));
        self
    }

    /// Idle timeout reported by `/status`.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }
}

impl<L: Language> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            language: Arc::clone(&self.language),
            form: Arc::clone(&self.form),
            idle_timeout: self.idle_timeout,
            started_at: self.started_at,
        }
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// Status report endpoint.
pub async fn status<L: Language>(State(state): State<AppState<L>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        language: state.language.name().to_string(),
        sessions: state.store.count(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        idle_timeout_secs: state.idle_timeout.as_secs(),
    })
}
