//! # repl-playground
//!
//! Browser playground server for a small interpreted language.
//!
//! Each browser connection is attached to a *session* that owns a
//! persistent evaluation context, so definitions survive page reloads and
//! reconnects. Sessions that stay idle past a timeout are evicted by a
//! background collector.
//!
//! ## Features
//!
//! - **Resumable sessions**: token handshake over the WebSocket, resumed by
//!   the token the browser stored last time
//! - **Pluggable language**: the core is generic over [`lang::Language`];
//!   [`lang::Lisp`] ships as the default
//! - **Sharing**: snippets are saved to disk and reloaded from `?<token>` URLs
//! - **Async I/O**: built on tokio and axum
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use repl_playground::api::{serve, AppState, ServerConfig};
//! use repl_playground::share::SnippetStore;
//!
//! #[tokio::main]
//! async fn main() -> repl_playground::Result<()> {
//!     repl_playground::logging::try_init(None).ok();
//!
//!     let state = AppState::new()
//!         .with_snippets(Arc::new(SnippetStore::new("snippets", "lisp")));
//!     let config = ServerConfig::new("127.0.0.1", 8000).with_assets("public");
//!
//!     serve(config, state).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod forms;
pub mod lang;
pub mod logging;
pub mod session;
pub mod share;
pub mod transport;
pub mod ui;

// Re-export commonly used types
pub use api::{AppState, ServerConfig};
pub use error::{PlaygroundError, Result};
pub use forms::{Form, ReplForm};
pub use lang::{Language, Lisp};
pub use session::{Session, SessionId, SessionStore};
pub use share::SnippetStore;
pub use transport::Transport;
