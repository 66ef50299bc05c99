//! HTTP layer for the playground.
//!
//! ## Endpoints
//!
//! - `GET /ws` - WebSocket: session handshake, then the UI protocol
//! - `GET /status` - Server status report
//! - `GET /health` - Health check
//! - anything else - static front-end assets
//!
//! ## Example
//!
//! ```no_run
//! use repl_playground::api::{serve, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> repl_playground::Result<()> {
//!     let config = ServerConfig::new("127.0.0.1", 8000);
//!     serve(config, AppState::new()).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;
pub mod websocket;

// Re-export commonly used types
pub use handlers::AppState;
pub use router::{create_router, create_router_with_state, serve, ServerConfig};
pub use types::StatusResponse;
pub use websocket::WsTransport;
