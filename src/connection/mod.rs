//! Per-connection lifecycle.
//!
//! A new connection first resolves which session it belongs to
//! ([`handshake`]), then binds to that session and serves UI events until
//! the client goes away ([`serve_connection`]).

mod handshake;
mod runtime;

pub use handshake::{handshake, Handshake, Resolution, SESSION_REQUEST};
pub use runtime::{run_connection, serve_connection};
