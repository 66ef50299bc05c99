//! Session management module.
//!
//! Sessions map an opaque identifier to the per-user interpreter state that
//! survives browser reconnects. The registry is the single source of truth
//! for session existence; the collector evicts idle entries.

mod gc;
mod id;
mod store;

pub use gc::{spawn_collector, GcConfig, DEFAULT_GC_INTERVAL, DEFAULT_IDLE_TIMEOUT};
pub use id::SessionId;
pub use store::{Binding, Session, SessionStore};
