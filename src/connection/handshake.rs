//! Session handshake.
//!
//! ```text
//! server -> client   __GETSESSION__
//! client -> server   <stored token, possibly empty>
//! server -> client   <resolved session id>
//! ```
//!
//! An unknown, malformed or empty token yields a brand new session. A known
//! token resumes the existing session and refreshes its access time.

use std::sync::Arc;

use crate::error::PlaygroundError;
use crate::session::{Session, SessionId, SessionStore};
use crate::transport::Transport;
use crate::Result;

/// Frame that asks the client for its stored session token.
pub const SESSION_REQUEST: &str = "__GETSESSION__";

/// How the session was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Created,
    Resumed,
}

/// Outcome of a successful handshake.
pub struct Handshake<C> {
    pub session: Arc<Session<C>>,
    pub resolution: Resolution,
}

/// Run the handshake on a fresh connection.
///
/// Any transport failure aborts the handshake. A session created during a
/// failed handshake is removed again.
pub async fn handshake<T, C>(transport: &mut T, store: &SessionStore<C>) -> Result<Handshake<C>>
where
    T: Transport,
    C: Send,
{
    transport.send_text(SESSION_REQUEST.to_string()).await?;

    let token = transport
        .recv_text()
        .await?
        .ok_or(PlaygroundError::ConnectionClosed)?;

    let existing = match SessionId::from_token(&token) {
        Some(id) => store.checkout(&id)?,
        None => None,
    };

    let (session, resolution) = match existing {
        Some(session) => {
            tracing::info!(session = %session.id, "Reusing session");
            (session, Resolution::Resumed)
        }
        None => {
            let session = store.create()?;
            tracing::info!(session = %session.id, "New session");
            (session, Resolution::Created)
        }
    };

    if let Err(e) = transport.send_text(session.id.to_string()).await {
        if resolution == Resolution::Created {
            store.remove(&session.id)?;
        }
        return Err(e);
    }

    Ok(Handshake {
        session,
        resolution,
    })
}
