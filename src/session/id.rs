//! Session identifier type.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Unique identifier for a playground session.
///
/// Backed by a random v4 UUID so identifiers are never reused and cannot be
/// enumerated by other clients. Displayed in hyphenated lowercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Interpret a client-supplied token.
    ///
    /// Empty or malformed tokens yield `None`; the handshake treats them the
    /// same as an unknown identifier.
    pub fn from_token(token: &str) -> Option<Self> {
        token.trim().parse().ok()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for SessionId {
    type Err = crate::error::PlaygroundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(SessionId)
            .map_err(|_| crate::error::PlaygroundError::InvalidToken(s.into()))
    }
}
