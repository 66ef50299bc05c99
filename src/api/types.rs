//! API response types.

use serde::{Deserialize, Serialize};

/// Server status report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub name: String,
    pub version: String,
    pub status: String,
    /// Language served by the playground.
    pub language: String,
    /// Sessions currently held in the registry.
    pub sessions: usize,
    pub uptime_secs: u64,
    pub idle_timeout_secs: u64,
}
