//! Session management.
//!
//! A session is the per-call scope for running statements. The client
//! opens one at the start of every analytics call and closes it at the
//! end, whether the call succeeded or not.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cypher::Statement;
use crate::result::QueryResult;
use crate::Result;

/// Session access mode.
///
/// Projection management writes to the engine's graph catalog, so the
/// analytics calls open `Write` sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    Read,
    Write,
}

/// Opaque session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Session trait that all drivers must implement.
#[async_trait]
pub trait Session: Send + Sized {
    fn id(&self) -> SessionId;
    fn mode(&self) -> AccessMode;

    /// Run one statement and collect its rows.
    async fn run(&mut self, statement: &Statement) -> Result<QueryResult>;

    /// Release the session.
    async fn close(self) -> Result<()>;
}
