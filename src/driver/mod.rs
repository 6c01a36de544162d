//! # Driver Trait
//!
//! This is THE contract between the client and whatever executes Cypher.
//! The client only needs three things from a driver: prove the engine is
//! reachable, hand out sessions, and shut down.
//!
//! ## Implementations
//!
//! | Driver | Module | Description |
//! |--------|--------|-------------|
//! | `MemoryDriver` | `memory` (feature `memory`) | In-process GDS emulation for tests/offline use |
//! | `BoltDriver` | `bolt` | External Neo4j + GDS via Bolt protocol |

#[cfg(any(test, feature = "memory"))]
pub mod memory;
#[cfg(feature = "bolt")]
pub mod bolt;

use async_trait::async_trait;

use crate::session::{AccessMode, Session};
use crate::Result;

#[cfg(any(test, feature = "memory"))]
pub use memory::MemoryDriver;
#[cfg(feature = "bolt")]
pub use bolt::BoltDriver;

// ============================================================================
// Driver Trait
// ============================================================================

/// The connection contract.
///
/// Drivers surface engine failures unmodified as `Error::Query` and
/// connectivity failures as `Error::Connection`; they never retry.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// The session type for this driver.
    type Session: Session;

    /// Round-trip to the engine. Called once at client construction.
    async fn verify_connectivity(&self) -> Result<()>;

    /// Open a session.
    async fn session(&self, mode: AccessMode) -> Result<Self::Session>;

    /// Release the connection. Sessions opened afterwards fail.
    async fn close(&self) -> Result<()>;
}
