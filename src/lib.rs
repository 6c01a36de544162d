//! # neo4j-gds — Typed GDS Analytics Client
//!
//! PageRank ranking and breadth-first path lookup over a location graph
//! stored in Neo4j, computed by the Graph Data Science library.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `Driver` is the contract between client and engine
//! 2. **Clean DTOs**: `Value`, `RankRecord`, `PathRecord` cross all boundaries
//! 3. **The engine computes**: the client projects, calls, and reshapes
//! 4. **Sentinels, not errors**: empty results come back as values
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neo4j_gds::{ClientConfig, GraphClient, MemoryDriver};
//!
//! # async fn example() -> neo4j_gds::Result<()> {
//! let driver = MemoryDriver::new();
//! for name in 1..=3 {
//!     driver.add_location(name);
//! }
//! driver.add_trip(1, 2, 5.0, 10.0)?;
//! driver.add_trip(2, 3, 7.0, 12.0)?;
//!
//! let client = GraphClient::with_driver(driver, ClientConfig::default()).await?;
//! let ranked = client.pagerank(20, "distance").await?;
//! let path = client.bfs(1, 3).await?;
//! println!("{ranked:?} {path:?}");
//! client.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Drivers
//!
//! | Driver | Feature | Description |
//! |--------|---------|-------------|
//! | Memory | `memory` | In-process GDS emulation for testing |
//! | Bolt | `bolt` | Connect to external Neo4j via Bolt protocol |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod cypher;
pub mod result;
pub mod session;
pub mod driver;
pub mod config;
pub mod client;
pub mod blocking;
pub mod export;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Value, PropertyMap,
    RankRecord, PathRecord, PathStep,
};

// ============================================================================
// Re-exports: Driver & session
// ============================================================================

pub use driver::Driver;
#[cfg(any(test, feature = "memory"))]
pub use driver::MemoryDriver;
#[cfg(feature = "bolt")]
pub use driver::BoltDriver;
pub use session::{Session, SessionId, AccessMode};
pub use result::{QueryResult, ResultRow, FromValue};
pub use cypher::Statement;

// ============================================================================
// Re-exports: Client
// ============================================================================

pub use client::{GraphClient, ProjectionSpec};
pub use config::{ClientConfig, ConnectionConfig, ProjectionMode, WeightProperty};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Client is closed")]
    Closed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
