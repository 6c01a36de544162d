//! Shared fixtures for the end-to-end tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use neo4j_gds::cypher::gds;
use neo4j_gds::{
    AccessMode, ClientConfig, Driver, GraphClient, MemoryDriver, QueryResult, Result, ResultRow,
    Session, SessionId, Statement, Value,
};

// ============================================================================
// Memory fixtures
// ============================================================================

/// Locations 1, 2, 3 with TRIPs 1→2 (distance 5, fare 10) and
/// 2→3 (distance 7, fare 12).
pub fn line_graph() -> MemoryDriver {
    let driver = MemoryDriver::new();
    for name in 1..=3 {
        driver.add_location(name);
    }
    driver.add_trip(1, 2, 5.0, 10.0).unwrap();
    driver.add_trip(2, 3, 7.0, 12.0).unwrap();
    driver
}

/// Location 1 fans out to 2 (short, expensive) and 3 (long, cheap).
pub fn fan_graph() -> MemoryDriver {
    let driver = MemoryDriver::new();
    for name in 1..=3 {
        driver.add_location(name);
    }
    driver.add_trip(1, 2, 1.0, 9.0).unwrap();
    driver.add_trip(1, 3, 9.0, 1.0).unwrap();
    driver
}

/// A client over `driver` with default settings; the driver handle stays
/// usable for inspection.
pub async fn client_for(driver: &MemoryDriver) -> GraphClient<MemoryDriver> {
    GraphClient::with_driver(driver.clone(), ClientConfig::default())
        .await
        .unwrap()
}

/// Texts of every statement the driver has seen.
pub fn texts(driver: &MemoryDriver) -> Vec<String> {
    driver.statements().into_iter().map(|s| s.text).collect()
}

/// The `$cfg` map of the last PageRank statement.
pub fn last_pagerank_cfg(driver: &MemoryDriver) -> neo4j_gds::PropertyMap {
    driver
        .statements()
        .into_iter()
        .rev()
        .find(|s| s.text == gds::PAGERANK_STREAM)
        .and_then(|s| s.params.get("cfg").and_then(|v| v.as_map().cloned()))
        .expect("a pagerank statement was run")
}

// ============================================================================
// Scripted driver
// ============================================================================

/// Answers statements from a script: the first entry whose needle occurs
/// in the statement text wins; unmatched statements yield no rows.
#[derive(Clone, Default)]
pub struct ScriptedDriver {
    script: Arc<Mutex<Vec<(String, QueryResult)>>>,
    log: Arc<Mutex<Vec<Statement>>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, needle: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|cells| {
                columns
                    .iter()
                    .map(|c| c.to_string())
                    .zip(cells)
                    .collect::<ResultRow>()
            })
            .collect();
        let result = QueryResult {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        };
        self.script.lock().push((needle.to_string(), result));
        self
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.log.lock().clone()
    }
}

pub struct ScriptedSession {
    driver: ScriptedDriver,
    mode: AccessMode,
}

#[async_trait]
impl Driver for ScriptedDriver {
    type Session = ScriptedSession;

    async fn verify_connectivity(&self) -> Result<()> {
        Ok(())
    }

    async fn session(&self, mode: AccessMode) -> Result<ScriptedSession> {
        Ok(ScriptedSession { driver: self.clone(), mode })
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Session for ScriptedSession {
    fn id(&self) -> SessionId {
        SessionId(0)
    }

    fn mode(&self) -> AccessMode {
        self.mode
    }

    async fn run(&mut self, statement: &Statement) -> Result<QueryResult> {
        self.driver.log.lock().push(statement.clone());
        let script = self.driver.script.lock();
        Ok(script
            .iter()
            .find(|(needle, _)| statement.text.contains(needle.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| QueryResult::new(statement.columns.clone())))
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Yielding driver
// ============================================================================

/// `MemoryDriver` that yields to the scheduler before every statement, so
/// calls joined on one task interleave statement by statement.
#[derive(Clone)]
pub struct YieldingDriver {
    inner: MemoryDriver,
}

impl YieldingDriver {
    pub fn new(inner: MemoryDriver) -> Self {
        Self { inner }
    }
}

pub struct YieldingSession {
    inner: <MemoryDriver as Driver>::Session,
}

#[async_trait]
impl Driver for YieldingDriver {
    type Session = YieldingSession;

    async fn verify_connectivity(&self) -> Result<()> {
        self.inner.verify_connectivity().await
    }

    async fn session(&self, mode: AccessMode) -> Result<YieldingSession> {
        Ok(YieldingSession { inner: self.inner.session(mode).await? })
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }
}

#[async_trait]
impl Session for YieldingSession {
    fn id(&self) -> SessionId {
        self.inner.id()
    }

    fn mode(&self) -> AccessMode {
        self.inner.mode()
    }

    async fn run(&mut self, statement: &Statement) -> Result<QueryResult> {
        tokio::task::yield_now().await;
        self.inner.run(statement).await
    }

    async fn close(self) -> Result<()> {
        self.inner.close().await
    }
}
