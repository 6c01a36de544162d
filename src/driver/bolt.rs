//! Bolt driver — a Neo4j server with GDS installed, reached through the
//! `neo4rs` connection pool.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use neo4rs::{BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType};
use neo4rs::{ConfigBuilder, Graph};

use crate::config::ConnectionConfig;
use crate::cypher::Statement;
use crate::model::Value;
use crate::result::{QueryResult, ResultRow};
use crate::session::{AccessMode, Session, SessionId};
use crate::{Error, Result};
use super::Driver;

/// Pooled Bolt connection.
///
/// The pool handle is dropped on `close`; sessions opened earlier keep
/// their own handle until they finish.
pub struct BoltDriver {
    pool: Mutex<Option<Graph>>,
    uri: String,
    next_session_id: AtomicU64,
}

impl BoltDriver {
    /// Build the connection pool. Does not talk to the server yet; call
    /// [`Driver::verify_connectivity`] for that.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str());
        if let Some(db) = &config.database {
            builder = builder.db(db.as_str());
        }
        let neo_config = builder.build()
            .map_err(|e| Error::Connection(format!("invalid connection settings: {e}")))?;
        let graph = Graph::connect(neo_config).await
            .map_err(|e| Error::Connection(format!("{}: {e}", config.uri)))?;

        Ok(Self {
            pool: Mutex::new(Some(graph)),
            uri: config.uri.clone(),
            next_session_id: AtomicU64::new(1),
        })
    }

    fn graph(&self) -> Result<Graph> {
        self.pool.lock().clone()
            .ok_or_else(|| Error::Connection(format!("{}: driver is closed", self.uri)))
    }
}

#[async_trait]
impl Driver for BoltDriver {
    type Session = BoltSession;

    async fn verify_connectivity(&self) -> Result<()> {
        let mut stream = self.graph()?.execute(neo4rs::query("RETURN 1 AS ok")).await
            .map_err(|e| Error::Connection(format!("{}: {e}", self.uri)))?;
        while stream.next().await
            .map_err(|e| Error::Connection(format!("{}: {e}", self.uri)))?
            .is_some()
        {}
        Ok(())
    }

    async fn session(&self, mode: AccessMode) -> Result<BoltSession> {
        let graph = self.graph()?;
        Ok(BoltSession {
            id: SessionId(self.next_session_id.fetch_add(1, Ordering::SeqCst)),
            mode,
            graph,
        })
    }

    /// Drops the pool handle. Idle connections close with it; a session
    /// still running releases its connection when it finishes.
    async fn close(&self) -> Result<()> {
        if self.pool.lock().take().is_some() {
            debug!(uri = %self.uri, "bolt pool released");
        }
        Ok(())
    }
}

/// A handle on the shared pool; each statement checks out a connection.
pub struct BoltSession {
    id: SessionId,
    mode: AccessMode,
    graph: Graph,
}

#[async_trait]
impl Session for BoltSession {
    fn id(&self) -> SessionId { self.id }
    fn mode(&self) -> AccessMode { self.mode }

    async fn run(&mut self, statement: &Statement) -> Result<QueryResult> {
        let mut q = neo4rs::query(&statement.text);
        for (key, value) in &statement.params {
            q = q.param(key, to_bolt(value));
        }

        let mut stream = self.graph.execute(q).await
            .map_err(|e| Error::Query(e.to_string()))?;

        let mut result = QueryResult::new(statement.columns.clone());
        while let Some(row) = stream.next().await.map_err(|e| Error::Query(e.to_string()))? {
            let mut cells = ResultRow::default();
            for column in &statement.columns {
                let value: Value = row.get(column)
                    .map_err(|e| Error::Query(format!("column '{column}': {e}")))?;
                cells.values.insert(column.clone(), value);
            }
            result.rows.push(cells);
        }
        Ok(result)
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}

fn to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::Boolean(BoltBoolean::new(*b)),
        Value::Int(i) => BoltType::Integer(BoltInteger::new(*i)),
        Value::Float(f) => BoltType::Float(BoltFloat::new(*f)),
        Value::String(s) => BoltType::String(BoltString::new(s)),
        Value::List(items) => {
            let mut list = BoltList::with_capacity(items.len());
            for item in items {
                list.push(to_bolt(item));
            }
            BoltType::List(list)
        }
        Value::Map(entries) => {
            let mut map = BoltMap::with_capacity(entries.len());
            for (k, v) in entries {
                map.put(BoltString::new(k), to_bolt(v));
            }
            BoltType::Map(map)
        }
    }
}
