//! The graph query client.
//!
//! Every analytics call follows the same path:
//!
//! ```text
//! Idle → ProjectionCheck → [ProjectionDrop] → ProjectionCreate
//!      → QueryExecute → ResultShape → Idle
//! ```
//!
//! A session is opened at the start of the call and closed at the end,
//! success or failure. Calls on one client are serialized, so the
//! drop/create of the shared projection cannot interleave between them.
//! Other clients against the same database are not coordinated with; in
//! fingerprinted mode they share projections instead of replacing them.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::{ClientConfig, ProjectionMode, WeightProperty};
use crate::cypher::gds::{self, PageRankConfig};
use crate::driver::Driver;
use crate::model::*;
use crate::result::{QueryResult, ResultRow};
use crate::session::{AccessMode, Session};
use crate::{Error, Result};

// ============================================================================
// Projection spec
// ============================================================================

/// What a projection is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionSpec {
    pub node_label: String,
    pub relationship_type: String,
    pub properties: Vec<String>,
}

impl ProjectionSpec {
    /// Ranking projection: carries every configured weight property.
    pub fn weighted(config: &ClientConfig) -> Self {
        Self {
            node_label: config.node_label.clone(),
            relationship_type: config.relationship_type.clone(),
            properties: config.weight_properties.clone(),
        }
    }

    /// Traversal projection: topology only.
    pub fn unweighted(config: &ClientConfig) -> Self {
        Self {
            node_label: config.node_label.clone(),
            relationship_type: config.relationship_type.clone(),
            properties: Vec::new(),
        }
    }

    /// Stable across processes and releases, so separate clients agree
    /// on the name of an identical projection.
    pub fn fingerprint(&self) -> u64 {
        let key = format!(
            "{}\u{0}{}\u{0}{}",
            self.node_label,
            self.relationship_type,
            self.properties.join("\u{1}")
        );
        xxh3_64(key.as_bytes())
    }

    /// Catalog name under the given mode.
    pub fn graph_name(&self, config: &ClientConfig) -> String {
        match config.projection_mode {
            ProjectionMode::Recreate => config.graph_name.clone(),
            ProjectionMode::Fingerprinted => format!("{}_{:016x}", config.graph_name, self.fingerprint()),
        }
    }
}

// ============================================================================
// GraphClient
// ============================================================================

/// PageRank and BFS over a managed GDS projection.
pub struct GraphClient<D: Driver> {
    driver: D,
    config: ClientConfig,
    call_lock: Mutex<()>,
    closed: AtomicBool,
}

impl<D: Driver> GraphClient<D> {
    /// Wrap a driver, verifying connectivity first.
    ///
    /// # Errors
    /// `Error::Config` for an invalid `config`, `Error::Connection` when the
    /// engine cannot be reached.
    pub async fn with_driver(driver: D, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        driver.verify_connectivity().await.map_err(|e| match e {
            Error::Connection(msg) => Error::Connection(msg),
            other => Error::Connection(other.to_string()),
        })?;
        info!(graph = %config.graph_name, mode = ?config.projection_mode, "connected");

        Ok(Self {
            driver,
            config,
            call_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Release the connection. Later calls are no-ops.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("closing connection");
        self.driver.close().await?;
        info!("closed");
        Ok(())
    }

    // ========================================================================
    // PageRank
    // ========================================================================

    /// Highest- and lowest-ranked location.
    ///
    /// `weight_property` must be `"distance"` or `"fare"` to weight the
    /// ranking; any other string runs it unweighted.
    ///
    /// Returns exactly two records, top first. An empty graph yields two
    /// `{name: -1, score: 0.0}` sentinels instead of an error.
    pub async fn pagerank(&self, max_iterations: u32, weight_property: &str) -> Result<Vec<RankRecord>> {
        let weight = WeightProperty::parse(weight_property);
        if weight.is_none() {
            debug!(weight_property, "unrecognized weight property, ranking unweighted");
        }
        self.pagerank_with(max_iterations, weight).await
    }

    /// Typed form of [`pagerank`](Self::pagerank).
    pub async fn pagerank_with(
        &self,
        max_iterations: u32,
        weight: Option<WeightProperty>,
    ) -> Result<Vec<RankRecord>> {
        if max_iterations == 0 {
            return Err(Error::InvalidArgument("max_iterations must be at least 1".into()));
        }
        self.ensure_open()?;

        let _serial = self.call_lock.lock().await;
        let mut session = self.driver.session(AccessMode::Write).await?;
        let outcome = self.run_pagerank(&mut session, max_iterations, weight).await;
        finish(session, outcome).await
    }

    async fn run_pagerank(
        &self,
        session: &mut D::Session,
        max_iterations: u32,
        weight: Option<WeightProperty>,
    ) -> Result<Vec<RankRecord>> {
        let spec = ProjectionSpec::weighted(&self.config);
        let graph = self.ensure_projection(session, &spec).await?;

        let cfg = PageRankConfig {
            max_iterations,
            damping_factor: self.config.damping_factor,
            weight,
        };
        debug!(session = %session.id(), graph = %graph, max_iterations, weight = ?weight, "running pagerank");
        let result = session.run(&gds::pagerank_stream(&graph, &cfg)).await?;

        let (Some(top), Some(bottom)) = (result.first(), result.last()) else {
            debug!(graph = %graph, "pagerank produced no nodes");
            return Ok(vec![RankRecord::sentinel(), RankRecord::sentinel()]);
        };
        let records = vec![rank_record(top)?, rank_record(bottom)?];
        debug!(rows = result.rows.len(), "pagerank done");
        Ok(records)
    }

    // ========================================================================
    // BFS
    // ========================================================================

    /// Breadth-first traversal from the location named `start` toward the
    /// one named `last`.
    ///
    /// Returns one record. Its path is empty when either name is unknown or
    /// the traversal yields nothing; otherwise it lists every visited
    /// location in visitation order.
    pub async fn bfs(&self, start: impl Into<Value>, last: impl Into<Value>) -> Result<Vec<PathRecord>> {
        let (start, last) = (start.into(), last.into());
        self.ensure_open()?;

        let _serial = self.call_lock.lock().await;
        let mut session = self.driver.session(AccessMode::Write).await?;
        let outcome = self.run_bfs(&mut session, start, last).await;
        finish(session, outcome).await
    }

    async fn run_bfs(&self, session: &mut D::Session, start: Value, last: Value) -> Result<Vec<PathRecord>> {
        let spec = ProjectionSpec::unweighted(&self.config);
        let graph = self.ensure_projection(session, &spec).await?;

        debug!(session = %session.id(), graph = %graph, %start, %last, "running bfs");
        let lookup = session
            .run(&gds::resolve_pair(&self.config.node_label, start, last)?)
            .await?;
        let Some((source, target)) = endpoint_ids(&lookup)? else {
            debug!("bfs endpoint not found");
            return Ok(vec![PathRecord::empty()]);
        };

        let result = session.run(&gds::bfs_stream(&graph, source, target)).await?;
        let names: Vec<i64> = match result.first() {
            Some(row) => row.get::<Option<Vec<i64>>>("locpt")?.unwrap_or_default(),
            None => Vec::new(),
        };
        if names.is_empty() {
            debug!(graph = %graph, "bfs produced no path");
            return Ok(vec![PathRecord::empty()]);
        }
        debug!(steps = names.len(), "bfs done");
        Ok(vec![PathRecord::from_names(names)])
    }

    // ========================================================================
    // Projection management
    // ========================================================================

    /// Make sure the projection for `spec` is in the catalog and return
    /// its name.
    async fn ensure_projection(&self, session: &mut D::Session, spec: &ProjectionSpec) -> Result<String> {
        let graph = spec.graph_name(&self.config);
        let exists = self.projection_exists(session, &graph).await?;

        match self.config.projection_mode {
            ProjectionMode::Recreate => {
                if exists {
                    debug!(graph = %graph, "dropping projection");
                    session.run(&gds::graph_drop(&graph)).await?;
                }
                self.create_projection(session, &graph, spec).await?;
            }
            ProjectionMode::Fingerprinted => {
                if exists {
                    debug!(graph = %graph, "reusing projection");
                } else if let Err(e) = self.create_projection(session, &graph, spec).await {
                    // Another caller may have created it since the check.
                    if !self.projection_exists(session, &graph).await? {
                        return Err(e);
                    }
                    debug!(graph = %graph, "projection created concurrently, reusing");
                }
            }
        }
        Ok(graph)
    }

    async fn projection_exists(&self, session: &mut D::Session, graph: &str) -> Result<bool> {
        let result = session.run(&gds::graph_exists(graph)).await?;
        match result.first() {
            Some(row) => row.get::<bool>("exists"),
            None => Ok(false),
        }
    }

    async fn create_projection(
        &self,
        session: &mut D::Session,
        graph: &str,
        spec: &ProjectionSpec,
    ) -> Result<QueryResult> {
        debug!(graph, properties = ?spec.properties, "creating projection");
        session
            .run(&gds::graph_project(graph, &spec.node_label, &spec.relationship_type, &spec.properties))
            .await
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() { Err(Error::Closed) } else { Ok(()) }
    }
}

#[cfg(feature = "bolt")]
impl GraphClient<crate::driver::BoltDriver> {
    /// Connect to a Neo4j server over Bolt with the default projection
    /// settings.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        let conn = crate::config::ConnectionConfig::new(uri, user, password);
        Self::connect_with(&conn, ClientConfig::default()).await
    }

    pub async fn connect_with(conn: &crate::config::ConnectionConfig, config: ClientConfig) -> Result<Self> {
        info!(uri = %conn.uri, user = %conn.user, "connecting");
        let driver = crate::driver::BoltDriver::connect(conn).await?;
        Self::with_driver(driver, config).await
    }
}

/// Close the session, then report the call's own error first.
async fn finish<S: Session, T>(session: S, outcome: Result<T>) -> Result<T> {
    let closed = session.close().await;
    let value = outcome?;
    closed?;
    Ok(value)
}

fn rank_record(row: &ResultRow) -> Result<RankRecord> {
    Ok(RankRecord::new(row.get::<i64>("locid")?, row.get::<f64>("score")?))
}

/// Internal ids of both endpoints, or `None` if either is missing.
fn endpoint_ids(lookup: &QueryResult) -> Result<Option<(i64, i64)>> {
    let Some(row) = lookup.first() else {
        return Ok(None);
    };
    let a = row.get::<Option<i64>>("a_id")?;
    let b = row.get::<Option<i64>>("b_id")?;
    Ok(a.zip(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MemoryDriver;

    #[test]
    fn fingerprint_depends_on_properties() {
        let cfg = ClientConfig::default();
        let weighted = ProjectionSpec::weighted(&cfg);
        let plain = ProjectionSpec::unweighted(&cfg);
        assert_ne!(weighted.fingerprint(), plain.fingerprint());
        assert_eq!(weighted.fingerprint(), ProjectionSpec::weighted(&cfg).fingerprint());
    }

    #[test]
    fn graph_name_per_mode() {
        let cfg = ClientConfig::default();
        let spec = ProjectionSpec::weighted(&cfg);
        assert_eq!(spec.graph_name(&cfg), "graph");

        let cfg = cfg.with_projection_mode(ProjectionMode::Fingerprinted);
        let name = spec.graph_name(&cfg);
        assert!(name.starts_with("graph_"));
        assert_eq!(name.len(), "graph_".len() + 16);
    }

    #[test]
    fn endpoint_ids_need_both() {
        let mut lookup = QueryResult::new(vec!["a_id".into(), "b_id".into()]);
        assert_eq!(endpoint_ids(&lookup).unwrap(), None);

        lookup.rows.push([("a_id", Value::Int(4)), ("b_id", Value::Null)].into_iter().collect());
        assert_eq!(endpoint_ids(&lookup).unwrap(), None);

        lookup.rows[0].values.insert("b_id".into(), Value::Int(7));
        assert_eq!(endpoint_ids(&lookup).unwrap(), Some((4, 7)));
    }

    #[tokio::test]
    async fn zero_iterations_is_rejected_without_a_session() {
        let driver = MemoryDriver::new();
        let client = GraphClient::with_driver(driver.clone(), ClientConfig::default()).await.unwrap();
        let err = client.pagerank(0, "distance").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(driver.sessions_opened(), 0);
    }

    #[tokio::test]
    async fn calls_after_close_fail() {
        let driver = MemoryDriver::new();
        let client = GraphClient::with_driver(driver.clone(), ClientConfig::default()).await.unwrap();
        client.close().await.unwrap();
        client.close().await.unwrap();
        assert!(driver.is_closed());
        assert!(matches!(client.bfs(1, 2).await, Err(Error::Closed)));
    }
}
