//! In-memory driver.
//!
//! Emulates the slice of a Neo4j + GDS server that the client talks to:
//! a small labelled graph, the named-graph catalog, the endpoint lookup,
//! and the `pageRank`/`bfs` stream procedures. Statements are recognised
//! by their exact text from [`crate::cypher::gds`]; anything else is
//! rejected the way a server rejects an unknown procedure.
//!
//! ## Limitations
//!
//! - **Not a query engine**: there is no Cypher parser. Only the
//!   statements the client sends are understood.
//! - **Reference algorithms only**: the stream procedures follow GDS
//!   semantics (snapshot projection, natural orientation, non-normalized
//!   PageRank, BFS visitation order) without any of its engineering.
//!
//! Use this driver for:
//! - Testing the client's projection handling and result shaping
//! - Offline demos without a running server
//! - Injecting connectivity and statement failures

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::cypher::gds::{
    self, BFS_STREAM, GRAPH_DROP, GRAPH_EXISTS, GRAPH_PROJECT, GRAPH_PROJECT_WITH_PROPERTIES,
    PAGERANK_STREAM, RESOLVE_PAIR_PREFIX,
};
use crate::cypher::Statement;
use crate::model::*;
use crate::result::{QueryResult, ResultRow};
use crate::session::{AccessMode, Session, SessionId};
use crate::{Error, Result};
use super::Driver;

/// GDS default convergence tolerance for PageRank.
const PAGERANK_TOLERANCE: f64 = 1e-7;

// ============================================================================
// Stored graph
// ============================================================================

#[derive(Debug, Clone)]
struct StoredNode {
    id: i64,
    label: String,
    name: Value,
}

#[derive(Debug, Clone)]
struct StoredRel {
    rel_type: String,
    src: i64,
    dst: i64,
    properties: PropertyMap,
}

/// A catalog entry: snapshot of the stored graph at projection time.
#[derive(Debug, Clone)]
struct Projection {
    nodes: Vec<i64>,
    properties: Vec<String>,
    /// node id → outgoing (target, relationship properties), in creation order
    adjacency: HashMap<i64, Vec<(i64, PropertyMap)>>,
}

// ============================================================================
// MemoryDriver
// ============================================================================

/// In-process stand-in for a Neo4j server with GDS installed.
///
/// Cloning is cheap and shares state, so a test can keep a handle for
/// inspection after moving a clone into a client.
#[derive(Clone, Default)]
pub struct MemoryDriver {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    nodes: RwLock<Vec<StoredNode>>,
    relationships: RwLock<Vec<StoredRel>>,
    catalog: RwLock<HashMap<String, Projection>>,
    log: RwLock<Vec<Statement>>,
    failures: RwLock<Vec<String>>,
    next_session_id: AtomicU64,
    open_sessions: AtomicUsize,
    unreachable: AtomicBool,
    closed: AtomicBool,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node with a `name` property. Returns its internal id.
    pub fn add_node(&self, label: &str, name: impl Into<Value>) -> i64 {
        let mut nodes = self.inner.nodes.write();
        let id = nodes.len() as i64;
        nodes.push(StoredNode { id, label: label.to_string(), name: name.into() });
        id
    }

    /// Create a relationship between the first nodes carrying the given names.
    pub fn add_relationship(
        &self,
        rel_type: &str,
        from: impl Into<Value>,
        to: impl Into<Value>,
        properties: PropertyMap,
    ) -> Result<()> {
        let (from, to) = (from.into(), to.into());
        let (src, dst) = {
            let nodes = self.inner.nodes.read();
            let find = |name: &Value| {
                nodes.iter()
                    .find(|n| n.name.matches(name))
                    .map(|n| n.id)
                    .ok_or_else(|| Error::NotFound(format!("Node with name {name}")))
            };
            (find(&from)?, find(&to)?)
        };
        self.inner.relationships.write().push(StoredRel {
            rel_type: rel_type.to_string(),
            src,
            dst,
            properties,
        });
        Ok(())
    }

    /// `(:Location {name})`
    pub fn add_location(&self, name: i64) -> i64 {
        self.add_node("Location", name)
    }

    /// `(:Location {name: from})-[:TRIP {distance, fare}]->(:Location {name: to})`
    pub fn add_trip(&self, from: i64, to: i64, distance: f64, fare: f64) -> Result<()> {
        self.add_relationship(
            "TRIP",
            from,
            to,
            crate::props! { "distance" => distance, "fare" => fare },
        )
    }

    /// Make `verify_connectivity` fail, as with a wrong address or
    /// bad credentials.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inner.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Fail every later statement whose text contains `needle`.
    pub fn fail_statements_containing(&self, needle: impl Into<String>) {
        self.inner.failures.write().push(needle.into());
    }

    /// Every statement run so far, in order.
    pub fn statements(&self) -> Vec<Statement> {
        self.inner.log.read().clone()
    }

    pub fn clear_statements(&self) {
        self.inner.log.write().clear();
    }

    /// Names of the projections currently in the catalog, sorted.
    pub fn projections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.catalog.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn open_sessions(&self) -> usize {
        self.inner.open_sessions.load(Ordering::SeqCst)
    }

    pub fn sessions_opened(&self) -> u64 {
        self.inner.next_session_id.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    type Session = MemorySession;

    async fn verify_connectivity(&self) -> Result<()> {
        if self.inner.unreachable.load(Ordering::SeqCst) {
            return Err(Error::Connection("memory engine marked unreachable".into()));
        }
        if self.is_closed() {
            return Err(Error::Connection("driver is closed".into()));
        }
        Ok(())
    }

    async fn session(&self, mode: AccessMode) -> Result<MemorySession> {
        if self.is_closed() {
            return Err(Error::Connection("driver is closed".into()));
        }
        let id = SessionId(self.inner.next_session_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.inner.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(MemorySession { id, mode, inner: Arc::clone(&self.inner) })
    }

    async fn close(&self) -> Result<()> {
        self.inner.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// MemorySession
// ============================================================================

pub struct MemorySession {
    id: SessionId,
    mode: AccessMode,
    inner: Arc<MemoryInner>,
}

#[async_trait]
impl Session for MemorySession {
    fn id(&self) -> SessionId { self.id }
    fn mode(&self) -> AccessMode { self.mode }

    async fn run(&mut self, statement: &Statement) -> Result<QueryResult> {
        self.inner.log.write().push(statement.clone());

        if let Some(needle) = self.inner.failures.read().iter().find(|n| statement.text.contains(n.as_str())) {
            return Err(Error::Query(format!("injected failure for statement matching '{needle}'")));
        }

        let rows = self.inner.dispatch(statement, self.mode)?;
        Ok(QueryResult { columns: statement.columns.clone(), rows })
    }

    async fn close(self) -> Result<()> {
        self.inner.open_sessions.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Statement handlers
// ============================================================================

fn param<'a>(stmt: &'a Statement, key: &str) -> Result<&'a Value> {
    stmt.params.get(key)
        .ok_or_else(|| Error::Query(format!("Expected parameter(s): {key}")))
}

fn str_param<'a>(stmt: &'a Statement, key: &str) -> Result<&'a str> {
    param(stmt, key)?.as_str()
        .ok_or_else(|| Error::Query(format!("Parameter `{key}` must be a STRING")))
}

fn int_param(stmt: &Statement, key: &str) -> Result<i64> {
    param(stmt, key)?.as_int()
        .ok_or_else(|| Error::Query(format!("Parameter `{key}` must be an INTEGER")))
}

fn single_row(column: &str, value: Value) -> Vec<ResultRow> {
    vec![[(column, value)].into_iter().collect()]
}

impl MemoryInner {
    fn dispatch(&self, stmt: &Statement, mode: AccessMode) -> Result<Vec<ResultRow>> {
        match stmt.text.as_str() {
            GRAPH_EXISTS => self.graph_exists(stmt),
            GRAPH_DROP => {
                require_write(mode, "gds.graph.drop")?;
                self.graph_drop(stmt)
            }
            GRAPH_PROJECT | GRAPH_PROJECT_WITH_PROPERTIES => {
                require_write(mode, "gds.graph.project")?;
                self.graph_project(stmt)
            }
            PAGERANK_STREAM => self.pagerank_stream(stmt),
            BFS_STREAM => self.bfs_stream(stmt),
            text if text.starts_with(RESOLVE_PAIR_PREFIX) => self.resolve_pair(stmt),
            text => Err(Error::Query(format!("Unsupported statement: {text}"))),
        }
    }

    fn graph_exists(&self, stmt: &Statement) -> Result<Vec<ResultRow>> {
        let name = str_param(stmt, "g")?;
        let exists = self.catalog.read().contains_key(name);
        Ok(single_row("exists", Value::Bool(exists)))
    }

    fn graph_drop(&self, stmt: &Statement) -> Result<Vec<ResultRow>> {
        let name = str_param(stmt, "g")?;
        match self.catalog.write().remove(name) {
            Some(_) => Ok(single_row("graphName", Value::from(name))),
            None => Err(Error::Query(format!("Graph with name `{name}` does not exist."))),
        }
    }

    fn graph_project(&self, stmt: &Statement) -> Result<Vec<ResultRow>> {
        let name = str_param(stmt, "g")?;
        let node_label = str_param(stmt, "nl")?;
        let rel_type = str_param(stmt, "rl")?;
        let properties: Vec<String> = match stmt.params.get("rprops") {
            Some(v) => crate::result::FromValue::from_value(v)
                .map_err(|_| Error::Query("relationshipProperties must be a list of strings".into()))?,
            None => Vec::new(),
        };

        let mut catalog = self.catalog.write();
        if catalog.contains_key(name) {
            return Err(Error::Query(format!("A graph with name '{name}' already exists.")));
        }

        let nodes = self.nodes.read();
        let node_ids: Vec<i64> = nodes.iter()
            .filter(|n| n.label == node_label)
            .map(|n| n.id)
            .collect();
        let members: HashSet<i64> = node_ids.iter().copied().collect();

        let rels = self.relationships.read();
        let selected: Vec<&StoredRel> = rels.iter()
            .filter(|r| r.rel_type == rel_type && members.contains(&r.src) && members.contains(&r.dst))
            .collect();

        if !selected.is_empty() {
            for key in &properties {
                if !selected.iter().any(|r| r.properties.contains_key(key)) {
                    return Err(Error::Query(format!(
                        "Relationship properties not found: '{key}' (for relationship type '{rel_type}')"
                    )));
                }
            }
        }

        let mut adjacency: HashMap<i64, Vec<(i64, PropertyMap)>> = HashMap::new();
        for rel in selected {
            let kept: PropertyMap = properties.iter()
                .filter_map(|k| rel.properties.get(k).map(|v| (k.clone(), v.clone())))
                .collect();
            adjacency.entry(rel.src).or_default().push((rel.dst, kept));
        }

        catalog.insert(name.to_string(), Projection { nodes: node_ids, properties, adjacency });
        Ok(single_row("graphName", Value::from(name)))
    }

    fn projection(&self, name: &str) -> Result<Projection> {
        self.catalog.read().get(name).cloned()
            .ok_or_else(|| Error::Query(format!("Graph with name `{name}` does not exist.")))
    }

    fn name_of(&self, id: i64) -> Value {
        self.nodes.read().get(id as usize).map(|n| n.name.clone()).unwrap_or(Value::Null)
    }

    fn pagerank_stream(&self, stmt: &Statement) -> Result<Vec<ResultRow>> {
        let proj = self.projection(str_param(stmt, "g")?)?;
        let cfg = param(stmt, "cfg")?.as_map()
            .ok_or_else(|| Error::Query("PageRank configuration must be a MAP".into()))?;

        let max_iterations = cfg.get(gds::MAX_ITERATIONS).and_then(Value::as_int).unwrap_or(20);
        if max_iterations < 1 {
            return Err(Error::Query(format!(
                "Value for `maxIterations` was `{max_iterations}`, but must be within the range [1, 2147483647]."
            )));
        }
        let damping = cfg.get(gds::DAMPING_FACTOR).and_then(Value::as_float).unwrap_or(0.85);
        if !(0.0..1.0).contains(&damping) {
            return Err(Error::Query(format!(
                "Value for `dampingFactor` was `{damping}`, but must be within the range [0.00, 1.00)."
            )));
        }
        let weight = match cfg.get(gds::RELATIONSHIP_WEIGHT_PROPERTY) {
            None | Some(Value::Null) => None,
            Some(Value::String(key)) if proj.properties.contains(key) => Some(key.as_str()),
            Some(other) => {
                return Err(Error::Query(format!(
                    "Relationship weight property `{}` not found in relationship properties {:?}.",
                    other.as_str().unwrap_or("?"),
                    proj.properties
                )))
            }
        };

        let scores = page_rank(&proj, max_iterations as usize, damping, weight);
        let mut ranked: Vec<(i64, f64)> = proj.nodes.iter().map(|id| (*id, scores[id])).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(ranked.into_iter()
            .map(|(id, score)| {
                [("locid", self.name_of(id)), ("score", Value::Float(score))]
                    .into_iter()
                    .collect::<ResultRow>()
            })
            .collect())
    }

    fn resolve_pair(&self, stmt: &Statement) -> Result<Vec<ResultRow>> {
        let label = stmt.text[RESOLVE_PAIR_PREFIX.len()..]
            .split_whitespace()
            .next()
            .unwrap_or_default();
        let a = param(stmt, "A")?;
        let b = param(stmt, "B")?;

        let nodes = self.nodes.read();
        let matching = |name: &Value| -> Vec<i64> {
            nodes.iter()
                .filter(|n| n.label == label && n.name.matches(name))
                .map(|n| n.id)
                .collect()
        };

        let mut rows = Vec::new();
        for a_id in matching(a) {
            for b_id in matching(b) {
                rows.push(
                    [("a_id", Value::Int(a_id)), ("b_id", Value::Int(b_id))]
                        .into_iter()
                        .collect::<ResultRow>(),
                );
            }
        }
        Ok(rows)
    }

    fn bfs_stream(&self, stmt: &Statement) -> Result<Vec<ResultRow>> {
        let proj = self.projection(str_param(stmt, "g")?)?;
        let source = int_param(stmt, "src")?;
        let target = int_param(stmt, "dst")?;
        for id in [source, target] {
            if !proj.nodes.contains(&id) {
                return Err(Error::Query(format!("Node with id {id} does not exist in the projected graph.")));
            }
        }

        let visited = bfs_visit(&proj, source, target);
        let names: Vec<Value> = visited.into_iter().map(|id| self.name_of(id)).collect();
        Ok(single_row("locpt", Value::List(names)))
    }
}

fn require_write(mode: AccessMode, procedure: &str) -> Result<()> {
    match mode {
        AccessMode::Write => Ok(()),
        AccessMode::Read => Err(Error::Query(format!(
            "Writing in read access mode not allowed. Attempted to call `{procedure}`."
        ))),
    }
}

// ============================================================================
// Reference algorithms
// ============================================================================

/// Non-normalized PageRank: every node starts at `1 - d`; a node passes
/// its score along outgoing relationships in proportion to their weight.
/// Stops after `max_iterations` or when no score moves by more than the
/// tolerance.
fn page_rank(proj: &Projection, max_iterations: usize, damping: f64, weight: Option<&str>) -> HashMap<i64, f64> {
    let base = 1.0 - damping;
    let edge_weight = |props: &PropertyMap| match weight {
        Some(key) => props.get(key).and_then(Value::as_float).unwrap_or(0.0),
        None => 1.0,
    };
    let out_weight: HashMap<i64, f64> = proj.adjacency.iter()
        .map(|(src, out)| (*src, out.iter().map(|(_, p)| edge_weight(p)).sum()))
        .collect();

    let mut scores: HashMap<i64, f64> = proj.nodes.iter().map(|id| (*id, base)).collect();
    for _ in 0..max_iterations {
        let mut next: HashMap<i64, f64> = proj.nodes.iter().map(|id| (*id, 0.0)).collect();
        for (src, out) in &proj.adjacency {
            let total = out_weight[src];
            if total <= 0.0 {
                continue;
            }
            for (dst, props) in out {
                *next.entry(*dst).or_default() += scores[src] * edge_weight(props) / total;
            }
        }
        let mut converged = true;
        for (id, incoming) in next.iter_mut() {
            *incoming = base + damping * *incoming;
            if (*incoming - scores[id]).abs() > PAGERANK_TOLERANCE {
                converged = false;
            }
        }
        scores = next;
        if converged {
            break;
        }
    }
    scores
}

/// Breadth-first visitation order from `source`, stopping once `target`
/// has been visited. When `target` is unreachable every reachable node
/// is returned.
fn bfs_visit(proj: &Projection, source: i64, target: i64) -> Vec<i64> {
    let mut order = vec![source];
    let mut seen: HashSet<i64> = HashSet::from([source]);
    let mut queue = VecDeque::from([source]);
    if source == target {
        return order;
    }
    while let Some(node) = queue.pop_front() {
        for (next, _) in proj.adjacency.get(&node).map(Vec::as_slice).unwrap_or_default() {
            if seen.insert(*next) {
                order.push(*next);
                if *next == target {
                    return order;
                }
                queue.push_back(*next);
            }
        }
    }
    order
}
