//! GDS catalog and algorithm statements.
//!
//! | Statement | Procedure | Yields |
//! |-----------|-----------|--------|
//! | [`graph_exists`] | `gds.graph.exists` | `exists` |
//! | [`graph_drop`] | `gds.graph.drop` | `graphName` |
//! | [`graph_project`] | `gds.graph.project` | `graphName` |
//! | [`pagerank_stream`] | `gds.pageRank.stream` | `locid, score` |
//! | [`resolve_pair`] | `MATCH` by `name` | `a_id, b_id` |
//! | [`bfs_stream`] | `gds.bfs.stream` | `locpt` |

use crate::config::WeightProperty;
use crate::model::{PropertyMap, Value};
use crate::Result;
use super::{validate_identifier, Statement};

pub const GRAPH_EXISTS: &str = "CALL gds.graph.exists($g) YIELD exists RETURN exists";

pub const GRAPH_DROP: &str = "CALL gds.graph.drop($g) YIELD graphName RETURN graphName";

pub const GRAPH_PROJECT: &str =
    "CALL gds.graph.project($g, $nl, $rl) YIELD graphName RETURN graphName";

pub const GRAPH_PROJECT_WITH_PROPERTIES: &str =
    "CALL gds.graph.project($g, $nl, $rl, {relationshipProperties: $rprops}) \
     YIELD graphName RETURN graphName";

pub const PAGERANK_STREAM: &str =
    "CALL gds.pageRank.stream($g, $cfg) YIELD nodeId, score \
     RETURN gds.util.asNode(nodeId).name AS locid, score ORDER BY score DESC";

pub const BFS_STREAM: &str =
    "CALL gds.bfs.stream($g, {sourceNode: $src, targetNodes: [$dst]}) YIELD nodeIds \
     RETURN [nid IN nodeIds | gds.util.asNode(nid).name] AS locpt";

/// Prefix of the endpoint lookup; the label is spliced in after it.
pub const RESOLVE_PAIR_PREFIX: &str = "MATCH (a:";

// GDS configuration keys.
pub const MAX_ITERATIONS: &str = "maxIterations";
pub const DAMPING_FACTOR: &str = "dampingFactor";
pub const RELATIONSHIP_WEIGHT_PROPERTY: &str = "relationshipWeightProperty";

pub fn graph_exists(graph: &str) -> Statement {
    Statement::new(GRAPH_EXISTS).param("g", graph).yields(["exists"])
}

pub fn graph_drop(graph: &str) -> Statement {
    Statement::new(GRAPH_DROP).param("g", graph).yields(["graphName"])
}

/// Native projection of one node label and one relationship type.
///
/// With an empty `properties` slice the relationship-properties map is
/// left out entirely.
pub fn graph_project(
    graph: &str,
    node_label: &str,
    relationship_type: &str,
    properties: &[String],
) -> Statement {
    let stmt = if properties.is_empty() {
        Statement::new(GRAPH_PROJECT)
    } else {
        Statement::new(GRAPH_PROJECT_WITH_PROPERTIES).param("rprops", properties.to_vec())
    };
    stmt.param("g", graph)
        .param("nl", node_label)
        .param("rl", relationship_type)
        .yields(["graphName"])
}

/// PageRank stream configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankConfig {
    pub max_iterations: u32,
    pub damping_factor: f64,
    pub weight: Option<WeightProperty>,
}

impl PageRankConfig {
    /// The `$cfg` map. Without a weight the
    /// `relationshipWeightProperty` key is absent, which makes the
    /// ranking unweighted.
    pub fn to_map(&self) -> PropertyMap {
        let mut cfg = PropertyMap::new();
        cfg.insert(MAX_ITERATIONS.into(), Value::from(self.max_iterations));
        cfg.insert(DAMPING_FACTOR.into(), Value::Float(self.damping_factor));
        if let Some(weight) = self.weight {
            cfg.insert(RELATIONSHIP_WEIGHT_PROPERTY.into(), Value::from(weight.as_str()));
        }
        cfg
    }
}

pub fn pagerank_stream(graph: &str, config: &PageRankConfig) -> Statement {
    Statement::new(PAGERANK_STREAM)
        .param("g", graph)
        .param("cfg", Value::Map(config.to_map()))
        .yields(["locid", "score"])
}

/// Resolve two `name` values to internal node ids in one round trip.
/// Yields no row unless both exist.
pub fn resolve_pair(node_label: &str, start: Value, last: Value) -> Result<Statement> {
    validate_identifier("node label", node_label)?;
    let text = format!(
        "{RESOLVE_PAIR_PREFIX}{node_label} {{name: $A}}), (b:{node_label} {{name: $B}}) \
         RETURN id(a) AS a_id, id(b) AS b_id"
    );
    Ok(Statement::new(text)
        .param("A", start)
        .param("B", last)
        .yields(["a_id", "b_id"]))
}

pub fn bfs_stream(graph: &str, source: i64, target: i64) -> Statement {
    Statement::new(BFS_STREAM)
        .param("g", graph)
        .param("src", source)
        .param("dst", target)
        .yields(["locpt"])
}
