//! End-to-end tests for breadth-first path lookup.
//!
//! Each test exercises: projection → endpoint lookup → gds.bfs.stream →
//! record shaping against MemoryDriver (or a scripted driver where the
//! engine's answer has to be forced).

mod common;

use pretty_assertions::assert_eq;

use neo4j_gds::cypher::gds;
use neo4j_gds::{ClientConfig, Error, GraphClient, MemoryDriver, PathRecord, Value};

use common::*;

// ============================================================================
// 1. The canonical chain
// ============================================================================

#[tokio::test]
async fn test_chain_path() {
    let driver = line_graph();
    let client = client_for(&driver).await;

    let result = client.bfs(1, 3).await.unwrap();

    assert_eq!(result, vec![PathRecord::from_names([1, 2, 3])]);
    assert_eq!(
        neo4j_gds::export::records_to_json(&result).unwrap(),
        r#"[{"path":[{"name":1},{"name":2},{"name":3}]}]"#
    );
}

#[tokio::test]
async fn test_path_starts_and_ends_at_endpoints() {
    let driver = MemoryDriver::new();
    for name in 1..=6 {
        driver.add_location(name);
    }
    for (from, to) in [(1, 2), (2, 3), (1, 4), (4, 5), (5, 6), (3, 6)] {
        driver.add_trip(from, to, 1.0, 1.0).unwrap();
    }
    let client = client_for(&driver).await;

    let result = client.bfs(1, 6).await.unwrap();

    assert_eq!(result.len(), 1);
    let path = &result[0];
    assert_eq!(path.start(), Some(1));
    assert_eq!(path.end(), Some(6));
}

#[tokio::test]
async fn test_path_lists_visited_nodes_in_order() {
    // 1 → 2 → 3 and 1 → 4: BFS visits 4 before reaching 3.
    let driver = MemoryDriver::new();
    for name in 1..=4 {
        driver.add_location(name);
    }
    driver.add_trip(1, 2, 1.0, 1.0).unwrap();
    driver.add_trip(1, 4, 1.0, 1.0).unwrap();
    driver.add_trip(2, 3, 1.0, 1.0).unwrap();
    let client = client_for(&driver).await;

    let result = client.bfs(1, 3).await.unwrap();

    assert_eq!(result, vec![PathRecord::from_names([1, 2, 4, 3])]);
    assert_eq!(result[0].len(), 4);
    assert_eq!(result[0].names().collect::<Vec<_>>(), vec![1, 2, 4, 3]);
}

#[tokio::test]
async fn test_same_start_and_end() {
    let driver = line_graph();
    let client = client_for(&driver).await;

    let result = client.bfs(2, 2).await.unwrap();

    assert_eq!(result, vec![PathRecord::from_names([2])]);
}

// ============================================================================
// 2. Unknown endpoints → empty path, no traversal
// ============================================================================

#[tokio::test]
async fn test_missing_start() {
    let driver = line_graph();
    let client = client_for(&driver).await;

    let result = client.bfs(99, 3).await.unwrap();

    assert_eq!(result, vec![PathRecord { path: vec![] }]);
    assert!(result[0].is_empty());
    assert!(!texts(&driver).iter().any(|t| t == gds::BFS_STREAM));
}

#[tokio::test]
async fn test_missing_end() {
    let driver = line_graph();
    let client = client_for(&driver).await;

    let result = client.bfs(1, 99).await.unwrap();

    assert_eq!(result, vec![PathRecord::empty()]);
    assert!(!texts(&driver).iter().any(|t| t == gds::BFS_STREAM));
}

#[tokio::test]
async fn test_lookup_is_exact_match_on_type() {
    let driver = line_graph();
    let client = client_for(&driver).await;

    let result = client.bfs("1", "3").await.unwrap();

    assert_eq!(result, vec![PathRecord::empty()]);
}

#[tokio::test]
async fn test_empty_graph() {
    let driver = MemoryDriver::new();
    let client = client_for(&driver).await;

    assert_eq!(client.bfs(1, 2).await.unwrap(), vec![PathRecord::empty()]);
}

// ============================================================================
// 3. Projection handling
// ============================================================================

#[tokio::test]
async fn test_projection_has_no_properties() {
    let driver = line_graph();
    let client = client_for(&driver).await;

    client.bfs(1, 3).await.unwrap();

    let project = driver
        .statements()
        .into_iter()
        .find(|s| s.text == gds::GRAPH_PROJECT)
        .unwrap();
    assert!(!project.params.contains_key("rprops"));
    assert_eq!(project.params["g"], Value::from("graph"));
}

#[tokio::test]
async fn test_bfs_after_pagerank_replaces_projection() {
    let driver = line_graph();
    let client = client_for(&driver).await;

    client.pagerank(20, "distance").await.unwrap();
    driver.clear_statements();
    client.bfs(1, 3).await.unwrap();

    let sent = texts(&driver);
    assert_eq!(sent[0], gds::GRAPH_EXISTS);
    assert_eq!(sent[1], gds::GRAPH_DROP);
    assert_eq!(sent[2], gds::GRAPH_PROJECT);
    assert!(sent[3].starts_with("MATCH (a:Location {name: $A}), (b:Location {name: $B})"));
    assert_eq!(sent[4], gds::BFS_STREAM);
    assert_eq!(sent.len(), 5);
}

#[tokio::test]
async fn test_repeated_calls_are_idempotent() {
    let driver = line_graph();
    let client = client_for(&driver).await;

    let first = client.bfs(1, 3).await.unwrap();
    let second = client.bfs(1, 3).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(driver.projections(), vec!["graph"]);
}

#[tokio::test]
async fn test_traversal_ids_come_from_lookup() {
    let driver = line_graph();
    let client = client_for(&driver).await;

    client.bfs(2, 3).await.unwrap();

    let bfs = driver
        .statements()
        .into_iter()
        .find(|s| s.text == gds::BFS_STREAM)
        .unwrap();
    assert_eq!(bfs.params["src"], Value::Int(1));
    assert_eq!(bfs.params["dst"], Value::Int(2));
}

// ============================================================================
// 4. Engine answers the memory driver never gives
// ============================================================================

#[tokio::test]
async fn test_absent_path_is_empty() {
    let driver = ScriptedDriver::new()
        .answer("MATCH", &["a_id", "b_id"], vec![vec![Value::Int(10), Value::Int(11)]])
        .answer("gds.bfs.stream", &["locpt"], vec![vec![Value::Null]]);
    let client = GraphClient::with_driver(driver, ClientConfig::default()).await.unwrap();

    assert_eq!(client.bfs(1, 2).await.unwrap(), vec![PathRecord::empty()]);
}

#[tokio::test]
async fn test_no_bfs_row_is_empty() {
    let driver = ScriptedDriver::new()
        .answer("MATCH", &["a_id", "b_id"], vec![vec![Value::Int(10), Value::Int(11)]]);
    let client = GraphClient::with_driver(driver, ClientConfig::default()).await.unwrap();

    assert_eq!(client.bfs(1, 2).await.unwrap(), vec![PathRecord::empty()]);
}

#[tokio::test]
async fn test_null_endpoint_id_is_missing() {
    let driver = ScriptedDriver::new()
        .answer("MATCH", &["a_id", "b_id"], vec![vec![Value::Int(10), Value::Null]]);
    let client = GraphClient::with_driver(driver.clone(), ClientConfig::default()).await.unwrap();

    assert_eq!(client.bfs(1, 2).await.unwrap(), vec![PathRecord::empty()]);
    assert!(!driver.statements().iter().any(|s| s.text == gds::BFS_STREAM));
}

#[tokio::test]
async fn test_names_are_coerced_to_integers() {
    let driver = ScriptedDriver::new()
        .answer("MATCH", &["a_id", "b_id"], vec![vec![Value::Int(0), Value::Int(1)]])
        .answer(
            "gds.bfs.stream",
            &["locpt"],
            vec![vec![Value::List(vec![Value::from("4"), Value::Float(5.0), Value::Int(6)])]],
        );
    let client = GraphClient::with_driver(driver, ClientConfig::default()).await.unwrap();

    assert_eq!(client.bfs(4, 6).await.unwrap(), vec![PathRecord::from_names([4, 5, 6])]);
}

#[tokio::test]
async fn test_non_integer_name_is_type_error() {
    let driver = ScriptedDriver::new()
        .answer("MATCH", &["a_id", "b_id"], vec![vec![Value::Int(0), Value::Int(1)]])
        .answer("gds.bfs.stream", &["locpt"], vec![vec![Value::from(vec!["north"])]]);
    let client = GraphClient::with_driver(driver, ClientConfig::default()).await.unwrap();

    assert!(matches!(client.bfs(1, 2).await, Err(Error::TypeError { .. })));
}
