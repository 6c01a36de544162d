//! End-to-end tests against a live Neo4j server with GDS installed.
//!
//! Run with `NEO4J_PASSWORD` (and optionally `NEO4J_URI`, `NEO4J_USER`)
//! set: `cargo test --features bolt -- --ignored`.

#![cfg(feature = "bolt")]

use neo4j_gds::{AccessMode, BoltDriver, ConnectionConfig, Driver, Error, Session};

async fn live_driver() -> BoltDriver {
    let conn = ConnectionConfig::from_env().unwrap();
    let driver = BoltDriver::connect(&conn).await.unwrap();
    driver.verify_connectivity().await.unwrap();
    driver
}

#[tokio::test]
#[ignore = "Needs a running Neo4j server reachable through NEO4J_* variables."]
async fn test_close_releases_pool() {
    let driver = live_driver().await;

    driver.close().await.unwrap();
    driver.close().await.unwrap();

    assert!(matches!(driver.session(AccessMode::Write).await, Err(Error::Connection(_))));
    assert!(matches!(driver.verify_connectivity().await, Err(Error::Connection(_))));
}

#[tokio::test]
#[ignore = "Needs a running Neo4j server reachable through NEO4J_* variables."]
async fn test_open_session_outlives_close() {
    let driver = live_driver().await;
    let mut session = driver.session(AccessMode::Read).await.unwrap();

    driver.close().await.unwrap();

    let stmt = neo4j_gds::Statement::new("RETURN 1 AS ok").yields(["ok"]);
    let result = session.run(&stmt).await.unwrap();
    assert_eq!(result.first().unwrap().get::<i64>("ok").unwrap(), 1);
    session.close().await.unwrap();
}
