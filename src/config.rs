//! Connection and client configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_URI: &str = "bolt://localhost:7687";
pub const DEFAULT_USER: &str = "neo4j";

// ============================================================================
// Connection
// ============================================================================

/// Where and as whom to connect.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Env: `NEO4J_URI`, default `bolt://localhost:7687`.
    #[serde(default = "default_uri")]
    pub uri: String,
    /// Env: `NEO4J_USER`, default `neo4j`.
    #[serde(default = "default_user")]
    pub user: String,
    /// Env: `NEO4J_PASSWORD`, required.
    pub password: String,
    /// Env: `NEO4J_DATABASE`. `None` uses the server's default database.
    #[serde(default)]
    pub database: Option<String>,
}

fn default_uri() -> String { DEFAULT_URI.to_string() }
fn default_user() -> String { DEFAULT_USER.to_string() }

impl ConnectionConfig {
    pub fn new(uri: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            user: user.into(),
            password: password.into(),
            database: None,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Load from `NEO4J_*` environment variables.
    ///
    /// # Errors
    /// `Error::Config` if `NEO4J_PASSWORD` is unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let password = lookup("NEO4J_PASSWORD")
            .ok_or_else(|| Error::Config("NEO4J_PASSWORD is not set".into()))?;
        Ok(Self {
            uri: lookup("NEO4J_URI").unwrap_or_else(default_uri),
            user: lookup("NEO4J_USER").unwrap_or_else(default_user),
            password,
            database: lookup("NEO4J_DATABASE").filter(|db| !db.is_empty()),
        })
    }
}

// Keeps the password out of logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

// ============================================================================
// Weight property
// ============================================================================

/// Relationship properties PageRank can be weighted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightProperty {
    Distance,
    Fare,
}

impl WeightProperty {
    pub const ALL: [WeightProperty; 2] = [WeightProperty::Distance, WeightProperty::Fare];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightProperty::Distance => "distance",
            WeightProperty::Fare => "fare",
        }
    }

    /// Lenient parse: exact, case-sensitive match on `"distance"` or
    /// `"fare"`; anything else means unweighted.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.as_str() == s)
    }
}

impl fmt::Display for WeightProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Client
// ============================================================================

/// How the named projection is maintained between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Drop the projection if it exists, then project it again. Every call
    /// sees a fresh view of the stored graph.
    #[default]
    Recreate,
    /// Name the projection after a hash of its defining parameters and
    /// create it only when absent. Never dropped by a call.
    Fingerprinted,
}

/// Projection and algorithm settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub graph_name: String,
    pub node_label: String,
    pub relationship_type: String,
    /// Relationship properties carried by the ranking projection.
    pub weight_properties: Vec<String>,
    pub damping_factor: f64,
    pub projection_mode: ProjectionMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            graph_name: "graph".into(),
            node_label: "Location".into(),
            relationship_type: "TRIP".into(),
            weight_properties: WeightProperty::ALL.iter().map(|w| w.as_str().to_string()).collect(),
            damping_factor: 0.85,
            projection_mode: ProjectionMode::Recreate,
        }
    }
}

impl ClientConfig {
    pub fn with_projection_mode(mut self, mode: ProjectionMode) -> Self {
        self.projection_mode = mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.graph_name.is_empty() {
            return Err(Error::Config("graph_name must not be empty".into()));
        }
        crate::cypher::validate_identifier("node label", &self.node_label)
            .and_then(|_| crate::cypher::validate_identifier("relationship type", &self.relationship_type))
            .map_err(|e| Error::Config(e.to_string()))?;
        if !(0.0..1.0).contains(&self.damping_factor) {
            return Err(Error::Config(format!(
                "damping_factor must be in [0, 1), got {}",
                self.damping_factor
            )));
        }
        Ok(())
    }
}
