//! Result records returned by the analytics calls.

use serde::{Deserialize, Serialize};

/// Identifier used in place of a location name when a ranking run
/// produced no nodes.
pub const SENTINEL_NAME: i64 = -1;

/// One ranked location: `{name, score}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankRecord {
    pub name: i64,
    pub score: f64,
}

impl RankRecord {
    pub fn new(name: i64, score: f64) -> Self {
        Self { name, score }
    }

    /// `{name: -1, score: 0.0}`, returned twice for an empty ranking.
    pub fn sentinel() -> Self {
        Self { name: SENTINEL_NAME, score: 0.0 }
    }

    pub fn is_sentinel(&self) -> bool {
        self.name == SENTINEL_NAME && self.score == 0.0
    }
}

/// One visited location on a traversal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathStep {
    pub name: i64,
}

/// A traversal result: `{path: [{name}, ...]}` in visitation order.
///
/// An empty `path` means either endpoint was unknown or the traversal
/// yielded nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    pub path: Vec<PathStep>,
}

impl PathRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_names(names: impl IntoIterator<Item = i64>) -> Self {
        Self { path: names.into_iter().map(|name| PathStep { name }).collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn start(&self) -> Option<i64> {
        self.path.first().map(|s| s.name)
    }

    pub fn end(&self) -> Option<i64> {
        self.path.last().map(|s| s.name)
    }

    pub fn names(&self) -> impl Iterator<Item = i64> + '_ {
        self.path.iter().map(|s| s.name)
    }
}
