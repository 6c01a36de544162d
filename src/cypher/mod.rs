//! # Cypher statements
//!
//! The client never parses Cypher; it only sends a fixed set of
//! parameterized statements. A [`Statement`] carries the text, its
//! parameters, and the columns it yields, so a driver knows which cells
//! to decode without inspecting the row.

pub mod gds;

pub use gds::PageRankConfig;

use crate::model::PropertyMap;
use crate::{Error, Result};

/// A parameterized statement ready to be sent to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub params: PropertyMap,
    pub columns: Vec<String>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), params: PropertyMap::new(), columns: Vec::new() }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<crate::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn yields<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Check that a label or relationship type can be spliced into a pattern.
///
/// Parameters cannot stand in for labels in `MATCH`, so labels are
/// interpolated and must be plain identifiers.
pub fn validate_identifier(kind: &str, ident: &str) -> Result<()> {
    let mut chars = ident.chars();
    let head_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("{kind} '{ident}' is not a valid identifier")))
    }
}
