//! Caller-facing query options: the `options` object accepted by the read
//! operation, deserialized as-is and translated per entity at call time.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Options accepted by the generic read operation. Every part is optional;
/// an empty spec selects all rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuerySpec {
    /// Projection: field names to return. `None` returns every column.
    pub attributes: Option<Vec<String>>,
    /// Filter tree in the request dialect.
    pub filter: Option<Map<String, Value>>,
    pub include: Option<Vec<IncludeSpec>>,
    /// Sort paths. Each entry is an alias chain plus a terminal field and an
    /// optional trailing `asc`/`desc` token.
    pub order: Option<Vec<Vec<String>>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(mut self, attributes: &[&str]) -> Self {
        self.attributes = Some(attributes.iter().map(|a| (*a).to_string()).collect());
        self
    }

    pub fn with_filter(mut self, filter: Map<String, Value>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_include(mut self, include: Vec<IncludeSpec>) -> Self {
        self.include = Some(include);
        self
    }

    pub fn with_order(mut self, order: Vec<Vec<String>>) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// One include entry: either a bare traversal path or an options object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IncludeSpec {
    Path(String),
    Options(IncludeOptions),
}

/// Expanded include form carrying projection, filter, and nested includes.
#[derive(Debug, Clone, Deserialize)]
pub struct IncludeOptions {
    /// Traversal path from the parent entity, dot-separated for multi-hop.
    pub model: String,
    pub attributes: Option<Vec<String>>,
    pub filter: Option<Map<String, Value>>,
    pub include: Option<Vec<IncludeSpec>>,
}
