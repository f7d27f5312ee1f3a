// crates/ingest-bench-core/src/catalog.rs
// ============================================================================
// Module: Query Catalog
// Description: Canonical query shapes mapped to opaque per-backend payloads.
// Purpose: Hand each read adapter its payload without interpreting it.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Five canonical [`QueryShape`]s each carry one payload per backend. Text
//! payloads (log queries, SQL) and JSON payloads (search request bodies) are
//! passed through untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::timing::Backend;

// ============================================================================
// SECTION: Shapes
// ============================================================================

/// Canonical query shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QueryShape {
    /// Count events per batch.
    #[serde(rename = "type_1")]
    Type1,
    /// Second canonical shape.
    #[serde(rename = "type_2")]
    Type2,
    /// Third canonical shape.
    #[serde(rename = "type_3")]
    Type3,
    /// Fourth canonical shape.
    #[serde(rename = "type_4")]
    Type4,
    /// Fifth canonical shape.
    #[serde(rename = "type_5")]
    Type5,
}

impl QueryShape {
    /// All shapes in order.
    pub const ALL: [Self; 5] = [Self::Type1, Self::Type2, Self::Type3, Self::Type4, Self::Type5];

    /// Returns the shape number.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Type1 => 1,
            Self::Type2 => 2,
            Self::Type3 => 3,
            Self::Type4 => 4,
            Self::Type5 => 5,
        }
    }

    /// Returns the metrics label (`query_type_<n>`).
    #[must_use]
    pub fn label(self) -> String {
        format!("query_type_{}", self.number())
    }

    /// Parses a shape number.
    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|shape| shape.number() == number)
    }
}

impl fmt::Display for QueryShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query_type_{}", self.number())
    }
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Opaque payload for one backend.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPayload {
    /// Query text (log query language or SQL).
    Text(String),
    /// JSON request body.
    Json(Value),
}

impl QueryPayload {
    /// Returns the text payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    /// Returns the JSON payload, if any.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

/// Payloads for one shape across all four backends.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendQueries {
    /// Log-store query text.
    pub log_store: String,
    /// Search-store request body.
    pub search_store: Value,
    /// Relational SQL.
    pub relational_store: String,
    /// Time-series SQL.
    pub timeseries_store: String,
}

impl BackendQueries {
    /// Returns the payload for a backend.
    #[must_use]
    pub fn payload(&self, backend: Backend) -> QueryPayload {
        match backend {
            Backend::LogStore => QueryPayload::Text(self.log_store.clone()),
            Backend::SearchStore => QueryPayload::Json(self.search_store.clone()),
            Backend::RelationalStore => QueryPayload::Text(self.relational_store.clone()),
            Backend::TimeseriesStore => QueryPayload::Text(self.timeseries_store.clone()),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Shape-to-payload mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryCatalog {
    /// Payloads keyed by shape.
    shapes: BTreeMap<QueryShape, BackendQueries>,
}

impl QueryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the payloads for a shape.
    pub fn insert(&mut self, shape: QueryShape, queries: BackendQueries) {
        self.shapes.insert(shape, queries);
    }

    /// Returns the payloads for a shape.
    #[must_use]
    pub fn get(&self, shape: QueryShape) -> Option<&BackendQueries> {
        self.shapes.get(&shape)
    }

    /// Returns the payload for a shape and backend.
    #[must_use]
    pub fn payload(&self, shape: QueryShape, backend: Backend) -> Option<QueryPayload> {
        self.get(shape).map(|queries| queries.payload(backend))
    }

    /// Returns the shapes that have no payloads.
    #[must_use]
    pub fn missing_shapes(&self) -> Vec<QueryShape> {
        QueryShape::ALL.into_iter().filter(|shape| !self.shapes.contains_key(shape)).collect()
    }

    /// Iterates shapes in order.
    pub fn iter(&self) -> impl Iterator<Item = (QueryShape, &BackendQueries)> {
        self.shapes.iter().map(|(shape, queries)| (*shape, queries))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::BackendQueries;
    use super::QueryCatalog;
    use super::QueryPayload;
    use super::QueryShape;
    use crate::timing::Backend;

    #[test]
    fn shapes_label_as_query_type_n() {
        assert_eq!(QueryShape::Type3.label(), "query_type_3");
        assert_eq!(QueryShape::from_number(5), Some(QueryShape::Type5));
        assert_eq!(QueryShape::from_number(6), None);
    }

    #[test]
    fn catalog_returns_backend_specific_payloads() {
        let mut catalog = QueryCatalog::new();
        catalog.insert(
            QueryShape::Type1,
            BackendQueries {
                log_store: "stats count(*)".to_string(),
                search_store: json!({"size": 0}),
                relational_store: "SELECT 1".to_string(),
                timeseries_store: "SELECT 2".to_string(),
            },
        );
        assert_eq!(catalog.payload(QueryShape::Type1, Backend::SearchStore), Some(QueryPayload::Json(json!({"size": 0}))));
        assert_eq!(
            catalog.payload(QueryShape::Type1, Backend::TimeseriesStore),
            Some(QueryPayload::Text("SELECT 2".to_string()))
        );
        assert_eq!(catalog.missing_shapes().len(), 4);
    }
}
