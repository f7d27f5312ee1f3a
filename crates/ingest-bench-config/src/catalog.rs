// crates/ingest-bench-config/src/catalog.rs
// ============================================================================
// Module: Query Catalog Loader
// Description: TOML query catalog parsing and completeness checks.
// Purpose: Turn `catalog/queries.toml` into a validated `QueryCatalog`.
// Dependencies: ingest-bench-core, serde, serde_json, toml
// ============================================================================

//! ## Overview
//! The catalog file holds one table per shape (`[type_1]` .. `[type_5]`),
//! each with a `log_store`, `search_store`, `relational_store`, and
//! `timeseries_store` payload. Search payloads are JSON request bodies kept
//! in TOML strings and must parse as JSON objects. Every shape and every
//! backend must be present; the payloads are otherwise left untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ingest_bench_core::BackendQueries;
use ingest_bench_core::QueryCatalog;
use ingest_bench_core::QueryShape;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ConfigError;
use crate::config::MAX_CONFIG_FILE_SIZE;
use crate::config::validate_path_string;

// ============================================================================
// SECTION: File Model
// ============================================================================

/// One shape table as written in the file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShapeEntry {
    /// Log-store query text.
    log_store: String,
    /// Search-store request body as JSON text.
    search_store: String,
    /// Relational SQL.
    relational_store: String,
    /// Time-series SQL.
    timeseries_store: String,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Reads and validates the catalog at `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or fails
/// [`parse_catalog`].
pub fn load_catalog(path: &Path) -> Result<QueryCatalog, ConfigError> {
    validate_path_string("catalog_path", &path.to_string_lossy())?;
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid("catalog file exceeds size limit".to_string()));
    }
    let content =
        std::str::from_utf8(&bytes).map_err(|_| ConfigError::Invalid("catalog file must be utf-8".to_string()))?;
    parse_catalog(content)
}

/// Parses catalog TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed TOML and
/// [`ConfigError::Invalid`] for unknown or missing shapes, blank payloads,
/// or search payloads that are not JSON objects.
pub fn parse_catalog(content: &str) -> Result<QueryCatalog, ConfigError> {
    let entries: BTreeMap<String, ShapeEntry> =
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
    let mut catalog = QueryCatalog::new();
    for (key, entry) in entries {
        let shape = parse_shape_key(&key)?;
        catalog.insert(shape, entry_queries(shape, entry)?);
    }
    let missing = catalog.missing_shapes();
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|shape| format!("type_{}", shape.number())).collect();
        return Err(ConfigError::Invalid(format!("catalog is missing shapes: {}", names.join(", "))));
    }
    Ok(catalog)
}

/// Resolves a `type_<n>` table name.
fn parse_shape_key(key: &str) -> Result<QueryShape, ConfigError> {
    key.strip_prefix("type_")
        .and_then(|number| number.parse::<u8>().ok())
        .and_then(QueryShape::from_number)
        .ok_or_else(|| ConfigError::Invalid(format!("unknown catalog shape: {key}")))
}

/// Validates one shape table.
fn entry_queries(shape: QueryShape, entry: ShapeEntry) -> Result<BackendQueries, ConfigError> {
    for (backend, text) in [
        ("log_store", &entry.log_store),
        ("search_store", &entry.search_store),
        ("relational_store", &entry.relational_store),
        ("timeseries_store", &entry.timeseries_store),
    ] {
        if text.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{shape} {backend} payload is empty")));
        }
    }
    let search_store: Value = serde_json::from_str(&entry.search_store)
        .map_err(|err| ConfigError::Invalid(format!("{shape} search_store payload is not json: {err}")))?;
    if !search_store.is_object() {
        return Err(ConfigError::Invalid(format!("{shape} search_store payload must be a json object")));
    }
    Ok(BackendQueries {
        log_store: entry.log_store.trim().to_string(),
        search_store,
        relational_store: entry.relational_store.trim().to_string(),
        timeseries_store: entry.timeseries_store.trim().to_string(),
    })
}
