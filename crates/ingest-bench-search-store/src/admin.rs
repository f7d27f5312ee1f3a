// crates/ingest-bench-search-store/src/admin.rs
// ============================================================================
// Module: Collection Administration
// Description: Existence checks, creation, deletion, refresh, and reindex.
// Purpose: Manage benchmark collections independently of reads and writes.
// Dependencies: ingest-bench-core, serde_json
// ============================================================================

//! ## Overview
//! [`CollectionAdmin`] wraps the index-level endpoints. Creation is
//! idempotent: a concurrent creator's `resource_already_exists_exception` is
//! treated as success.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use ingest_bench_core::EventLog;
use ingest_bench_core::LogEvent;
use ingest_bench_core::RecordSchema;
use serde_json::Value;
use serde_json::json;

use crate::error::SearchStoreError;
use crate::mapping::collection_body;
use crate::response::check_response;
use crate::transport::Method;
use crate::transport::SearchRequest;
use crate::transport::SearchTransport;

/// Component label for log events.
const COMPONENT: &str = "search_store";
/// Error type reported when creating a collection that exists.
const ALREADY_EXISTS: &str = "resource_already_exists_exception";

// ============================================================================
// SECTION: Admin
// ============================================================================

/// Index-level operations.
#[derive(Clone)]
pub struct CollectionAdmin {
    /// Cluster transport.
    transport: Arc<dyn SearchTransport>,
    /// Structured event log.
    log: Arc<dyn EventLog>,
}

impl CollectionAdmin {
    /// Creates an admin handle over a transport.
    #[must_use]
    pub fn new(transport: Arc<dyn SearchTransport>, log: Arc<dyn EventLog>) -> Self {
        Self {
            transport,
            log,
        }
    }

    /// Returns whether the collection exists.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] for statuses other than 2xx and 404.
    pub fn collection_exists(&self, index: &str) -> Result<bool, SearchStoreError> {
        let response = self.transport.send(&SearchRequest::new(Method::Head, index))?;
        match response.status {
            404 => Ok(false),
            status if (200 .. 300).contains(&status) => Ok(true),
            status => Err(SearchStoreError::Status {
                status,
                detail: response.body.unwrap_or(Value::Null),
            }),
        }
    }

    /// Creates the collection with schema mappings unless it exists.
    ///
    /// Returns true when this call created it.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] when the check or creation fails.
    pub fn ensure_collection(&self, index: &str, schema: &RecordSchema) -> Result<bool, SearchStoreError> {
        if self.collection_exists(index)? {
            return Ok(false);
        }
        let request = SearchRequest::json(Method::Put, index, collection_body(schema));
        check_response(self.transport.send(&request)?, &[ALREADY_EXISTS.to_string()])?;
        self.log.record(&LogEvent::info(COMPONENT, "collection_created", "created collection").field("index", index));
        Ok(true)
    }

    /// Deletes the collection; a missing collection is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] when deletion fails.
    pub fn delete_collection(&self, index: &str) -> Result<(), SearchStoreError> {
        let response = self.transport.send(&SearchRequest::new(Method::Delete, index))?;
        if response.status == 404 {
            return Ok(());
        }
        check_response(response, &[])?;
        self.log.record(&LogEvent::info(COMPONENT, "collection_deleted", "deleted collection").field("index", index));
        Ok(())
    }

    /// Makes recent writes visible to searches.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] when the refresh fails.
    pub fn refresh_collection(&self, index: &str) -> Result<(), SearchStoreError> {
        let request = SearchRequest::new(Method::Post, format!("{index}/_refresh"));
        check_response(self.transport.send(&request)?, &[])?;
        Ok(())
    }

    /// Copies documents between collections, optionally restricted to fields.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] when the reindex fails.
    pub fn reindex(&self, source: &str, destination: &str, fields: Option<&[String]>) -> Result<Value, SearchStoreError> {
        let mut source_spec = json!({"index": source});
        if let Some(fields) = fields {
            source_spec["_source"] = json!(fields);
        }
        let body = json!({"source": source_spec, "dest": {"index": destination}});
        let request = SearchRequest::json(Method::Post, "_reindex?wait_for_completion=true", body);
        check_response(self.transport.send(&request)?, &[])
    }
}
