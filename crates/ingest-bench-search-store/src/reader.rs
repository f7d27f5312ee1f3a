// crates/ingest-bench-search-store/src/reader.rs
// ============================================================================
// Module: Search Store Reader
// Description: Document lookups, searches, scroll drains, and cursor paging.
// Purpose: Read benchmark documents back and run catalog query bodies.
// Dependencies: ingest-bench-core, serde_json
// ============================================================================

//! ## Overview
//! Full drains come in two forms:
//! - [`SearchStoreReader::scroll_all`] follows scroll ids until a page comes
//!   back empty or without an id, then clears every scroll context it opened.
//! - [`SearchStoreReader::paginate`] follows `search_after` cursors taken
//!   from the last hit's sort values until a page is empty or the cursor
//!   stops advancing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use ingest_bench_core::Backend;
use ingest_bench_core::BackendError;
use ingest_bench_core::EventLog;
use ingest_bench_core::LogEvent;
use ingest_bench_core::QueryPayload;
use ingest_bench_core::QueryRunner;
use serde_json::Value;
use serde_json::json;

use crate::config::SearchStoreConfig;
use crate::error::SearchStoreError;
use crate::response::check_response;
use crate::transport::Method;
use crate::transport::SearchRequest;
use crate::transport::SearchTransport;

/// Component label for log events.
const COMPONENT: &str = "search_store";

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Search-store read adapter.
pub struct SearchStoreReader {
    /// Cluster transport.
    transport: Arc<dyn SearchTransport>,
    /// Adapter settings.
    config: SearchStoreConfig,
    /// Structured event log.
    log: Arc<dyn EventLog>,
}

impl SearchStoreReader {
    /// Creates a reader over an injected transport.
    #[must_use]
    pub fn new(transport: Arc<dyn SearchTransport>, config: SearchStoreConfig, log: Arc<dyn EventLog>) -> Self {
        Self {
            transport,
            config,
            log,
        }
    }

    /// Sends a request and validates the response.
    fn call(&self, request: &SearchRequest) -> Result<Value, SearchStoreError> {
        check_response(self.transport.send(request)?, &self.config.ignored_item_errors)
    }

    /// Fetches one document's source, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] for failures other than a missing document.
    pub fn get_document(&self, index: &str, id: &str) -> Result<Option<Value>, SearchStoreError> {
        let response = self.transport.send(&SearchRequest::new(Method::Get, format!("{index}/_doc/{id}")))?;
        if response.status == 404 {
            return Ok(None);
        }
        let body = check_response(response, &self.config.ignored_item_errors)?;
        if body.get("found").and_then(Value::as_bool) == Some(false) {
            return Ok(None);
        }
        Ok(body.get("_source").cloned())
    }

    /// Fetches several documents by id, returning the `docs` entries.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] when the request fails.
    pub fn get_documents(&self, index: &str, ids: &[String]) -> Result<Vec<Value>, SearchStoreError> {
        let request = SearchRequest::json(Method::Post, format!("{index}/_mget"), json!({"ids": ids}));
        let body = self.call(&request)?;
        Ok(body.get("docs").and_then(Value::as_array).cloned().unwrap_or_default())
    }

    /// Runs a search body and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] when the search fails.
    pub fn query(&self, index: &str, body: &Value) -> Result<Value, SearchStoreError> {
        self.call(&SearchRequest::json(Method::Post, format!("{index}/_search"), body.clone()))
    }

    /// Drains every hit of a search through scroll contexts.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] when a page request fails. Scroll contexts
    /// are cleared before returning either way.
    pub fn scroll_all(&self, index: &str, body: &Value) -> Result<Vec<Value>, SearchStoreError> {
        let mut body = body.clone();
        self.default_size(&mut body);
        let mut scroll_ids: Vec<String> = Vec::new();
        let result = self.scroll_pages(index, body, &mut scroll_ids);
        self.clear_scrolls(&scroll_ids);
        result
    }

    /// Follows scroll ids, recording each context opened.
    fn scroll_pages(&self, index: &str, body: Value, scroll_ids: &mut Vec<String>) -> Result<Vec<Value>, SearchStoreError> {
        let keep_alive = self.config.scroll_keep_alive.as_str();
        let first = SearchRequest::json(Method::Post, format!("{index}/_search?scroll={keep_alive}"), body);
        let mut page = self.call(&first)?;
        let mut hits = Vec::new();
        loop {
            let scroll_id = page.get("_scroll_id").and_then(Value::as_str).map(str::to_string);
            if let Some(id) = &scroll_id
                && !scroll_ids.contains(id)
            {
                scroll_ids.push(id.clone());
            }
            let page_hits = page_hits(&page);
            if page_hits.is_empty() {
                break;
            }
            hits.extend(page_hits);
            let Some(scroll_id) = scroll_id else {
                break;
            };
            let next =
                SearchRequest::json(Method::Post, "_search/scroll", json!({"scroll": keep_alive, "scroll_id": scroll_id}));
            page = self.call(&next)?;
        }
        Ok(hits)
    }

    /// Drains every hit of a sorted search through `search_after` cursors.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError::Invalid`] when the body has no sort, or
    /// the first failing page request.
    pub fn paginate(&self, index: &str, body: &Value) -> Result<Vec<Value>, SearchStoreError> {
        let has_sort = body.get("sort").is_some_and(|sort| sort.as_array().is_none_or(|keys| !keys.is_empty()));
        if !has_sort {
            return Err(SearchStoreError::Invalid("cursor pagination requires a sort".to_string()));
        }
        let mut body = body.clone();
        self.default_size(&mut body);
        let mut cursor: Option<Value> = None;
        let mut hits = Vec::new();
        loop {
            if let Some(after) = &cursor {
                body["search_after"] = after.clone();
            }
            let page = self.query(index, &body)?;
            let page_hits = page_hits(&page);
            let next = page_hits.last().and_then(|hit| hit.get("sort")).cloned();
            if page_hits.is_empty() {
                break;
            }
            hits.extend(page_hits);
            match next {
                Some(next) if cursor.as_ref() != Some(&next) => cursor = Some(next),
                _ => break,
            }
        }
        Ok(hits)
    }

    /// Applies the configured page size when the body has none.
    fn default_size(&self, body: &mut Value) {
        if let Some(object) = body.as_object_mut() {
            object.entry("size").or_insert_with(|| json!(self.config.page_size));
        }
    }

    /// Clears scroll contexts, logging rather than failing on errors.
    fn clear_scrolls(&self, scroll_ids: &[String]) {
        if scroll_ids.is_empty() {
            return;
        }
        let request = SearchRequest::json(Method::Delete, "_search/scroll", json!({"scroll_id": scroll_ids}));
        if let Err(err) = self.call(&request) {
            self.log.record(&LogEvent::warn(COMPONENT, "scroll_clear_failed", err.to_string()).field("contexts", scroll_ids.len()));
        }
    }
}

impl QueryRunner for SearchStoreReader {
    fn backend(&self) -> Backend {
        Backend::SearchStore
    }

    fn run(&self, payload: &QueryPayload) -> Result<u64, BackendError> {
        let body = payload
            .as_json()
            .ok_or_else(|| BackendError::query(Backend::SearchStore, "search payloads must be JSON request bodies"))?;
        let response =
            self.query(&self.config.index, body).map_err(|err| BackendError::query(Backend::SearchStore, err.to_string()))?;
        Ok(result_rows(&response))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the hits of a search page.
fn page_hits(page: &Value) -> Vec<Value> {
    page.pointer("/hits/hits").and_then(Value::as_array).cloned().unwrap_or_default()
}

/// Counts returned hits plus top-level aggregation buckets.
#[must_use]
pub fn result_rows(response: &Value) -> u64 {
    let hits = response.pointer("/hits/hits").and_then(Value::as_array).map_or(0, Vec::len);
    let buckets: usize = response
        .get("aggregations")
        .and_then(Value::as_object)
        .map_or(0, |aggs| aggs.values().filter_map(|agg| agg.get("buckets").and_then(Value::as_array)).map(Vec::len).sum());
    u64::try_from(hits + buckets).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::result_rows;

    #[test]
    fn rows_count_hits_and_buckets() {
        let response = json!({
            "hits": {"hits": [{"_id": "a"}]},
            "aggregations": {"by_stage": {"buckets": [{"key": "Staged"}, {"key": "Finished"}]}}
        });
        assert_eq!(result_rows(&response), 3);
        assert_eq!(result_rows(&json!({})), 0);
    }
}
