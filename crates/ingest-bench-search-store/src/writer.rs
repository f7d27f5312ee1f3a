// crates/ingest-bench-search-store/src/writer.rs
// ============================================================================
// Module: Search Store Writer
// Description: Concurrent bulk indexing with bisection, backoff, and cooldown.
// Purpose: Index record batches without losing or duplicating documents.
// Dependencies: ingest-bench-core, serde_json
// ============================================================================

//! ## Overview
//! Records become NDJSON action/document line pairs, cut into sub-batches of
//! `batch_size` records, and submitted by a bounded worker pool. Per request:
//! - 413 splits the request into two halves at a pair boundary and submits
//!   each half; a single oversize record is an error.
//! - 429 and 504 are retried on a doubling backoff. A 504 also arms an
//!   adapter-wide cooldown that new requests sleep out before starting.
//! - Per-item errors on the ignore list are dropped; any other fails.
//!
//! The whole bulk write is one timed `basic_write` scope.
//!
//! Security posture: document bodies are benchmark data; ids are passed
//! through to the action line without interpretation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;

use ingest_bench_core::Backend;
use ingest_bench_core::BackendError;
use ingest_bench_core::Cooldown;
use ingest_bench_core::EventLog;
use ingest_bench_core::LogEvent;
use ingest_bench_core::Record;
use ingest_bench_core::RecordSchema;
use ingest_bench_core::RecordWriter;
use ingest_bench_core::TimingInstrument;
use ingest_bench_core::TimingScope;
use ingest_bench_core::ingestion_event_schema;
use ingest_bench_core::run_bounded;
use ingest_bench_core::split_into_batches;
use serde_json::Value;
use serde_json::json;

use crate::admin::CollectionAdmin;
use crate::config::SearchStoreConfig;
use crate::error::SearchStoreError;
use crate::response::check_response;
use crate::transport::Method;
use crate::transport::RequestBody;
use crate::transport::SearchRequest;
use crate::transport::SearchResponse;
use crate::transport::SearchTransport;

/// Component label for log events.
const COMPONENT: &str = "search_store";
/// Operation label for timed bulk writes.
const WRITE_OPERATION: &str = "basic_write";
/// Status returned for oversize payloads.
const PAYLOAD_TOO_LARGE: u16 = 413;
/// Status returned when the cluster is throttling.
const TOO_MANY_REQUESTS: u16 = 429;
/// Status returned when a proxy gave up waiting for the cluster.
const GATEWAY_TIMEOUT: u16 = 504;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One NDJSON action/document pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkPair {
    /// Action line.
    pub action: String,
    /// Document line.
    pub document: String,
}

/// Outcome of a bulk write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkReport {
    /// Records indexed.
    pub records: usize,
    /// Bulk requests accepted, including bisected halves.
    pub requests: usize,
    /// Smallest record count among accepted requests.
    pub effective_batch_size: usize,
}

/// Accepted-request tally for one sub-batch.
#[derive(Debug, Clone, Copy)]
struct SubmitOutcome {
    /// Accepted requests.
    requests: usize,
    /// Smallest accepted request.
    smallest: usize,
}

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Search-store write adapter.
///
/// # Invariants
/// - Request boundaries never split an action/document pair.
/// - Every record is sent in exactly one accepted request or the write fails.
pub struct SearchStoreWriter {
    /// Cluster transport.
    transport: Arc<dyn SearchTransport>,
    /// Adapter settings.
    config: SearchStoreConfig,
    /// Timing instrument for bulk writes.
    timer: TimingInstrument,
    /// Structured event log.
    log: Arc<dyn EventLog>,
    /// Gateway-timeout pause shared by all workers.
    cooldown: Cooldown,
    /// Collection administration.
    admin: CollectionAdmin,
    /// Set once the target collection is known to exist.
    collection_ready: AtomicBool,
}

impl SearchStoreWriter {
    /// Creates a writer over an injected transport.
    #[must_use]
    pub fn new(
        transport: Arc<dyn SearchTransport>,
        config: SearchStoreConfig,
        timer: TimingInstrument,
        log: Arc<dyn EventLog>,
    ) -> Self {
        let admin = CollectionAdmin::new(Arc::clone(&transport), Arc::clone(&log));
        Self {
            transport,
            config,
            timer,
            log,
            cooldown: Cooldown::new(),
            admin,
            collection_ready: AtomicBool::new(false),
        }
    }

    /// Returns the collection administration handle.
    #[must_use]
    pub const fn admin(&self) -> &CollectionAdmin {
        &self.admin
    }

    /// Creates the configured collection once per writer.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] when the collection cannot be created.
    pub fn ensure_collection(&self, schema: &RecordSchema) -> Result<(), SearchStoreError> {
        if self.collection_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        self.admin.ensure_collection(&self.config.index, schema)?;
        self.collection_ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Indexes one document.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] when the request fails.
    pub fn index_document(&self, index: &str, record: &Record, id: Option<&str>) -> Result<Value, SearchStoreError> {
        let request = match id {
            Some(id) => SearchRequest::json(Method::Put, format!("{index}/_doc/{id}"), record.to_json()),
            None => SearchRequest::json(Method::Post, format!("{index}/_doc"), record.to_json()),
        };
        self.cooldown.wait();
        check_response(self.transport.send(&request)?, &self.config.ignored_item_errors)
    }

    /// Indexes records concurrently in sub-batches.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError::Invalid`] when `ids` does not match the
    /// record count, or the first failure raised by any worker.
    pub fn index_documents_in_bulk(
        &self,
        index: &str,
        records: Vec<Record>,
        ids: Option<Vec<String>>,
    ) -> Result<BulkReport, SearchStoreError> {
        let total = records.len();
        let pairs = bulk_pairs(index, records, ids)?;
        if pairs.is_empty() {
            return Ok(BulkReport {
                records: 0,
                requests: 0,
                effective_batch_size: 0,
            });
        }
        let batches = split_into_batches(pairs, self.config.batch_size);
        let scope = TimingScope::new(Backend::SearchStore, WRITE_OPERATION).with_records(total);
        let outcomes = self.timer.time(scope, || {
            run_bounded(batches, self.config.workers, |batch| self.submit(&batch)).map_err(|failure| {
                for extra in &failure.additional {
                    self.log.record(&LogEvent::error(COMPONENT, "bulk_worker_failed", extra.to_string()));
                }
                failure.first
            })
        })?;
        let report = BulkReport {
            records: total,
            requests: outcomes.iter().map(|outcome| outcome.requests).sum(),
            effective_batch_size: outcomes.iter().map(|outcome| outcome.smallest).min().unwrap_or(0),
        };
        self.log.record(
            &LogEvent::info(COMPONENT, "bulk_indexed", "bulk write complete")
                .field("index", index)
                .field("records", report.records)
                .field("requests", report.requests)
                .field("effective_batch_size", report.effective_batch_size),
        );
        Ok(report)
    }

    /// Submits a sub-batch, bisecting on oversize responses.
    fn submit(&self, pairs: &[BulkPair]) -> Result<SubmitOutcome, SearchStoreError> {
        let response = self.send_with_backoff(pairs)?;
        if response.status == PAYLOAD_TOO_LARGE {
            if pairs.len() <= 1 {
                return Err(SearchStoreError::PayloadTooLarge {
                    records: pairs.len(),
                });
            }
            let (left, right) = pairs.split_at(pairs.len().div_ceil(2));
            self.log.record(
                &LogEvent::warn(COMPONENT, "bulk_split", "payload too large; splitting request")
                    .field("records", pairs.len())
                    .field("left", left.len())
                    .field("right", right.len()),
            );
            let left = self.submit(left)?;
            let right = self.submit(right)?;
            return Ok(SubmitOutcome {
                requests: left.requests + right.requests,
                smallest: left.smallest.min(right.smallest),
            });
        }
        check_response(response, &self.config.ignored_item_errors)?;
        Ok(SubmitOutcome {
            requests: 1,
            smallest: pairs.len(),
        })
    }

    /// Sends one bulk request, retrying throttled and timed-out attempts.
    fn send_with_backoff(&self, pairs: &[BulkPair]) -> Result<SearchResponse, SearchStoreError> {
        let request = SearchRequest {
            method: Method::Post,
            path: "_bulk".to_string(),
            body: RequestBody::NdJson(ndjson_body(pairs)),
        };
        let mut backoff = self.config.retry.policy().start();
        let mut attempts = 0;
        self.cooldown.wait();
        loop {
            attempts += 1;
            let response = self.transport.send(&request)?;
            if response.status != TOO_MANY_REQUESTS && response.status != GATEWAY_TIMEOUT {
                return Ok(response);
            }
            if response.status == GATEWAY_TIMEOUT {
                self.cooldown.arm(self.config.gateway_timeout_cooldown());
            }
            let Some(delay) = backoff.next_delay() else {
                return Err(SearchStoreError::Throttled {
                    status: response.status,
                    attempts,
                });
            };
            self.log.record(
                &LogEvent::warn(COMPONENT, "bulk_retry", "bulk request throttled; backing off")
                    .field("status", response.status)
                    .field("attempt", attempts)
                    .field("delay_ms", u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)),
            );
            thread::sleep(delay);
        }
    }
}

impl RecordWriter for SearchStoreWriter {
    fn backend(&self) -> Backend {
        Backend::SearchStore
    }

    fn write(&self, records: Vec<Record>) -> Result<usize, BackendError> {
        let to_backend = |err: SearchStoreError| BackendError::write(Backend::SearchStore, err.to_string());
        self.ensure_collection(&ingestion_event_schema()).map_err(to_backend)?;
        let report = self.index_documents_in_bulk(&self.config.index, records, None).map_err(to_backend)?;
        Ok(report.records)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds action/document pairs, attaching ids when supplied.
///
/// # Errors
///
/// Returns [`SearchStoreError::Invalid`] when `ids` does not match the record
/// count or a line cannot be encoded.
pub fn bulk_pairs(index: &str, records: Vec<Record>, ids: Option<Vec<String>>) -> Result<Vec<BulkPair>, SearchStoreError> {
    if let Some(ids) = &ids
        && ids.len() != records.len()
    {
        return Err(SearchStoreError::Invalid(format!("{} ids supplied for {} records", ids.len(), records.len())));
    }
    let mut ids = ids.map(Vec::into_iter);
    let mut pairs = Vec::with_capacity(records.len());
    for record in records {
        let action = match ids.as_mut().and_then(Iterator::next) {
            Some(id) => json!({"index": {"_index": index, "_id": id}}),
            None => json!({"index": {"_index": index}}),
        };
        pairs.push(BulkPair {
            action: encode_line(&action)?,
            document: encode_line(&record.to_json())?,
        });
    }
    Ok(pairs)
}

/// Joins pairs into a newline-terminated NDJSON body.
#[must_use]
pub fn ndjson_body(pairs: &[BulkPair]) -> String {
    let mut body = String::new();
    for pair in pairs {
        body.push_str(&pair.action);
        body.push('\n');
        body.push_str(&pair.document);
        body.push('\n');
    }
    body
}

/// Encodes one JSON value as a single line.
fn encode_line(value: &Value) -> Result<String, SearchStoreError> {
    serde_json::to_string(value).map_err(|err| SearchStoreError::Invalid(err.to_string()))
}
