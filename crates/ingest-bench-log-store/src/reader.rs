// crates/ingest-bench-log-store/src/reader.rs
// ============================================================================
// Module: Log Store Reader
// Description: Direct, paged, filtered, and Insights reads of log streams.
// Purpose: Retrieve events with cursor paging that always terminates.
// Dependencies: ingest-bench-core, serde_json
// ============================================================================

//! ## Overview
//! The service echoes the caller's cursor back at the end of a stream, so a
//! page whose cursor did not advance reports no further cursor. Full reads
//! stop on an empty page or a missing cursor. A missing stream reads as
//! empty rather than failing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use ingest_bench_core::Backend;
use ingest_bench_core::BackendError;
use ingest_bench_core::Clock;
use ingest_bench_core::EventLog;
use ingest_bench_core::LogEvent;
use ingest_bench_core::QueryPayload;
use ingest_bench_core::QueryRunner;
use serde_json::Value;

use crate::client::LogStoreClient;
use crate::client::OutputEvent;
use crate::client::PageDirection;
use crate::client::QueryRequest;
use crate::client::QueryRow;
use crate::client::QueryState;
use crate::config::LogStoreConfig;
use crate::error::LogStoreError;

/// Component label for log events.
const COMPONENT: &str = "log_store";

// ============================================================================
// SECTION: Pages
// ============================================================================

/// One page of stream events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogPage {
    /// Decoded event bodies.
    pub items: Vec<Value>,
    /// Cursor toward older events, if any.
    pub prev_cursor: Option<String>,
    /// Cursor toward newer events, if any.
    pub next_cursor: Option<String>,
}

/// One page of filtered events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPage {
    /// Decoded event bodies.
    pub items: Vec<Value>,
    /// Cursor for the next page, if any.
    pub next_cursor: Option<String>,
}

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Log-store read adapter.
pub struct LogStoreReader {
    /// Service client.
    client: Arc<dyn LogStoreClient>,
    /// Adapter settings.
    config: LogStoreConfig,
    /// Time source for query windows.
    clock: Arc<dyn Clock>,
    /// Structured event log.
    log: Arc<dyn EventLog>,
}

impl LogStoreReader {
    /// Creates a reader over an injected client.
    #[must_use]
    pub fn new(client: Arc<dyn LogStoreClient>, config: LogStoreConfig, clock: Arc<dyn Clock>, log: Arc<dyn EventLog>) -> Self {
        Self {
            client,
            config,
            clock,
            log,
        }
    }

    /// Reads one page of a stream.
    ///
    /// # Errors
    ///
    /// Returns [`LogStoreError`] on service failure; a missing stream yields
    /// an empty page.
    pub fn get_page(
        &self,
        stream: &str,
        page_size: i32,
        cursor: Option<&str>,
        direction: PageDirection,
    ) -> Result<LogPage, LogStoreError> {
        let page = match self.client.get_log_events(&self.config.log_group, stream, page_size, direction, cursor) {
            Ok(page) => page,
            Err(LogStoreError::ResourceNotFound(_)) => {
                self.log_missing(stream);
                return Ok(LogPage::default());
            }
            Err(err) => return Err(err),
        };
        let mut next_cursor = page.next_forward_token;
        let mut prev_cursor = page.next_backward_token;
        match direction {
            PageDirection::Forward if cursor.is_some() && next_cursor.as_deref() == cursor => next_cursor = None,
            PageDirection::Backward if cursor.is_some() && prev_cursor.as_deref() == cursor => prev_cursor = None,
            _ => {}
        }
        Ok(LogPage {
            items: decode_events(page.events),
            prev_cursor,
            next_cursor,
        })
    }

    /// Reads an entire stream in the given direction.
    ///
    /// # Errors
    ///
    /// Returns [`LogStoreError`] on service failure.
    pub fn read_all(&self, stream: &str, direction: PageDirection) -> Result<Vec<Value>, LogStoreError> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.get_page(stream, self.config.page_size, cursor.as_deref(), direction)?;
            if page.items.is_empty() {
                break;
            }
            items.extend(page.items);
            let next = match direction {
                PageDirection::Forward => page.next_cursor,
                PageDirection::Backward => page.prev_cursor,
            };
            match next {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                _ => break,
            }
        }
        Ok(items)
    }

    /// Searches a stream with a filter pattern, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns [`LogStoreError`] on service failure; a missing stream yields
    /// an empty page.
    pub fn search(&self, stream: &str, pattern: &str, page_size: i32, cursor: Option<&str>) -> Result<SearchPage, LogStoreError> {
        let page = match self.client.filter_log_events(&self.config.log_group, stream, pattern, page_size, cursor) {
            Ok(page) => page,
            Err(LogStoreError::ResourceNotFound(_)) => {
                self.log_missing(stream);
                return Ok(SearchPage::default());
            }
            Err(err) => return Err(err),
        };
        let next_cursor = page.next_token.filter(|next| Some(next.as_str()) != cursor);
        Ok(SearchPage {
            items: decode_events(page.events),
            next_cursor,
        })
    }

    /// Runs an Insights query and waits for its results.
    ///
    /// Polls while the query is scheduled or running, bounded by the
    /// configured maximum wait.
    ///
    /// # Errors
    ///
    /// Returns [`LogStoreError::QueryTimeout`] when the wait bound elapses and
    /// [`LogStoreError::QueryFailed`] on a non-success terminal state.
    pub fn query(&self, query: &str) -> Result<Vec<QueryRow>, LogStoreError> {
        let end_time_s = self.clock.now_ms() / 1_000;
        let request = QueryRequest {
            log_group: self.config.log_group.clone(),
            start_time_s: end_time_s - self.config.query_lookback_s,
            end_time_s,
            query: query.to_string(),
        };
        let query_id = self.client.start_query(&request)?;
        self.log.record(&LogEvent::info(COMPONENT, "query_started", "insights query started").field("query_id", query_id.as_str()));
        let started = Instant::now();
        let mut results = self.client.get_query_results(&query_id)?;
        while results.state.is_pending() {
            if started.elapsed() >= self.config.max_wait() {
                return Err(LogStoreError::QueryTimeout(started.elapsed().as_millis()));
            }
            thread::sleep(self.config.poll_interval());
            results = self.client.get_query_results(&query_id)?;
        }
        match results.state {
            QueryState::Complete => Ok(results.rows),
            QueryState::Other(status) => Err(LogStoreError::QueryFailed(status)),
            QueryState::Scheduled | QueryState::Running => Err(LogStoreError::QueryFailed("pending".to_string())),
        }
    }

    /// Logs a read against a missing stream.
    fn log_missing(&self, stream: &str) {
        self.log.record(
            &LogEvent::info(COMPONENT, "log_stream_missing", "no logs found")
                .field("log_group", self.config.log_group.as_str())
                .field("log_stream", stream),
        );
    }
}

impl QueryRunner for LogStoreReader {
    fn backend(&self) -> Backend {
        Backend::LogStore
    }

    fn run(&self, payload: &QueryPayload) -> Result<u64, BackendError> {
        let query = payload.as_text().ok_or_else(|| BackendError::query(Backend::LogStore, "expected query text"))?;
        let rows = self.query(query).map_err(|err| BackendError::query(Backend::LogStore, err.to_string()))?;
        Ok(u64::try_from(rows.len()).unwrap_or(u64::MAX))
    }
}

/// Decodes event bodies as JSON, keeping non-JSON bodies as strings.
fn decode_events(events: Vec<OutputEvent>) -> Vec<Value> {
    events
        .into_iter()
        .map(|event| serde_json::from_str(&event.message).unwrap_or_else(|_| Value::String(event.message)))
        .collect()
}
