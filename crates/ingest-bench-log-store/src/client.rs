// crates/ingest-bench-log-store/src/client.rs
// ============================================================================
// Module: Log Store Client
// Description: Narrow client seam over the log service API.
// Purpose: Let the writer and reader run against the SDK or a fake.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`LogStoreClient`] exposes exactly the calls the adapter needs. Each
//! failure is returned already classified as a [`LogStoreError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::error::LogStoreError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One event submitted to a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    /// Event time in epoch milliseconds.
    pub timestamp_ms: i64,
    /// Serialized event body.
    pub message: String,
}

/// One event returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    /// Event time in epoch milliseconds, when reported.
    pub timestamp_ms: Option<i64>,
    /// Event body.
    pub message: String,
}

/// Stream description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Stream name.
    pub name: String,
    /// Next upload token, when the stream has one.
    pub upload_sequence_token: Option<String>,
}

/// Read direction for stream paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageDirection {
    /// Oldest to newest.
    #[default]
    Forward,
    /// Newest to oldest.
    Backward,
}

/// Raw page from a stream read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventsPage {
    /// Events on the page.
    pub events: Vec<OutputEvent>,
    /// Cursor for the next forward page.
    pub next_forward_token: Option<String>,
    /// Cursor for the next backward page.
    pub next_backward_token: Option<String>,
}

/// Raw page from a filter search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterPage {
    /// Matching events.
    pub events: Vec<OutputEvent>,
    /// Cursor for the next page.
    pub next_token: Option<String>,
}

/// Insights query lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    /// Accepted but not started.
    Scheduled,
    /// Executing.
    Running,
    /// Finished successfully.
    Complete,
    /// Any terminal non-success state.
    Other(String),
}

impl QueryState {
    /// Returns true while the query may still produce results.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Scheduled | Self::Running)
    }
}

/// One Insights result row as ordered (field, value) pairs.
pub type QueryRow = Vec<(String, String)>;

/// Insights poll response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResults {
    /// Current state.
    pub state: QueryState,
    /// Rows available so far.
    pub rows: Vec<QueryRow>,
}

/// Insights query request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// Log group to query.
    pub log_group: String,
    /// Window start in epoch seconds.
    pub start_time_s: i64,
    /// Window end in epoch seconds.
    pub end_time_s: i64,
    /// Query text.
    pub query: String,
}

// ============================================================================
// SECTION: Client Trait
// ============================================================================

/// Log service operations used by the adapter.
pub trait LogStoreClient: Send + Sync {
    /// Appends events to a stream and returns the next continuation token.
    ///
    /// # Errors
    ///
    /// Returns a classified [`LogStoreError`].
    fn put_log_events(
        &self,
        log_group: &str,
        stream: &str,
        events: &[InputEvent],
        sequence_token: Option<&str>,
    ) -> Result<Option<String>, LogStoreError>;

    /// Creates a stream.
    ///
    /// # Errors
    ///
    /// Returns [`LogStoreError::ResourceAlreadyExists`] when the stream exists.
    fn create_log_stream(&self, log_group: &str, stream: &str) -> Result<(), LogStoreError>;

    /// Lists streams whose names start with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns a classified [`LogStoreError`].
    fn describe_log_streams(&self, log_group: &str, prefix: &str) -> Result<Vec<StreamInfo>, LogStoreError>;

    /// Reads one page of a stream.
    ///
    /// # Errors
    ///
    /// Returns [`LogStoreError::ResourceNotFound`] when the stream is absent.
    fn get_log_events(
        &self,
        log_group: &str,
        stream: &str,
        limit: i32,
        direction: PageDirection,
        cursor: Option<&str>,
    ) -> Result<EventsPage, LogStoreError>;

    /// Searches a stream with a filter pattern.
    ///
    /// # Errors
    ///
    /// Returns [`LogStoreError::ResourceNotFound`] when the stream is absent.
    fn filter_log_events(
        &self,
        log_group: &str,
        stream: &str,
        pattern: &str,
        limit: i32,
        cursor: Option<&str>,
    ) -> Result<FilterPage, LogStoreError>;

    /// Starts an Insights query and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns a classified [`LogStoreError`].
    fn start_query(&self, request: &QueryRequest) -> Result<String, LogStoreError>;

    /// Polls an Insights query.
    ///
    /// # Errors
    ///
    /// Returns a classified [`LogStoreError`].
    fn get_query_results(&self, query_id: &str) -> Result<QueryResults, LogStoreError>;
}
