// crates/ingest-bench-log-store/src/aws.rs
// ============================================================================
// Module: CloudWatch Logs Client
// Description: AWS SDK implementation of the log-store client seam.
// Purpose: Drive CloudWatch Logs from blocking adapter code.
// Dependencies: aws-config, aws-sdk-cloudwatchlogs, tokio
// ============================================================================

//! ## Overview
//! [`CloudWatchLogsClient`] owns a Tokio runtime and blocks on each SDK call.
//! Service errors are classified into [`LogStoreError`] variants so the
//! writer can recover from missing streams and stale tokens.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_cloudwatchlogs::Client;
use aws_sdk_cloudwatchlogs::operation::create_log_stream::CreateLogStreamError;
use aws_sdk_cloudwatchlogs::operation::filter_log_events::FilterLogEventsError;
use aws_sdk_cloudwatchlogs::operation::get_log_events::GetLogEventsError;
use aws_sdk_cloudwatchlogs::operation::put_log_events::PutLogEventsError;
use aws_sdk_cloudwatchlogs::types::InputLogEvent;
use aws_sdk_cloudwatchlogs::types::QueryStatus;
use tokio::runtime::Runtime;

use crate::client::EventsPage;
use crate::client::FilterPage;
use crate::client::InputEvent;
use crate::client::LogStoreClient;
use crate::client::OutputEvent;
use crate::client::PageDirection;
use crate::client::QueryRequest;
use crate::client::QueryResults;
use crate::client::QueryState;
use crate::client::StreamInfo;
use crate::config::LogStoreConfig;
use crate::error::LogStoreError;

// ============================================================================
// SECTION: Client
// ============================================================================

/// CloudWatch Logs client with an owned runtime.
pub struct CloudWatchLogsClient {
    /// SDK client handle.
    client: Client,
    /// Tokio runtime for blocking SDK calls.
    runtime: Option<Arc<Runtime>>,
}

impl Drop for CloudWatchLogsClient {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl CloudWatchLogsClient {
    /// Builds a client from adapter settings and the ambient AWS environment.
    ///
    /// # Errors
    ///
    /// Returns [`LogStoreError`] when the runtime cannot be created.
    pub fn new(config: &LogStoreConfig) -> Result<Self, LogStoreError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| LogStoreError::Service(err.to_string()))?;
        let shared_config = runtime.block_on(async {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = &config.region {
                loader = loader.region(Region::new(region.clone()));
            }
            if let Some(endpoint) = &config.endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            loader.load().await
        });
        Ok(Self {
            client: Client::new(&shared_config),
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// Returns the runtime, failing if the client is being dropped.
    fn runtime(&self) -> Result<&Runtime, LogStoreError> {
        self.runtime.as_deref().ok_or_else(|| LogStoreError::Service("runtime unavailable".to_string()))
    }
}

impl LogStoreClient for CloudWatchLogsClient {
    fn put_log_events(
        &self,
        log_group: &str,
        stream: &str,
        events: &[InputEvent],
        sequence_token: Option<&str>,
    ) -> Result<Option<String>, LogStoreError> {
        let mut log_events = Vec::with_capacity(events.len());
        for event in events {
            let built = InputLogEvent::builder()
                .timestamp(event.timestamp_ms)
                .message(event.message.clone())
                .build()
                .map_err(|err| LogStoreError::Invalid(err.to_string()))?;
            log_events.push(built);
        }
        #[allow(deprecated, reason = "Sequence tokens are still honored by older log groups.")]
        let request = self
            .client
            .put_log_events()
            .log_group_name(log_group)
            .log_stream_name(stream)
            .set_log_events(Some(log_events))
            .set_sequence_token(sequence_token.map(str::to_string));
        let output = self.runtime()?.block_on(request.send()).map_err(|err| match err.into_service_error() {
            PutLogEventsError::ResourceNotFoundException(inner) => LogStoreError::ResourceNotFound(inner.to_string()),
            PutLogEventsError::InvalidSequenceTokenException(inner) => LogStoreError::InvalidSequenceToken {
                expected: inner.expected_sequence_token().map(str::to_string),
            },
            other => LogStoreError::Service(other.to_string()),
        })?;
        #[allow(deprecated, reason = "Sequence tokens are still honored by older log groups.")]
        let next = output.next_sequence_token().map(str::to_string);
        Ok(next)
    }

    fn create_log_stream(&self, log_group: &str, stream: &str) -> Result<(), LogStoreError> {
        let request = self.client.create_log_stream().log_group_name(log_group).log_stream_name(stream);
        self.runtime()?.block_on(request.send()).map_err(|err| match err.into_service_error() {
            CreateLogStreamError::ResourceAlreadyExistsException(inner) => LogStoreError::ResourceAlreadyExists(inner.to_string()),
            CreateLogStreamError::ResourceNotFoundException(inner) => LogStoreError::ResourceNotFound(inner.to_string()),
            other => LogStoreError::Service(other.to_string()),
        })?;
        Ok(())
    }

    fn describe_log_streams(&self, log_group: &str, prefix: &str) -> Result<Vec<StreamInfo>, LogStoreError> {
        let request = self.client.describe_log_streams().log_group_name(log_group).log_stream_name_prefix(prefix);
        let output = self
            .runtime()?
            .block_on(request.send())
            .map_err(|err| LogStoreError::Service(err.into_service_error().to_string()))?;
        #[allow(deprecated, reason = "Upload tokens are still reported for older log groups.")]
        let streams = output
            .log_streams()
            .iter()
            .filter_map(|stream| {
                stream.log_stream_name().map(|name| StreamInfo {
                    name: name.to_string(),
                    upload_sequence_token: stream.upload_sequence_token().map(str::to_string),
                })
            })
            .collect();
        Ok(streams)
    }

    fn get_log_events(
        &self,
        log_group: &str,
        stream: &str,
        limit: i32,
        direction: PageDirection,
        cursor: Option<&str>,
    ) -> Result<EventsPage, LogStoreError> {
        let request = self
            .client
            .get_log_events()
            .log_group_name(log_group)
            .log_stream_name(stream)
            .limit(limit)
            .start_from_head(matches!(direction, PageDirection::Forward))
            .set_next_token(cursor.map(str::to_string));
        let output = self.runtime()?.block_on(request.send()).map_err(|err| match err.into_service_error() {
            GetLogEventsError::ResourceNotFoundException(inner) => LogStoreError::ResourceNotFound(inner.to_string()),
            other => LogStoreError::Service(other.to_string()),
        })?;
        let events = output
            .events()
            .iter()
            .map(|event| OutputEvent {
                timestamp_ms: event.timestamp(),
                message: event.message().unwrap_or_default().to_string(),
            })
            .collect();
        Ok(EventsPage {
            events,
            next_forward_token: output.next_forward_token().map(str::to_string),
            next_backward_token: output.next_backward_token().map(str::to_string),
        })
    }

    fn filter_log_events(
        &self,
        log_group: &str,
        stream: &str,
        pattern: &str,
        limit: i32,
        cursor: Option<&str>,
    ) -> Result<FilterPage, LogStoreError> {
        let request = self
            .client
            .filter_log_events()
            .log_group_name(log_group)
            .log_stream_names(stream)
            .filter_pattern(pattern)
            .limit(limit)
            .set_next_token(cursor.map(str::to_string));
        let output = self.runtime()?.block_on(request.send()).map_err(|err| match err.into_service_error() {
            FilterLogEventsError::ResourceNotFoundException(inner) => LogStoreError::ResourceNotFound(inner.to_string()),
            other => LogStoreError::Service(other.to_string()),
        })?;
        let events = output
            .events()
            .iter()
            .map(|event| OutputEvent {
                timestamp_ms: event.timestamp(),
                message: event.message().unwrap_or_default().to_string(),
            })
            .collect();
        Ok(FilterPage {
            events,
            next_token: output.next_token().map(str::to_string),
        })
    }

    fn start_query(&self, request: &QueryRequest) -> Result<String, LogStoreError> {
        let call = self
            .client
            .start_query()
            .log_group_name(request.log_group.as_str())
            .start_time(request.start_time_s)
            .end_time(request.end_time_s)
            .query_string(request.query.as_str());
        let output = self
            .runtime()?
            .block_on(call.send())
            .map_err(|err| LogStoreError::Service(err.into_service_error().to_string()))?;
        output.query_id().map(str::to_string).ok_or_else(|| LogStoreError::Service("start_query returned no query id".to_string()))
    }

    fn get_query_results(&self, query_id: &str) -> Result<QueryResults, LogStoreError> {
        let call = self.client.get_query_results().query_id(query_id);
        let output = self
            .runtime()?
            .block_on(call.send())
            .map_err(|err| LogStoreError::Service(err.into_service_error().to_string()))?;
        let state = match output.status() {
            Some(QueryStatus::Scheduled) => QueryState::Scheduled,
            Some(QueryStatus::Running) => QueryState::Running,
            Some(QueryStatus::Complete) => QueryState::Complete,
            Some(other) => QueryState::Other(other.as_str().to_string()),
            None => QueryState::Other("unknown".to_string()),
        };
        let rows = output
            .results()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| (cell.field().unwrap_or_default().to_string(), cell.value().unwrap_or_default().to_string()))
                    .collect()
            })
            .collect();
        Ok(QueryResults {
            state,
            rows,
        })
    }
}
