// crates/ingest-bench-metrics/src/dynamodb.rs
// ============================================================================
// Module: DynamoDB Metrics Sink
// Description: Duration samples written as items to a DynamoDB table.
// Purpose: Collect timings from many hosts into one shared table.
// Dependencies: aws-config, aws-sdk-dynamodb, ingest-bench-core, serde, tokio
// ============================================================================

//! ## Overview
//! Each sample becomes one item keyed by `record_id`. Optional fields are
//! omitted rather than written as nulls. The SDK call sits behind
//! [`ItemStore`] so the item layout can be checked without a table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_dynamodb::types::AttributeValue;
use ingest_bench_core::DurationSample;
use ingest_bench_core::MetricsError;
use ingest_bench_core::MetricsSink;
use serde::Deserialize;
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::error::MetricsStoreError;

// ============================================================================
// SECTION: Config
// ============================================================================

/// DynamoDB metrics sink settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamoDbMetricsConfig {
    /// Table receiving samples.
    pub table: String,
    /// AWS region (optional; falls back to environment configuration).
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint URL (for local emulators).
    #[serde(default)]
    pub endpoint: Option<String>,
}

// ============================================================================
// SECTION: Items
// ============================================================================

/// Attribute value of a stored item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValue {
    /// String attribute.
    S(String),
    /// Number attribute in decimal text.
    N(String),
    /// Boolean attribute.
    Bool(bool),
}

/// Stored item keyed by attribute name.
pub type Item = BTreeMap<String, ItemValue>;

/// Converts a sample into its item layout.
#[must_use]
pub fn sample_item(sample: &DurationSample) -> Item {
    let mut item = Item::new();
    item.insert("record_id".to_string(), ItemValue::S(sample.record_id.clone()));
    item.insert("data_store".to_string(), ItemValue::S(sample.backend.as_str().to_string()));
    item.insert("operation".to_string(), ItemValue::S(sample.operation.clone()));
    item.insert("start_ms".to_string(), ItemValue::N(sample.start_ms.to_string()));
    item.insert("end_ms".to_string(), ItemValue::N(sample.end_ms.to_string()));
    item.insert("exec_time".to_string(), ItemValue::N(sample.elapsed_ms.to_string()));
    if let Some(count) = sample.num_records {
        item.insert("num_records".to_string(), ItemValue::N(count.to_string()));
    }
    if let Some(first) = sample.is_first_call {
        item.insert("is_first_query".to_string(), ItemValue::Bool(first));
    }
    item
}

/// Put-only access to a key-value table.
pub trait ItemStore: Send + Sync {
    /// Writes one item.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Backend`] when the service refuses the item.
    fn put_item(&self, table: &str, item: Item) -> Result<(), MetricsError>;
}

// ============================================================================
// SECTION: Sink
// ============================================================================

/// Sink writing one item per sample.
pub struct DynamoDbMetricsSink {
    /// Item store client.
    store: Arc<dyn ItemStore>,
    /// Target table.
    table: String,
}

impl DynamoDbMetricsSink {
    /// Creates a sink over an injected item store.
    #[must_use]
    pub fn new(store: Arc<dyn ItemStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Creates a sink over the AWS SDK client.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsStoreError`] when the table is unset or the runtime
    /// cannot be created.
    pub fn connect(config: &DynamoDbMetricsConfig) -> Result<Self, MetricsStoreError> {
        if config.table.trim().is_empty() {
            return Err(MetricsStoreError::Invalid("dynamodb table must be set".to_string()));
        }
        let store = DynamoDbItemStore::new(config)?;
        Ok(Self::new(Arc::new(store), config.table.clone()))
    }
}

impl MetricsSink for DynamoDbMetricsSink {
    fn append(&self, sample: &DurationSample) -> Result<(), MetricsError> {
        self.store.put_item(&self.table, sample_item(sample))
    }
}

// ============================================================================
// SECTION: SDK Client
// ============================================================================

/// DynamoDB item store with an owned runtime.
pub struct DynamoDbItemStore {
    /// SDK client handle.
    client: aws_sdk_dynamodb::Client,
    /// Tokio runtime for blocking SDK calls.
    runtime: Option<Arc<Runtime>>,
}

impl Drop for DynamoDbItemStore {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl DynamoDbItemStore {
    /// Builds a client from settings and the ambient AWS environment.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsStoreError::Db`] when the runtime cannot be created.
    pub fn new(config: &DynamoDbMetricsConfig) -> Result<Self, MetricsStoreError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| MetricsStoreError::Db(err.to_string()))?;
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
            client: aws_sdk_dynamodb::Client::new(&shared_config),
            runtime: Some(Arc::new(runtime)),
        })
    }
}

impl ItemStore for DynamoDbItemStore {
    fn put_item(&self, table: &str, item: Item) -> Result<(), MetricsError> {
        let runtime = self.runtime.as_deref().ok_or_else(|| MetricsError::Backend("runtime unavailable".to_string()))?;
        let attributes: HashMap<String, AttributeValue> = item
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    ItemValue::S(text) => AttributeValue::S(text),
                    ItemValue::N(number) => AttributeValue::N(number),
                    ItemValue::Bool(flag) => AttributeValue::Bool(flag),
                };
                (name, value)
            })
            .collect();
        let request = self.client.put_item().table_name(table).set_item(Some(attributes));
        runtime
            .block_on(request.send())
            .map_err(|err| MetricsError::Backend(err.into_service_error().to_string()))?;
        Ok(())
    }
}
