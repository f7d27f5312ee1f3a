// crates/ingest-bench-timeseries-store/src/aws.rs
// ============================================================================
// Module: Timestream Clients
// Description: AWS SDK implementations of the write and query seams.
// Purpose: Drive Timestream from blocking adapter code.
// Dependencies: aws-config, aws-sdk-timestreamwrite, aws-sdk-timestreamquery, tokio
// ============================================================================

//! ## Overview
//! Each client owns a Tokio runtime and blocks on SDK calls. Timestream
//! requires endpoint discovery unless a custom endpoint is configured; the
//! discovery refresh task runs on the owned runtime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::SdkConfig;
use aws_sdk_timestreamquery::types::Datum;
use aws_sdk_timestreamquery::types::ScalarType;
use aws_sdk_timestreamwrite::operation::write_records::WriteRecordsError;
use aws_sdk_timestreamwrite::types::DimensionValueType;
use aws_sdk_timestreamwrite::types::MeasureValueType;
use aws_sdk_timestreamwrite::types::TimeUnit;
use tokio::runtime::Runtime;

use crate::client::Cell;
use crate::client::ColumnInfo;
use crate::client::ColumnType;
use crate::client::MeasureType;
use crate::client::QueryPage;
use crate::client::TimeSeriesQueryClient;
use crate::client::TimeSeriesWriteClient;
use crate::client::WriteRecord;
use crate::config::TimeSeriesStoreConfig;
use crate::error::RejectedRecord;
use crate::error::TimeSeriesError;

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// Owned runtime shared by a client; dropped off-thread.
struct OwnedRuntime(Option<Arc<Runtime>>);

impl OwnedRuntime {
    /// Builds a multi-threaded runtime.
    fn new() -> Result<Self, TimeSeriesError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| TimeSeriesError::Service(err.to_string()))?;
        Ok(Self(Some(Arc::new(runtime))))
    }

    /// Returns the runtime, failing if it is being dropped.
    fn get(&self) -> Result<&Runtime, TimeSeriesError> {
        self.0.as_deref().ok_or_else(|| TimeSeriesError::Service("runtime unavailable".to_string()))
    }
}

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

/// Loads shared AWS configuration from settings and the environment.
fn load_config(runtime: &Runtime, config: &TimeSeriesStoreConfig) -> SdkConfig {
    runtime.block_on(async {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        loader.load().await
    })
}

// ============================================================================
// SECTION: Write Client
// ============================================================================

/// Timestream write client with an owned runtime.
pub struct TimestreamWriteClient {
    /// SDK client handle.
    client: aws_sdk_timestreamwrite::Client,
    /// Tokio runtime for blocking SDK calls.
    runtime: OwnedRuntime,
}

impl TimestreamWriteClient {
    /// Builds a client, enabling endpoint discovery unless an endpoint is set.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::Service`] when the runtime cannot be created
    /// or endpoint discovery fails.
    pub fn new(config: &TimeSeriesStoreConfig) -> Result<Self, TimeSeriesError> {
        let runtime = OwnedRuntime::new()?;
        let shared = load_config(runtime.get()?, config);
        let mut client = aws_sdk_timestreamwrite::Client::new(&shared);
        if config.endpoint.is_none() {
            let (discovered, reload) = runtime
                .get()?
                .block_on(client.with_endpoint_discovery_enabled())
                .map_err(|err| TimeSeriesError::Service(err.to_string()))?;
            runtime.get()?.spawn(reload.reload_task());
            client = discovered;
        }
        Ok(Self {
            client,
            runtime,
        })
    }
}

impl TimeSeriesWriteClient for TimestreamWriteClient {
    fn write_records(&self, database: &str, table: &str, records: &[WriteRecord]) -> Result<(), TimeSeriesError> {
        let records = records.iter().map(to_sdk_record).collect::<Result<Vec<_>, _>>()?;
        let request = self.client.write_records().database_name(database).table_name(table).set_records(Some(records));
        self.runtime.get()?.block_on(request.send()).map_err(|err| match err.into_service_error() {
            WriteRecordsError::RejectedRecordsException(inner) => TimeSeriesError::Rejected(
                inner
                    .rejected_records()
                    .iter()
                    .map(|rejected| RejectedRecord {
                        index: usize::try_from(rejected.record_index()).unwrap_or_default(),
                        reason: rejected.reason().unwrap_or_default().to_string(),
                    })
                    .collect(),
            ),
            other => TimeSeriesError::Service(other.to_string()),
        })?;
        Ok(())
    }
}

/// Builds the SDK form of one multi-measure record.
fn to_sdk_record(record: &WriteRecord) -> Result<aws_sdk_timestreamwrite::types::Record, TimeSeriesError> {
    let invalid = |err: aws_sdk_timestreamwrite::error::BuildError| TimeSeriesError::Invalid(err.to_string());
    let mut dimensions = Vec::with_capacity(record.dimensions.len());
    for dimension in &record.dimensions {
        dimensions.push(
            aws_sdk_timestreamwrite::types::Dimension::builder()
                .name(dimension.name.as_str())
                .value(dimension.value.as_str())
                .dimension_value_type(DimensionValueType::Varchar)
                .build()
                .map_err(invalid)?,
        );
    }
    let mut measures = Vec::with_capacity(record.measures.len());
    for measure in &record.measures {
        measures.push(
            aws_sdk_timestreamwrite::types::MeasureValue::builder()
                .name(measure.name.as_str())
                .value(measure.value.as_str())
                .r#type(measure_value_type(measure.value_type))
                .build()
                .map_err(invalid)?,
        );
    }
    Ok(aws_sdk_timestreamwrite::types::Record::builder()
        .set_dimensions(Some(dimensions))
        .time(record.time_ms.as_str())
        .time_unit(TimeUnit::Milliseconds)
        .measure_name(record.measure_name.as_str())
        .measure_value_type(MeasureValueType::Multi)
        .set_measure_values(Some(measures))
        .build())
}

/// Maps a measure tag to the SDK type.
const fn measure_value_type(value_type: MeasureType) -> MeasureValueType {
    match value_type {
        MeasureType::Varchar => MeasureValueType::Varchar,
        MeasureType::Bigint => MeasureValueType::Bigint,
        MeasureType::Double => MeasureValueType::Double,
        MeasureType::Boolean => MeasureValueType::Boolean,
        MeasureType::Timestamp => MeasureValueType::Timestamp,
    }
}

// ============================================================================
// SECTION: Query Client
// ============================================================================

/// Timestream query client with an owned runtime.
pub struct TimestreamQueryClient {
    /// SDK client handle.
    client: aws_sdk_timestreamquery::Client,
    /// Tokio runtime for blocking SDK calls.
    runtime: OwnedRuntime,
}

impl TimestreamQueryClient {
    /// Builds a client, enabling endpoint discovery unless an endpoint is set.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::Service`] when the runtime cannot be created
    /// or endpoint discovery fails.
    pub fn new(config: &TimeSeriesStoreConfig) -> Result<Self, TimeSeriesError> {
        let runtime = OwnedRuntime::new()?;
        let shared = load_config(runtime.get()?, config);
        let mut client = aws_sdk_timestreamquery::Client::new(&shared);
        if config.endpoint.is_none() {
            let (discovered, reload) = runtime
                .get()?
                .block_on(client.with_endpoint_discovery_enabled())
                .map_err(|err| TimeSeriesError::Service(err.to_string()))?;
            runtime.get()?.spawn(reload.reload_task());
            client = discovered;
        }
        Ok(Self {
            client,
            runtime,
        })
    }
}

impl TimeSeriesQueryClient for TimestreamQueryClient {
    fn query(&self, sql: &str, page_size: i32, next_token: Option<&str>) -> Result<QueryPage, TimeSeriesError> {
        let request = self
            .client
            .query()
            .query_string(sql)
            .max_rows(page_size)
            .set_next_token(next_token.map(str::to_string));
        let output = self
            .runtime
            .get()?
            .block_on(request.send())
            .map_err(|err| TimeSeriesError::Service(err.into_service_error().to_string()))?;
        let columns = output
            .column_info()
            .iter()
            .map(|column| {
                let kind = column.r#type();
                ColumnInfo {
                    name: column.name().unwrap_or_default().to_string(),
                    column_type: column_type(
                        kind.and_then(|kind| kind.scalar_type()),
                        kind.is_some_and(|kind| kind.array_column_info().is_some()),
                    ),
                }
            })
            .collect();
        let rows = output.rows().iter().map(|row| row.data().iter().map(to_cell).collect()).collect();
        Ok(QueryPage {
            columns,
            rows,
            next_token: output.next_token().map(str::to_string),
        })
    }
}

/// Maps SDK column metadata to a column type.
fn column_type(scalar: Option<&ScalarType>, is_array: bool) -> ColumnType {
    if is_array {
        return ColumnType::Array;
    }
    match scalar {
        Some(ScalarType::Varchar) => ColumnType::Varchar,
        Some(ScalarType::Integer) => ColumnType::Integer,
        Some(ScalarType::Bigint) => ColumnType::Bigint,
        Some(ScalarType::Double) => ColumnType::Double,
        Some(ScalarType::Boolean) => ColumnType::Boolean,
        Some(ScalarType::Timestamp) => ColumnType::Timestamp,
        Some(ScalarType::Date) => ColumnType::Date,
        Some(ScalarType::Time) => ColumnType::Time,
        Some(other) => ColumnType::Other(other.as_str().to_string()),
        None => ColumnType::Other("UNKNOWN".to_string()),
    }
}

/// Maps one SDK datum to a raw cell.
fn to_cell(datum: &Datum) -> Cell {
    if datum.null_value() == Some(true) {
        return Cell::Null;
    }
    if let Some(value) = datum.scalar_value() {
        return Cell::Scalar(value.to_string());
    }
    if !datum.array_value().is_empty() {
        return Cell::Array(datum.array_value().iter().map(to_cell).collect());
    }
    Cell::Null
}
