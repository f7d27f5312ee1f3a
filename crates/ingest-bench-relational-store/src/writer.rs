// crates/ingest-bench-relational-store/src/writer.rs
// ============================================================================
// Module: Relational Store Writer
// Description: Lazy table creation and sequential transactional inserts.
// Purpose: Persist record batches as rows, one committed sub-batch at a time.
// Dependencies: ingest-bench-core
// ============================================================================

//! ## Overview
//! The first write creates the event table with a surrogate key plus one
//! column per schema field, then one `<table>__<column>` index per configured
//! column. Records are inserted in sub-batches of `batch_size`; each
//! sub-batch is its own transaction and its own timed `basic_write` scope.
//! A failure aborts the remaining sub-batches and reports how many records
//! were already committed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use ingest_bench_core::Backend;
use ingest_bench_core::BackendError;
use ingest_bench_core::EventLog;
use ingest_bench_core::LogEvent;
use ingest_bench_core::Record;
use ingest_bench_core::RecordSchema;
use ingest_bench_core::RecordWriter;
use ingest_bench_core::TimingInstrument;
use ingest_bench_core::TimingScope;
use ingest_bench_core::split_into_batches;

use crate::config::RelationalStoreConfig;
use crate::connection::SharedConnection;
use crate::error::RelationalStoreError;
use crate::sql::create_index_sql;
use crate::sql::create_table_sql;
use crate::value::SqlValue;

/// Component label for log events.
const COMPONENT: &str = "relational_store";
/// Operation label for timed inserts.
const WRITE_OPERATION: &str = "basic_write";

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Relational-store write adapter.
///
/// # Invariants
/// - Sub-batches commit strictly in submission order.
/// - A failed sub-batch commits nothing; earlier sub-batches stay committed.
pub struct RelationalStoreWriter {
    /// Shared connection.
    connection: SharedConnection,
    /// Adapter settings.
    config: RelationalStoreConfig,
    /// Column declarations.
    schema: RecordSchema,
    /// Timing instrument for inserts.
    timer: TimingInstrument,
    /// Structured event log.
    log: Arc<dyn EventLog>,
    /// Set once the table and indexes exist.
    table_ready: AtomicBool,
}

impl RelationalStoreWriter {
    /// Creates a writer over a shared connection.
    #[must_use]
    pub fn new(
        connection: SharedConnection,
        config: RelationalStoreConfig,
        schema: RecordSchema,
        timer: TimingInstrument,
        log: Arc<dyn EventLog>,
    ) -> Self {
        Self {
            connection,
            config,
            schema,
            timer,
            log,
            table_ready: AtomicBool::new(false),
        }
    }

    /// Creates the table and its indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RelationalStoreError`] when an indexed column is not in the
    /// schema, one sub-batch would exceed the engine's parameter limit, or a
    /// DDL statement fails.
    pub fn ensure_table(&self) -> Result<(), RelationalStoreError> {
        if self.table_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        self.config.validate()?;
        self.config.check_insert_width(self.schema.fields().len())?;
        let mut connection = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        let table = self.config.table.as_str();
        let engine = connection.engine();
        connection.execute(&create_table_sql(engine, table, self.schema.fields()))?;
        for column in &self.config.indexed_columns {
            if self.schema.field_type(column).is_none() {
                return Err(RelationalStoreError::Invalid(format!("indexed column {column} is not a schema field")));
            }
            connection.execute(&create_index_sql(table, column))?;
        }
        drop(connection);
        self.table_ready.store(true, Ordering::Release);
        self.log.record(
            &LogEvent::info(COMPONENT, "table_ready", "event table and indexes ensured")
                .field("table", table)
                .field("indexes", self.config.indexed_columns.len()),
        );
        Ok(())
    }

    /// Inserts records in sequential sub-batches.
    ///
    /// # Errors
    ///
    /// Returns the failure unchanged when nothing was committed, otherwise
    /// [`RelationalStoreError::PartialWrite`] carrying the committed count.
    pub fn insert_records(&self, records: Vec<Record>) -> Result<usize, RelationalStoreError> {
        self.ensure_table()?;
        let mut committed = 0;
        for batch in split_into_batches(records, self.config.batch_size) {
            match self.insert_batch(&batch) {
                Ok(inserted) => committed += inserted,
                Err(err) => {
                    self.log.record(
                        &LogEvent::error(COMPONENT, "insert_failed", err.to_string())
                            .field("committed_records", committed)
                            .field("batch_records", batch.len()),
                    );
                    if committed == 0 {
                        return Err(err);
                    }
                    return Err(RelationalStoreError::PartialWrite {
                        committed_records: committed,
                        source: Box::new(err),
                    });
                }
            }
        }
        Ok(committed)
    }

    /// Inserts one sub-batch inside a timed scope.
    fn insert_batch(&self, batch: &[Record]) -> Result<usize, RelationalStoreError> {
        let rows = batch.iter().map(|record| self.row_values(record)).collect::<Result<Vec<_>, _>>()?;
        let scope = TimingScope::new(Backend::RelationalStore, WRITE_OPERATION).with_records(rows.len());
        self.timer.time(scope, || {
            let mut connection = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
            connection.insert_rows(&self.config.table, self.schema.fields(), &rows)
        })
    }

    /// Orders a record's values by schema column; absent fields become NULL.
    fn row_values(&self, record: &Record) -> Result<Vec<SqlValue>, RelationalStoreError> {
        if let Some((name, _)) = record.iter().find(|(name, _)| self.schema.field_type(name).is_none()) {
            return Err(RelationalStoreError::Invalid(format!("field {name} is not a table column")));
        }
        Ok(self
            .schema
            .fields()
            .iter()
            .map(|field| record.get(field.name).cloned().map_or(SqlValue::Null, SqlValue::from))
            .collect())
    }
}

impl RecordWriter for RelationalStoreWriter {
    fn backend(&self) -> Backend {
        Backend::RelationalStore
    }

    fn write(&self, records: Vec<Record>) -> Result<usize, BackendError> {
        self.insert_records(records).map_err(BackendError::from)
    }
}
