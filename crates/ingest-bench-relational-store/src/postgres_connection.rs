// crates/ingest-bench-relational-store/src/postgres_connection.rs
// ============================================================================
// Module: Postgres Connection
// Description: postgres-crate implementation of the relational connection seam.
// Purpose: Write event rows and stream query results from `PostgreSQL`.
// Dependencies: postgres, time
// ============================================================================

//! ## Overview
//! Reads bind the query to a portal inside a transaction and pull
//! `fetch_size` rows per round trip, so large results never materialize at
//! once. Nulls are bound with the column's declared type so parameter type
//! checks pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ingest_bench_core::FieldSpec;
use ingest_bench_core::FieldType;
use postgres::Client;
use postgres::NoTls;
use postgres::Row;
use postgres::types::ToSql;
use postgres::types::Type;
use time::OffsetDateTime;
use time::PrimitiveDateTime;

use crate::config::RelationalEngine;
use crate::connection::RelationalConnection;
use crate::connection::RowVisitor;
use crate::error::RelationalStoreError;
use crate::sql::insert_sql;
use crate::value::SqlRow;
use crate::value::SqlValue;

/// Boxed bind parameter.
type Param = Box<dyn ToSql + Sync>;

// ============================================================================
// SECTION: Connection
// ============================================================================

/// `PostgreSQL` connection.
pub struct PostgresConnection {
    /// Underlying client.
    client: Client,
}

impl PostgresConnection {
    /// Connects using a libpq-style connection string or URL.
    ///
    /// # Errors
    ///
    /// Returns [`RelationalStoreError::Connection`] when the server cannot be
    /// reached.
    pub fn connect(url: &str) -> Result<Self, RelationalStoreError> {
        let client = Client::connect(url, NoTls).map_err(|err| RelationalStoreError::Connection(err.to_string()))?;
        Ok(Self {
            client,
        })
    }

    /// Binds `sql` to a portal and feeds each fetched chunk to `consume`.
    fn drain_portal(
        &mut self,
        sql: &str,
        fetch_size: usize,
        consume: &mut dyn FnMut(Vec<Row>) -> Result<(), RelationalStoreError>,
    ) -> Result<(), RelationalStoreError> {
        let max_rows = i32::try_from(fetch_size).map_err(|_| RelationalStoreError::Invalid("fetch_size too large".to_string()))?;
        let mut tx = self.client.transaction()?;
        let statement = tx.prepare(sql)?;
        let portal = tx.bind(&statement, &[])?;
        loop {
            let rows = tx.query_portal(&portal, max_rows)?;
            let exhausted = rows.len() < fetch_size;
            if rows.is_empty() {
                break;
            }
            consume(rows)?;
            if exhausted {
                break;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl RelationalConnection for PostgresConnection {
    fn engine(&self) -> RelationalEngine {
        RelationalEngine::Postgres
    }

    fn execute(&mut self, sql: &str) -> Result<(), RelationalStoreError> {
        self.client.batch_execute(sql)?;
        Ok(())
    }

    fn insert_rows(&mut self, table: &str, columns: &[FieldSpec], rows: &[Vec<SqlValue>]) -> Result<usize, RelationalStoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let mut params: Vec<Param> = Vec::with_capacity(rows.len() * columns.len());
        for row in rows {
            if row.len() != columns.len() {
                return Err(RelationalStoreError::Invalid(format!("row has {} values for {} columns", row.len(), columns.len())));
            }
            for (value, column) in row.iter().zip(columns) {
                params.push(to_param(value, column.field_type)?);
            }
        }
        let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|param| &**param).collect();
        let sql = insert_sql(RelationalEngine::Postgres, table, columns, rows.len());
        let mut tx = self.client.transaction()?;
        let inserted = tx.execute(sql.as_str(), &refs)?;
        tx.commit()?;
        usize::try_from(inserted).map_err(|err| RelationalStoreError::Invalid(err.to_string()))
    }

    fn stream_rows(&mut self, sql: &str, fetch_size: usize, visit: &mut RowVisitor<'_>) -> Result<u64, RelationalStoreError> {
        let mut count = 0;
        self.drain_portal(sql, fetch_size, &mut |rows| {
            for row in rows {
                visit(decode_row(&row)?)?;
                count += 1;
            }
            Ok(())
        })?;
        Ok(count)
    }

    fn count_rows(&mut self, sql: &str, fetch_size: usize) -> Result<u64, RelationalStoreError> {
        let mut count: u64 = 0;
        self.drain_portal(sql, fetch_size, &mut |rows| {
            count += u64::try_from(rows.len()).unwrap_or(u64::MAX);
            Ok(())
        })?;
        Ok(count)
    }
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Converts a value into a bind parameter typed for its column.
fn to_param(value: &SqlValue, field_type: FieldType) -> Result<Param, RelationalStoreError> {
    Ok(match value {
        SqlValue::Null => match field_type {
            FieldType::Text => Box::new(None::<String>),
            FieldType::Integer => Box::new(None::<i64>),
            FieldType::Double => Box::new(None::<f64>),
            FieldType::Boolean => Box::new(None::<bool>),
            FieldType::Timestamp => Box::new(None::<OffsetDateTime>),
        },
        SqlValue::Text(text) => Box::new(text.clone()),
        SqlValue::Integer(number) => Box::new(*number),
        SqlValue::Double(number) => Box::new(*number),
        SqlValue::Boolean(flag) => Box::new(*flag),
        SqlValue::Timestamp(ms) => Box::new(datetime_from_ms(*ms)?),
    })
}

/// Converts epoch milliseconds into a UTC date-time.
fn datetime_from_ms(ms: i64) -> Result<OffsetDateTime, RelationalStoreError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .map_err(|err| RelationalStoreError::Invalid(format!("timestamp out of range: {err}")))
}

/// Converts a date-time into epoch milliseconds.
fn datetime_to_ms(moment: OffsetDateTime) -> i64 {
    i64::try_from(moment.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

/// Decodes a row by inspecting each column's type.
fn decode_row(row: &Row) -> Result<SqlRow, RelationalStoreError> {
    let mut decoded: SqlRow = Vec::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value = if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(index)?.map_or(SqlValue::Null, SqlValue::Boolean)
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(index)?.map_or(SqlValue::Null, |n| SqlValue::Integer(i64::from(n)))
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(index)?.map_or(SqlValue::Null, |n| SqlValue::Integer(i64::from(n)))
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(index)?.map_or(SqlValue::Null, SqlValue::Integer)
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(index)?.map_or(SqlValue::Null, |n| SqlValue::Double(f64::from(n)))
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(index)?.map_or(SqlValue::Null, SqlValue::Double)
        } else if *ty == Type::TIMESTAMPTZ {
            row.try_get::<_, Option<OffsetDateTime>>(index)?.map_or(SqlValue::Null, |t| SqlValue::Timestamp(datetime_to_ms(t)))
        } else if *ty == Type::TIMESTAMP {
            row.try_get::<_, Option<PrimitiveDateTime>>(index)?
                .map_or(SqlValue::Null, |t| SqlValue::Timestamp(datetime_to_ms(t.assume_utc())))
        } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME {
            row.try_get::<_, Option<String>>(index)?.map_or(SqlValue::Null, SqlValue::Text)
        } else {
            return Err(RelationalStoreError::Invalid(format!(
                "column {} has unsupported type {}; cast it in the query",
                column.name(),
                ty.name()
            )));
        };
        decoded.push((column.name().to_string(), value));
    }
    Ok(decoded)
}
