// crates/ingest-bench-relational-store/src/lib.rs
// ============================================================================
// Module: Ingest Bench Relational Store
// Description: Relational adapter over `PostgreSQL` and `SQLite`.
// Purpose: Insert event rows in committed sub-batches and stream queries.
// Dependencies: ingest-bench-core, postgres, rusqlite, serde, thiserror, time
// ============================================================================

//! ## Overview
//! A single [`RelationalConnection`] per adapter is shared by the writer and
//! reader. Writes are strictly sequential; reads use a server-side cursor on
//! `PostgreSQL` and lazy statement stepping on `SQLite`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod connection;
pub mod error;
pub mod postgres_connection;
pub mod reader;
pub mod sql;
pub mod sqlite_connection;
pub mod value;
pub mod writer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::RelationalEngine;
pub use config::RelationalStoreConfig;
pub use config::ensure_identifier;
pub use connection::RelationalConnection;
pub use connection::RowVisitor;
pub use connection::SharedConnection;
pub use connection::open_connection;
pub use connection::share;
pub use error::RelationalStoreError;
pub use postgres_connection::PostgresConnection;
pub use reader::RelationalStoreReader;
pub use sqlite_connection::SqliteConnection;
pub use value::SqlRow;
pub use value::SqlValue;
pub use writer::RelationalStoreWriter;
