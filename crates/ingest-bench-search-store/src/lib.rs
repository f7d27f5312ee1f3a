// crates/ingest-bench-search-store/src/lib.rs
// ============================================================================
// Module: Ingest Bench Search Store
// Description: Search-cluster adapter for benchmark writes and reads.
// Purpose: Bulk-index records and run search bodies over a REST transport.
// Dependencies: ingest-bench-core, reqwest, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The writer bulk-indexes records with bounded concurrency, bisecting
//! oversize requests and backing off on throttling. The reader covers
//! lookups, searches, scroll drains, and cursor pagination. Both talk to the
//! cluster through [`SearchTransport`], implemented over blocking reqwest.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod admin;
pub mod config;
pub mod error;
pub mod mapping;
pub mod reader;
pub mod response;
pub mod transport;
pub mod writer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use admin::CollectionAdmin;
pub use config::RetryConfig;
pub use config::SearchStoreConfig;
pub use error::SearchStoreError;
pub use mapping::collection_body;
pub use reader::SearchStoreReader;
pub use reader::result_rows;
pub use response::check_response;
pub use transport::HttpSearchTransport;
pub use transport::Method;
pub use transport::RequestBody;
pub use transport::SearchRequest;
pub use transport::SearchResponse;
pub use transport::SearchTransport;
pub use writer::BulkPair;
pub use writer::BulkReport;
pub use writer::SearchStoreWriter;
pub use writer::bulk_pairs;
pub use writer::ndjson_body;
