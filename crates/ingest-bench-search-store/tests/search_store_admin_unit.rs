// crates/ingest-bench-search-store/tests/search_store_admin_unit.rs
// ============================================================================
// Module: Collection Admin Tests
// Description: Existence, deletion, refresh, and reindex requests.
// Purpose: Pin status handling of index-level operations.
// ============================================================================

//! Collection administration unit tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;

use common::FakeTransport;
use ingest_bench_core::MemoryEventLog;
use ingest_bench_search_store::CollectionAdmin;
use ingest_bench_search_store::Method;
use ingest_bench_search_store::RequestBody;
use serde_json::json;

/// Builds an admin handle over the transport.
fn admin(transport: &Arc<FakeTransport>) -> CollectionAdmin {
    CollectionAdmin::new(transport.clone(), Arc::new(MemoryEventLog::new()))
}

#[test]
fn existence_follows_head_status() {
    let transport = FakeTransport::new(|index, _| common::respond(if index == 0 { 200 } else { 404 }, json!({})));
    let admin = admin(&transport);
    assert!(admin.collection_exists("events").unwrap());
    assert!(!admin.collection_exists("events").unwrap());
}

#[test]
fn unexpected_head_status_is_an_error() {
    let transport = FakeTransport::new(|_, _| common::respond(500, json!({})));
    assert!(admin(&transport).collection_exists("events").is_err());
}

#[test]
fn deleting_a_missing_collection_succeeds() {
    let transport = FakeTransport::new(|_, _| common::respond(404, json!({"error": {"type": "index_not_found_exception"}})));
    admin(&transport).delete_collection("events").unwrap();
    assert_eq!(transport.requests()[0].method, Method::Delete);
}

#[test]
fn refresh_posts_to_refresh_endpoint() {
    let transport = FakeTransport::new(|_, _| common::respond(200, json!({"_shards": {}})));
    admin(&transport).refresh_collection("events").unwrap();
    assert_eq!(transport.requests()[0].path, "events/_refresh");
}

#[test]
fn reindex_restricts_source_fields() {
    let transport = FakeTransport::new(|_, _| common::respond(200, json!({"total": 3})));
    let fields = vec!["job_id".to_string(), "stage".to_string()];
    let result = admin(&transport).reindex("events", "events_slim", Some(&fields)).unwrap();
    assert_eq!(result["total"], 3);
    match &transport.requests()[0].body {
        RequestBody::Json(body) => {
            assert_eq!(body["source"]["_source"], json!(["job_id", "stage"]));
            assert_eq!(body["dest"]["index"], "events_slim");
        }
        other => panic!("unexpected body {other:?}"),
    }
}

#[test]
fn existing_collection_is_not_recreated() {
    let transport = FakeTransport::new(|_, _| common::respond(200, json!({})));
    let created = admin(&transport).ensure_collection("events", &ingest_bench_core::ingestion_event_schema()).unwrap();
    assert!(!created);
    assert_eq!(transport.requests().len(), 1);
}
