// crates/ingest-bench-search-store/src/response.rs
// ============================================================================
// Module: Response Checks
// Description: Error-object and per-item error extraction.
// Purpose: Turn search responses into results, honoring ignored error types.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A response fails when its status is not 2xx, when it carries a top-level
//! `error` object, or when a bulk response reports `errors: true`. Error
//! types on the ignore list are dropped; the response only fails if
//! something remains.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::error::SearchStoreError;
use crate::transport::SearchResponse;

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Validates a response and returns its body (`null` when empty).
///
/// # Errors
///
/// Returns [`SearchStoreError::ItemErrors`] for unignored bulk item errors and
/// [`SearchStoreError::Status`] for any other unignored failure.
pub fn check_response(response: SearchResponse, ignored: &[String]) -> Result<Value, SearchStoreError> {
    let status = response.status;
    let body = response.body.unwrap_or(Value::Null);
    if let Some(error) = body.get("error").filter(|error| !error.is_null()) {
        if is_ignored(error, ignored) {
            return Ok(body);
        }
        return Err(SearchStoreError::Status {
            status,
            detail: error.clone(),
        });
    }
    if body.get("errors").and_then(Value::as_bool) == Some(true) {
        let remaining = item_errors(&body, ignored);
        if !remaining.is_empty() {
            return Err(SearchStoreError::ItemErrors(remaining));
        }
        return Ok(body);
    }
    if !(200 .. 300).contains(&status) {
        return Err(SearchStoreError::Status {
            status,
            detail: body,
        });
    }
    Ok(body)
}

/// Returns the unignored error objects of a bulk response's items.
#[must_use]
pub fn item_errors(body: &Value, ignored: &[String]) -> Vec<Value> {
    let Some(items) = body.get("items").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            // Each item is keyed by its action (`index`, `create`, ...).
            item.as_object().and_then(|actions| actions.values().find_map(|result| result.get("error")))
        })
        .filter(|error| !error.is_null() && !is_ignored(error, ignored))
        .cloned()
        .collect()
}

/// Returns true when the error's `type` is on the ignore list.
fn is_ignored(error: &Value, ignored: &[String]) -> bool {
    error.get("type").and_then(Value::as_str).is_some_and(|kind| ignored.iter().any(|name| name == kind))
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::panic,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap for clarity."
    )]

    use serde_json::json;

    use super::check_response;
    use crate::error::SearchStoreError;
    use crate::transport::SearchResponse;

    /// Ignore list used by these tests.
    fn ignored() -> Vec<String> {
        vec!["version_conflict_engine_exception".to_string()]
    }

    #[test]
    fn ignored_item_errors_are_dropped() {
        let response = SearchResponse {
            status: 200,
            body: Some(json!({
                "errors": true,
                "items": [
                    {"index": {"status": 201}},
                    {"index": {"status": 409, "error": {"type": "version_conflict_engine_exception"}}}
                ]
            })),
        };
        assert!(check_response(response, &ignored()).is_ok());
    }

    #[test]
    fn remaining_item_errors_fail_the_request() {
        let response = SearchResponse {
            status: 200,
            body: Some(json!({
                "errors": true,
                "items": [
                    {"index": {"status": 400, "error": {"type": "mapper_parsing_exception"}}},
                    {"index": {"status": 409, "error": {"type": "version_conflict_engine_exception"}}}
                ]
            })),
        };
        let err = check_response(response, &ignored()).unwrap_err();
        match err {
            SearchStoreError::ItemErrors(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0]["type"], "mapper_parsing_exception");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ignored_top_level_error_is_success() {
        let response = SearchResponse {
            status: 400,
            body: Some(json!({"error": {"type": "version_conflict_engine_exception"}, "status": 400})),
        };
        assert!(check_response(response, &ignored()).is_ok());
    }

    #[test]
    fn non_success_status_without_error_object_fails() {
        let response = SearchResponse {
            status: 503,
            body: None,
        };
        assert!(matches!(
            check_response(response, &ignored()),
            Err(SearchStoreError::Status {
                status: 503,
                ..
            })
        ));
    }
}
