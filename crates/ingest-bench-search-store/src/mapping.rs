// crates/ingest-bench-search-store/src/mapping.rs
// ============================================================================
// Module: Collection Mapping
// Description: Field mappings derived from a record schema.
// Purpose: Create benchmark collections with explicit field types.
// Dependencies: ingest-bench-core, serde_json
// ============================================================================

//! ## Overview
//! Text fields map to `keyword` so the catalog's term aggregations work
//! without `.keyword` sub-fields. Timestamps map to `date`, which accepts the
//! epoch milliseconds records serialize to.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ingest_bench_core::FieldType;
use ingest_bench_core::RecordSchema;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Mapping
// ============================================================================

/// Returns the mapping type for a field type.
#[must_use]
pub const fn mapping_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Text => "keyword",
        FieldType::Integer => "integer",
        FieldType::Double => "double",
        FieldType::Boolean => "boolean",
        FieldType::Timestamp => "date",
    }
}

/// Builds the collection creation body for a schema.
#[must_use]
pub fn collection_body(schema: &RecordSchema) -> Value {
    let mut properties = Map::new();
    for field in schema.fields() {
        properties.insert(field.name.to_string(), json!({"type": mapping_type(field.field_type)}));
    }
    json!({"mappings": {"properties": properties}})
}
