// crates/ingest-bench-core/src/record.rs
// ============================================================================
// Module: Flat Records
// Description: Wire/storage representation of job-stage events.
// Purpose: Provide one typed record shape shared verbatim by every backend.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! A [`Record`] is a flat mapping of field name to typed scalar. Field types are
//! declared once by a [`RecordSchema`]; each backend adapter maps
//! [`FieldType`] onto its own native type system. Timestamps are always epoch
//! milliseconds on the record itself and are converted at the adapter edge.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use time::OffsetDateTime;
use time::PrimitiveDateTime;

// ============================================================================
// SECTION: Field Types
// ============================================================================

/// Declared type of a record field.
///
/// # Invariants
/// - Variants are stable; adapters map each variant to exactly one native type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// UTF-8 text.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit floating point.
    Double,
    /// Boolean flag.
    Boolean,
    /// Epoch milliseconds.
    Timestamp,
}

impl FieldType {
    /// Returns a stable label for the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
        }
    }
}

/// Typed scalar carried by a record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// UTF-8 text.
    Text(String),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit floating point.
    Double(f64),
    /// Boolean flag.
    Boolean(bool),
    /// Epoch milliseconds.
    Timestamp(i64),
}

impl FieldValue {
    /// Returns the declared type of this value.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            Self::Text(_) => FieldType::Text,
            Self::Integer(_) => FieldType::Integer,
            Self::Double(_) => FieldType::Double,
            Self::Boolean(_) => FieldType::Boolean,
            Self::Timestamp(_) => FieldType::Timestamp,
        }
    }

    /// Returns the plain JSON form (timestamps stay epoch milliseconds).
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(value) => Value::String(value.clone()),
            Self::Integer(value) | Self::Timestamp(value) => Value::from(*value),
            Self::Double(value) => {
                serde_json::Number::from_f64(*value).map_or(Value::Null, Value::Number)
            }
            Self::Boolean(value) => Value::Bool(*value),
        }
    }

    /// Returns the epoch milliseconds for timestamp values.
    #[must_use]
    pub const fn as_timestamp_ms(&self) -> Option<i64> {
        match self {
            Self::Timestamp(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) | Self::Timestamp(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// Converts epoch milliseconds into a UTC date-time without offset.
///
/// Returns `None` when the value is outside the representable range.
#[must_use]
pub fn millis_to_datetime(ms: i64) -> Option<PrimitiveDateTime> {
    let nanos = i128::from(ms).checked_mul(1_000_000)?;
    let moment = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
    Some(PrimitiveDateTime::new(moment.date(), moment.time()))
}

// ============================================================================
// SECTION: Record
// ============================================================================

/// Flat record: field name to typed scalar.
///
/// # Invariants
/// - Field names are unique; insertion replaces the previous value.
/// - Iteration order is lexical by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Field values keyed by name.
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a field value.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns a field value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the record carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over fields in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the record as a flat JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in &self.fields {
            object.insert(name.clone(), value.to_json());
        }
        Value::Object(object)
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// One declared field in a record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name.
    pub name: &'static str,
    /// Declared type.
    pub field_type: FieldType,
}

/// Fixed field-type declaration shared by all backends.
///
/// # Invariants
/// - Field order is the declaration order and is stable across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSchema {
    /// Declared fields in order.
    fields: &'static [FieldSpec],
}

impl RecordSchema {
    /// Wraps a static field declaration.
    #[must_use]
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self {
            fields,
        }
    }

    /// Returns the declared fields in order.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Returns the declared type for a field.
    #[must_use]
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.iter().find(|spec| spec.name == name).map(|spec| spec.field_type)
    }
}

/// Field declarations for flattened ingestion job events.
const INGESTION_EVENT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "ingestion_batch_id",
        field_type: FieldType::Text,
    },
    FieldSpec {
        name: "org_id",
        field_type: FieldType::Text,
    },
    FieldSpec {
        name: "user_id",
        field_type: FieldType::Text,
    },
    FieldSpec {
        name: "repo_id",
        field_type: FieldType::Text,
    },
    FieldSpec {
        name: "repo_version",
        field_type: FieldType::Text,
    },
    FieldSpec {
        name: "priority",
        field_type: FieldType::Text,
    },
    FieldSpec {
        name: "job_id",
        field_type: FieldType::Text,
    },
    FieldSpec {
        name: "job_type",
        field_type: FieldType::Text,
    },
    FieldSpec {
        name: "created_at",
        field_type: FieldType::Timestamp,
    },
    FieldSpec {
        name: "dataset_id",
        field_type: FieldType::Text,
    },
    FieldSpec {
        name: "num_stages",
        field_type: FieldType::Integer,
    },
    FieldSpec {
        name: "time",
        field_type: FieldType::Timestamp,
    },
    FieldSpec {
        name: "stage",
        field_type: FieldType::Text,
    },
    FieldSpec {
        name: "stage_progress",
        field_type: FieldType::Integer,
    },
    FieldSpec {
        name: "errored",
        field_type: FieldType::Boolean,
    },
    FieldSpec {
        name: "finished",
        field_type: FieldType::Boolean,
    },
];

/// Returns the schema of flattened ingestion job events.
#[must_use]
pub const fn ingestion_event_schema() -> RecordSchema {
    RecordSchema::new(INGESTION_EVENT_FIELDS)
}

/// Name of the event-time field in ingestion event records.
pub const EVENT_TIME_FIELD: &str = "time";
