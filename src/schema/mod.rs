//! Schema registry core
//!
//! This module holds the data model shared by the compatibility engine:
//! schema type tags, the per-namespace compatibility strategy enumeration,
//! candidate and registered schema representations, and the error type.
//!
//! ## Supported schema encodings
//!
//! - **Structured**: AVRO, JSON, PROTOBUF — carry a parsed field set and are
//!   subject to field-level structural checks
//! - **Primitive**: INT8 through INT64, STRING, BOOL, DOUBLE, FLOAT, BYTES,
//!   the date/time family, and an opaque BYTEBUFFER — no internal structure,
//!   so only the type matrix applies

pub mod compatibility;
pub mod fields;
pub mod ledger;
pub mod registry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use self::compatibility::IncompatibilityReason;
use self::fields::SchemaField;

/// Tag identifying a schema's encoding family.
///
/// Immutable once assigned to a registered version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaTypeTag {
    /// Apache Avro record schema
    Avro,
    /// JSON record schema
    Json,
    /// Protocol Buffers message schema
    Protobuf,
    Int8,
    Int16,
    Int32,
    Int64,
    String,
    Bool,
    Double,
    Float,
    Bytes,
    Date,
    Time,
    Timestamp,
    Instant,
    LocalDate,
    LocalDateTime,
    LocalTime,
    /// Opaque byte-buffer payloads
    #[serde(rename = "BYTEBUFFER")]
    ByteBuffer,
}

impl SchemaTypeTag {
    /// Whether this tag denotes a schema with named, typed fields.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            SchemaTypeTag::Avro | SchemaTypeTag::Json | SchemaTypeTag::Protobuf
        )
    }

    /// Whether this tag denotes a single scalar value with no internal fields.
    pub fn is_primitive(&self) -> bool {
        !self.is_structured()
    }
}

impl fmt::Display for SchemaTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaTypeTag::Avro => "AVRO",
            SchemaTypeTag::Json => "JSON",
            SchemaTypeTag::Protobuf => "PROTOBUF",
            SchemaTypeTag::Int8 => "INT8",
            SchemaTypeTag::Int16 => "INT16",
            SchemaTypeTag::Int32 => "INT32",
            SchemaTypeTag::Int64 => "INT64",
            SchemaTypeTag::String => "STRING",
            SchemaTypeTag::Bool => "BOOL",
            SchemaTypeTag::Double => "DOUBLE",
            SchemaTypeTag::Float => "FLOAT",
            SchemaTypeTag::Bytes => "BYTES",
            SchemaTypeTag::Date => "DATE",
            SchemaTypeTag::Time => "TIME",
            SchemaTypeTag::Timestamp => "TIMESTAMP",
            SchemaTypeTag::Instant => "INSTANT",
            SchemaTypeTag::LocalDate => "LOCAL_DATE",
            SchemaTypeTag::LocalDateTime => "LOCAL_DATE_TIME",
            SchemaTypeTag::LocalTime => "LOCAL_TIME",
            SchemaTypeTag::ByteBuffer => "BYTEBUFFER",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for SchemaTypeTag {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "AVRO" => Ok(SchemaTypeTag::Avro),
            "JSON" => Ok(SchemaTypeTag::Json),
            "PROTOBUF" => Ok(SchemaTypeTag::Protobuf),
            "INT8" => Ok(SchemaTypeTag::Int8),
            "INT16" => Ok(SchemaTypeTag::Int16),
            "INT32" => Ok(SchemaTypeTag::Int32),
            "INT64" => Ok(SchemaTypeTag::Int64),
            "STRING" => Ok(SchemaTypeTag::String),
            "BOOL" => Ok(SchemaTypeTag::Bool),
            "DOUBLE" => Ok(SchemaTypeTag::Double),
            "FLOAT" => Ok(SchemaTypeTag::Float),
            "BYTES" => Ok(SchemaTypeTag::Bytes),
            "DATE" => Ok(SchemaTypeTag::Date),
            "TIME" => Ok(SchemaTypeTag::Time),
            "TIMESTAMP" => Ok(SchemaTypeTag::Timestamp),
            "INSTANT" => Ok(SchemaTypeTag::Instant),
            "LOCAL_DATE" => Ok(SchemaTypeTag::LocalDate),
            "LOCAL_DATE_TIME" => Ok(SchemaTypeTag::LocalDateTime),
            "LOCAL_TIME" => Ok(SchemaTypeTag::LocalTime),
            "BYTEBUFFER" => Ok(SchemaTypeTag::ByteBuffer),
            _ => Err(SchemaError::InvalidSchemaType(s.to_string())),
        }
    }
}

/// Namespace-level policy governing which schema transitions are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityStrategy {
    /// Check against the latest version and reject on any type or structural
    /// difference. The historical strict default when no policy is set.
    #[default]
    Undefined,
    /// Skip all checks; any schema of any type is appended.
    AlwaysCompatible,
    /// New schema can read data written with the previous schema.
    Backward,
    /// The previous schema's readers can read data written with the new schema.
    Forward,
    /// Both backward and forward.
    Full,
    /// Backward against every prior version, not just the latest.
    BackwardTransitive,
    /// Forward against every prior version, not just the latest.
    ForwardTransitive,
    /// Full against every prior version, not just the latest.
    FullTransitive,
}

impl CompatibilityStrategy {
    /// Whether this strategy checks against the full version history.
    pub fn is_transitive(&self) -> bool {
        matches!(
            self,
            CompatibilityStrategy::BackwardTransitive
                | CompatibilityStrategy::ForwardTransitive
                | CompatibilityStrategy::FullTransitive
        )
    }
}

impl fmt::Display for CompatibilityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompatibilityStrategy::Undefined => "UNDEFINED",
            CompatibilityStrategy::AlwaysCompatible => "ALWAYS_COMPATIBLE",
            CompatibilityStrategy::Backward => "BACKWARD",
            CompatibilityStrategy::Forward => "FORWARD",
            CompatibilityStrategy::Full => "FULL",
            CompatibilityStrategy::BackwardTransitive => "BACKWARD_TRANSITIVE",
            CompatibilityStrategy::ForwardTransitive => "FORWARD_TRANSITIVE",
            CompatibilityStrategy::FullTransitive => "FULL_TRANSITIVE",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for CompatibilityStrategy {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UNDEFINED" => Ok(CompatibilityStrategy::Undefined),
            "ALWAYS_COMPATIBLE" => Ok(CompatibilityStrategy::AlwaysCompatible),
            "BACKWARD" => Ok(CompatibilityStrategy::Backward),
            "FORWARD" => Ok(CompatibilityStrategy::Forward),
            "FULL" => Ok(CompatibilityStrategy::Full),
            "BACKWARD_TRANSITIVE" => Ok(CompatibilityStrategy::BackwardTransitive),
            "FORWARD_TRANSITIVE" => Ok(CompatibilityStrategy::ForwardTransitive),
            "FULL_TRANSITIVE" => Ok(CompatibilityStrategy::FullTransitive),
            _ => Err(SchemaError::InvalidStrategy(s.to_string())),
        }
    }
}

/// A candidate schema as presented by a connecting client.
///
/// Structured types carry a parsed field set; primitive types carry none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaData {
    /// Encoding family tag
    pub type_tag: SchemaTypeTag,
    /// Named fields, empty for primitive types
    #[serde(default)]
    pub fields: Vec<SchemaField>,
    /// Free-form client-supplied properties
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl SchemaData {
    /// Create a primitive schema with no internal structure.
    pub fn primitive(type_tag: SchemaTypeTag) -> Self {
        Self {
            type_tag,
            fields: Vec::new(),
            properties: HashMap::new(),
        }
    }

    /// Create a structured schema with the given field set.
    pub fn structured(type_tag: SchemaTypeTag, fields: Vec<SchemaField>) -> Self {
        Self {
            type_tag,
            fields,
            properties: HashMap::new(),
        }
    }

    /// Attach a free-form property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Whether two schemas have the same type tag and field structure.
    ///
    /// Properties are metadata and do not participate in identity.
    pub fn same_definition(&self, other: &SchemaData) -> bool {
        self.type_tag == other.type_tag && self.fields == other.fields
    }
}

/// One registered schema version, identified by topic plus sequence number.
///
/// Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Monotonic sequence number, starting at 0 for the first registration
    pub version: u64,
    /// The registered schema definition
    pub schema: SchemaData,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl SchemaVersion {
    pub(crate) fn new(version: u64, schema: SchemaData) -> Self {
        Self {
            version,
            schema,
            created_at: Utc::now(),
        }
    }
}

/// Schema registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchemaRegistryConfig {
    /// Strategy applied when a namespace has no configured policy.
    ///
    /// Defaults to UNDEFINED, the fail-closed strict mode.
    #[serde(default)]
    pub default_strategy: CompatibilityStrategy,
}

/// Schema error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    /// Candidate schema rejected by the compatibility check.
    ///
    /// The rendered message for type-level rejections is the stable
    /// client-facing contract and must not change.
    #[error("{0}")]
    IncompatibleSchema(IncompatibilityReason),

    /// Malformed topic name
    #[error("Invalid topic name: {0}")]
    InvalidTopicName(String),

    /// Unknown schema type tag
    #[error("Invalid schema type: {0}")]
    InvalidSchemaType(String),

    /// Unknown compatibility strategy
    #[error("Invalid compatibility strategy: {0}")]
    InvalidStrategy(String),

    /// Topic has no registered schema history
    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    /// Durable storage failure
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization failure
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SchemaError {
    /// The structured rejection reason, when this is a compatibility error.
    pub fn incompatibility(&self) -> Option<&IncompatibilityReason> {
        match self {
            SchemaError::IncompatibleSchema(reason) => Some(reason),
            _ => None,
        }
    }
}
