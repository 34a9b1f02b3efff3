//! Structured schema field model
//!
//! Fields are the unit of structural compatibility: a structured schema
//! (AVRO, JSON, PROTOBUF) is a named, typed field set. A field without a
//! default value is required.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a single field within a structured schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    String,
    Bytes,
    /// Homogeneous list; widens element-wise
    Array(Box<FieldType>),
}

impl FieldType {
    /// Whether a reader of this type can hold every value written as `writer`.
    ///
    /// Integer types widen along INT8 -> INT16 -> INT32 -> INT64, integers
    /// widen into FLOAT/DOUBLE, FLOAT widens into DOUBLE, and STRING and
    /// BYTES are interchangeable. Everything else is not a widening
    /// conversion.
    pub fn widens_from(&self, writer: &FieldType) -> bool {
        use FieldType::*;

        if self == writer {
            return true;
        }

        match (self, writer) {
            (Int16, Int8) => true,
            (Int32, Int8 | Int16) => true,
            (Int64, Int8 | Int16 | Int32) => true,
            (Float, Int8 | Int16 | Int32) => true,
            (Double, Int8 | Int16 | Int32 | Int64 | Float) => true,
            (String, Bytes) | (Bytes, String) => true,
            (Array(reader), Array(writer)) => reader.widens_from(writer),
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => write!(f, "bool"),
            FieldType::Int8 => write!(f, "int8"),
            FieldType::Int16 => write!(f, "int16"),
            FieldType::Int32 => write!(f, "int32"),
            FieldType::Int64 => write!(f, "int64"),
            FieldType::Float => write!(f, "float"),
            FieldType::Double => write!(f, "double"),
            FieldType::String => write!(f, "string"),
            FieldType::Bytes => write!(f, "bytes"),
            FieldType::Array(items) => write!(f, "array<{}>", items),
        }
    }
}

/// A named, typed field of a structured schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name, unique within a schema
    pub name: String,
    /// Field type
    pub field_type: FieldType,
    /// Default value, if any. A field with no default is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl SchemaField {
    /// Create a required field (no default).
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
        }
    }

    /// Attach a default value, making the field optional.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Whether readers must see a value for this field.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}
