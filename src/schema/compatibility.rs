//! Schema compatibility evaluation
//!
//! Two layers run in order. The type matrix compares encoding-family tags
//! and can short-circuit the whole check: under every strategy except
//! ALWAYS_COMPATIBLE the tags must be identical, with no numeric promotion
//! at the tag level (AVRO vs JSON is incompatible even for the same logical
//! record; INT32 vs STRING is incompatible). Only when the tags match and
//! the schema is structured does the field-level evaluator run, dispatching
//! on the direction the strategy requires.

use super::fields::SchemaField;
use super::{CompatibilityStrategy, SchemaData, SchemaTypeTag, SchemaVersion};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Baseline type-tag compatibility.
///
/// Identity is required under every strategy except ALWAYS_COMPATIBLE, which
/// accepts without inspecting the tags.
pub fn types_compatible(
    existing: SchemaTypeTag,
    incoming: SchemaTypeTag,
    strategy: CompatibilityStrategy,
) -> bool {
    strategy == CompatibilityStrategy::AlwaysCompatible || existing == incoming
}

/// Why a candidate schema was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IncompatibilityReason {
    /// Existing and incoming type tags differ.
    TypeMismatch {
        existing: SchemaTypeTag,
        incoming: SchemaTypeTag,
    },
    /// Tags match, but a field-level rule was violated against `version`.
    StructuralMismatch {
        /// The first failing version, earliest-first when several were checked
        version: u64,
        /// One entry per violated rule
        details: Vec<String>,
    },
}

impl fmt::Display for IncompatibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Stable client-facing message; callers match on this text.
            IncompatibilityReason::TypeMismatch { existing, incoming } => write!(
                f,
                "Incompatible schema: exists schema type {}, new schema type {}",
                existing, incoming
            ),
            IncompatibilityReason::StructuralMismatch { version, details } => write!(
                f,
                "Incompatible schema: not compatible with version {}: {}",
                version,
                details.join("; ")
            ),
        }
    }
}

/// Result of a compatibility check.
#[derive(Debug, Clone)]
pub struct CompatibilityResult {
    /// Whether the candidate may be registered
    pub is_compatible: bool,
    /// Rejection reason when incompatible
    pub reason: Option<IncompatibilityReason>,
}

impl CompatibilityResult {
    /// Create a compatible result
    pub fn compatible() -> Self {
        Self {
            is_compatible: true,
            reason: None,
        }
    }

    /// Create an incompatible result with a reason
    pub fn incompatible(reason: IncompatibilityReason) -> Self {
        Self {
            is_compatible: false,
            reason: Some(reason),
        }
    }
}

/// Evaluates a candidate schema against a topic's registered history.
#[derive(Debug, Default)]
pub struct CompatibilityChecker;

impl CompatibilityChecker {
    /// Create a new compatibility checker
    pub fn new() -> Self {
        Self
    }

    /// Check a candidate against the version history under `strategy`.
    ///
    /// `history` must be ordered oldest-first. Non-transitive strategies
    /// only look at the tail; transitive strategies walk the whole history
    /// and report the first failing version. An empty history is always
    /// compatible: there is nothing to compare against.
    pub fn check(
        &self,
        history: &[SchemaVersion],
        candidate: &SchemaData,
        strategy: CompatibilityStrategy,
    ) -> CompatibilityResult {
        if strategy == CompatibilityStrategy::AlwaysCompatible || history.is_empty() {
            return CompatibilityResult::compatible();
        }

        let to_check: Vec<&SchemaVersion> = if strategy.is_transitive() {
            history.iter().collect()
        } else {
            match history.last() {
                Some(latest) => vec![latest],
                None => return CompatibilityResult::compatible(),
            }
        };

        for existing in to_check {
            let existing_tag = existing.schema.type_tag;
            if !types_compatible(existing_tag, candidate.type_tag, strategy) {
                return CompatibilityResult::incompatible(IncompatibilityReason::TypeMismatch {
                    existing: existing_tag,
                    incoming: candidate.type_tag,
                });
            }

            // Primitive types have no internal structure; the matrix is all
            // there is to check.
            if !candidate.type_tag.is_structured() {
                continue;
            }

            let details = check_fields(&existing.schema.fields, &candidate.fields, strategy);
            if !details.is_empty() {
                return CompatibilityResult::incompatible(
                    IncompatibilityReason::StructuralMismatch {
                        version: existing.version,
                        details,
                    },
                );
            }
        }

        CompatibilityResult::compatible()
    }
}

/// Field-level check for one existing version, dispatched per direction.
fn check_fields(
    existing: &[SchemaField],
    incoming: &[SchemaField],
    strategy: CompatibilityStrategy,
) -> Vec<String> {
    match strategy {
        CompatibilityStrategy::AlwaysCompatible => Vec::new(),
        CompatibilityStrategy::Undefined => check_exact(existing, incoming),
        CompatibilityStrategy::Backward | CompatibilityStrategy::BackwardTransitive => {
            check_readable(incoming, existing)
        }
        CompatibilityStrategy::Forward | CompatibilityStrategy::ForwardTransitive => {
            check_readable(existing, incoming)
        }
        CompatibilityStrategy::Full | CompatibilityStrategy::FullTransitive => {
            let mut details = check_readable(incoming, existing);
            details.extend(check_readable(existing, incoming));
            details
        }
    }
}

/// Can a reader with `reader` fields process data written with `writer`
/// fields?
///
/// Backward is `check_readable(incoming, existing)`; forward is the same
/// check with the roles swapped.
fn check_readable(reader: &[SchemaField], writer: &[SchemaField]) -> Vec<String> {
    let mut details = Vec::new();

    let reader_by_name: HashMap<&str, &SchemaField> =
        reader.iter().map(|f| (f.name.as_str(), f)).collect();
    let writer_by_name: HashMap<&str, &SchemaField> =
        writer.iter().map(|f| (f.name.as_str(), f)).collect();

    for writer_field in writer {
        match reader_by_name.get(writer_field.name.as_str()) {
            None => {
                if writer_field.is_required() {
                    details.push(format!(
                        "reader is missing required field '{}'",
                        writer_field.name
                    ));
                }
            }
            Some(reader_field) => {
                if !reader_field.field_type.widens_from(&writer_field.field_type) {
                    details.push(format!(
                        "field '{}' type changed from {} to {} without a widening conversion",
                        writer_field.name, writer_field.field_type, reader_field.field_type
                    ));
                }
            }
        }
    }

    for reader_field in reader {
        if !writer_by_name.contains_key(reader_field.name.as_str()) && reader_field.is_required() {
            details.push(format!(
                "reader field '{}' added without a default value",
                reader_field.name
            ));
        }
    }

    details
}

/// Exact-match rule for UNDEFINED: any structural delta at all rejects.
fn check_exact(existing: &[SchemaField], incoming: &[SchemaField]) -> Vec<String> {
    let mut details = Vec::new();

    let incoming_by_name: HashMap<&str, &SchemaField> =
        incoming.iter().map(|f| (f.name.as_str(), f)).collect();
    let existing_by_name: HashMap<&str, &SchemaField> =
        existing.iter().map(|f| (f.name.as_str(), f)).collect();

    for existing_field in existing {
        match incoming_by_name.get(existing_field.name.as_str()) {
            None => details.push(format!("field '{}' removed", existing_field.name)),
            Some(incoming_field) => {
                if incoming_field.field_type != existing_field.field_type {
                    details.push(format!(
                        "field '{}' type changed from {} to {}",
                        existing_field.name,
                        existing_field.field_type,
                        incoming_field.field_type
                    ));
                } else if incoming_field.default != existing_field.default {
                    details.push(format!(
                        "field '{}' default changed",
                        existing_field.name
                    ));
                }
            }
        }
    }

    for incoming_field in incoming {
        if !existing_by_name.contains_key(incoming_field.name.as_str()) {
            details.push(format!("field '{}' added", incoming_field.name));
        }
    }

    details
}
