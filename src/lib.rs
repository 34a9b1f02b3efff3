#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # Schemagate
//!
//! Schemagate is the broker-side schema gate for a topic-based messaging
//! system: given a topic that already has zero or more registered schema
//! versions, it decides whether a newly presented schema (from a connecting
//! producer, a subscribing consumer, or an explicit admin registration) may
//! be accepted, according to the compatibility strategy configured on the
//! topic's namespace.
//!
//! ## Features
//!
//! - Append-only per-topic schema ledger with monotonic version numbers
//! - Type-tag matrix: structured (AVRO, JSON, PROTOBUF) and primitive
//!   encodings must match exactly under every strategy except
//!   ALWAYS_COMPATIBLE
//! - Field-level structural checks (BACKWARD, FORWARD, FULL, and their
//!   transitive variants) with widening-aware type changes
//! - Per-topic serialization of check-then-append, fully parallel across
//!   topics
//! - Injectable namespace policy store and durable storage collaborators
//!
//! ## Usage
//!
//! ```no_run
//! use schemagate::{MemoryPolicyStore, SchemaData, SchemaRegistry, SchemaTypeTag, TopicName};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> schemagate::Result<()> {
//!     let policies = Arc::new(MemoryPolicyStore::new());
//!     let registry = SchemaRegistry::in_memory(policies);
//!
//!     let topic: TopicName = "persistent://public/default/orders".parse()?;
//!     let version = registry
//!         .check_and_register(&topic, SchemaData::primitive(SchemaTypeTag::String))
//!         .await?;
//!     println!("registered schema version {}", version.version);
//!     Ok(())
//! }
//! ```

pub mod policy;
pub mod schema;
pub mod service;
pub mod topic;

pub use policy::{MemoryPolicyStore, NamespacePolicyStore};
pub use schema::compatibility::{
    types_compatible, CompatibilityChecker, CompatibilityResult, IncompatibilityReason,
};
pub use schema::fields::{FieldType, SchemaField};
pub use schema::ledger::SchemaLedger;
pub use schema::registry::{MemorySchemaStorage, SchemaRegistry, SchemaStorage};
pub use schema::{
    CompatibilityStrategy, SchemaData, SchemaError, SchemaRegistryConfig, SchemaTypeTag,
    SchemaVersion,
};
pub use service::TopicSchemaService;
pub use topic::{TopicDomain, TopicName};

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, SchemaError>;
