//! Schema registration coordination
//!
//! `SchemaRegistry` is the single entry point through which producers,
//! consumers, and explicit admin registration present candidate schemas.
//! The read-tail, evaluate, append sequence is serialized per topic behind a
//! sharded lock; registrations for different topics proceed fully in
//! parallel. The durable storage write completes before a caller ever
//! observes an accepted verdict.

use super::compatibility::CompatibilityChecker;
use super::ledger::SchemaLedger;
use super::{
    CompatibilityStrategy, SchemaData, SchemaError, SchemaRegistryConfig, SchemaVersion,
};
use crate::policy::NamespacePolicyStore;
use crate::topic::TopicName;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Durable append-only storage for registered schema versions, keyed by
/// topic.
///
/// The coordinator awaits the append before returning an accepted verdict,
/// so a caller never observes "accepted" for a version that was not durably
/// written.
#[async_trait]
pub trait SchemaStorage: Send + Sync {
    /// Durably append one version to the topic's record stream.
    async fn append(&self, topic: &TopicName, version: &SchemaVersion) -> Result<(), SchemaError>;
}

/// In-memory storage backend.
///
/// Keeps the serialized record form, so tests and embedded brokers see
/// exactly the bytes a durable log would receive.
#[derive(Debug, Default)]
pub struct MemorySchemaStorage {
    records: DashMap<String, Vec<Bytes>>,
}

impl MemorySchemaStorage {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records appended for a topic.
    pub fn appended(&self, topic: &TopicName) -> usize {
        self.records
            .get(&topic.to_string())
            .map(|records| records.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl SchemaStorage for MemorySchemaStorage {
    async fn append(&self, topic: &TopicName, version: &SchemaVersion) -> Result<(), SchemaError> {
        let value = serde_json::to_vec(version)
            .map_err(|e| SchemaError::SerializationError(e.to_string()))?;
        self.records
            .entry(topic.to_string())
            .or_default()
            .push(Bytes::from(value));
        Ok(())
    }
}

/// Registration coordinator: checks candidate schemas against each topic's
/// ledger and appends accepted versions atomically.
pub struct SchemaRegistry {
    /// Per-topic ledgers; the inner mutex is the per-topic critical section
    ledgers: DashMap<String, Arc<Mutex<SchemaLedger>>>,
    policies: Arc<dyn NamespacePolicyStore>,
    storage: Arc<dyn SchemaStorage>,
    checker: CompatibilityChecker,
    config: SchemaRegistryConfig,
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("topics", &self.ledgers.len())
            .field("config", &self.config)
            .finish()
    }
}

impl SchemaRegistry {
    /// Create a registry with injected policy and storage collaborators.
    pub fn new(
        config: SchemaRegistryConfig,
        policies: Arc<dyn NamespacePolicyStore>,
        storage: Arc<dyn SchemaStorage>,
    ) -> Self {
        Self {
            ledgers: DashMap::new(),
            policies,
            storage,
            checker: CompatibilityChecker::new(),
            config,
        }
    }

    /// Create a registry backed by in-memory storage and default config.
    pub fn in_memory(policies: Arc<dyn NamespacePolicyStore>) -> Self {
        Self::new(
            SchemaRegistryConfig::default(),
            policies,
            Arc::new(MemorySchemaStorage::new()),
        )
    }

    /// Resolve the compatibility strategy for a topic's namespace.
    ///
    /// A namespace with no configured policy fails closed to the registry's
    /// default strategy (UNDEFINED unless configured otherwise).
    pub fn resolve_strategy(&self, topic: &TopicName) -> CompatibilityStrategy {
        self.policies
            .strategy_for(&topic.namespace())
            .unwrap_or(self.config.default_strategy)
    }

    /// Check a candidate schema against the topic's history and append it on
    /// success.
    ///
    /// This is the sole entry point for producer connects, consumer
    /// subscriptions, and admin registration, so every ordering of clients
    /// observes the same verdict. The first registration on an empty ledger
    /// is accepted under every strategy and becomes sequence 0. Re-presenting
    /// the schema that is already current succeeds without appending. On
    /// rejection the ledger is unchanged.
    pub async fn check_and_register(
        &self,
        topic: &TopicName,
        candidate: SchemaData,
    ) -> Result<SchemaVersion, SchemaError> {
        let handle = self.ledger_handle(topic);
        let mut ledger = handle.lock().await;

        if let Some(current) = ledger.current() {
            if current.schema.same_definition(&candidate) {
                debug!(topic = %topic, version = current.version, "schema already current");
                return Ok(current.clone());
            }
        }

        if !ledger.is_empty() {
            let strategy = self.resolve_strategy(topic);
            let result = self.checker.check(ledger.all(), &candidate, strategy);
            if let Some(reason) = result.reason {
                debug!(topic = %topic, strategy = %strategy, %reason, "candidate schema rejected");
                return Err(SchemaError::IncompatibleSchema(reason));
            }
        }

        // Durable write first; the in-memory append only follows a
        // successful write, so a storage failure leaves the ledger unchanged.
        let version = SchemaVersion::new(ledger.next_version(), candidate);
        self.storage.append(topic, &version).await?;
        ledger.push(version.clone());

        info!(
            topic = %topic,
            version = version.version,
            type_tag = %version.schema.type_tag,
            "schema registered"
        );
        Ok(version)
    }

    /// The current (latest) registered version for a topic, if any.
    pub async fn current_version(&self, topic: &TopicName) -> Option<SchemaVersion> {
        let handle = self.existing_handle(topic)?;
        let ledger = handle.lock().await;
        ledger.current().cloned()
    }

    /// The full version history for a topic, oldest first.
    ///
    /// Errors if the topic has never seen a successful registration. A
    /// ledger created by a registration attempt that failed before its first
    /// append is indistinguishable from an absent one.
    pub async fn versions(&self, topic: &TopicName) -> Result<Vec<SchemaVersion>, SchemaError> {
        let handle = self
            .existing_handle(topic)
            .ok_or_else(|| SchemaError::TopicNotFound(topic.to_string()))?;
        let ledger = handle.lock().await;
        if ledger.is_empty() {
            return Err(SchemaError::TopicNotFound(topic.to_string()));
        }
        Ok(ledger.all().to_vec())
    }

    fn ledger_handle(&self, topic: &TopicName) -> Arc<Mutex<SchemaLedger>> {
        self.ledgers
            .entry(topic.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SchemaLedger::new(topic.clone()))))
            .clone()
    }

    // Clone the Arc out so no map guard is held across an await.
    fn existing_handle(&self, topic: &TopicName) -> Option<Arc<Mutex<SchemaLedger>>> {
        self.ledgers
            .get(&topic.to_string())
            .map(|entry| entry.value().clone())
    }
}
