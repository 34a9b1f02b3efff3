//! Connection-facing schema gate
//!
//! A producer creating with a schema, a consumer subscribing with a schema,
//! and explicit registration through the admin surface all funnel through
//! the same registry check, which is why every ordering of clients observes
//! the same incompatibility verdict regardless of which side registered
//! first.

use crate::schema::registry::SchemaRegistry;
use crate::schema::{SchemaData, SchemaError, SchemaVersion};
use crate::topic::TopicName;
use std::sync::Arc;
use tracing::{debug, info};

/// Thin facade between connection handling and the schema registry.
#[derive(Debug, Clone)]
pub struct TopicSchemaService {
    registry: Arc<SchemaRegistry>,
}

impl TopicSchemaService {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Gate a producer connecting to a topic.
    ///
    /// A schemaless producer passes through without touching the ledger.
    pub async fn on_producer_connect(
        &self,
        topic: &TopicName,
        schema: Option<SchemaData>,
    ) -> Result<Option<SchemaVersion>, SchemaError> {
        match schema {
            None => {
                debug!(topic = %topic, "schemaless producer connected");
                Ok(None)
            }
            Some(schema) => {
                let version = self.registry.check_and_register(topic, schema).await?;
                info!(
                    topic = %topic,
                    version = version.version,
                    "producer connected with schema"
                );
                Ok(Some(version))
            }
        }
    }

    /// Gate a consumer subscription on a topic.
    pub async fn on_consumer_subscribe(
        &self,
        topic: &TopicName,
        subscription: &str,
        schema: Option<SchemaData>,
    ) -> Result<Option<SchemaVersion>, SchemaError> {
        match schema {
            None => {
                debug!(topic = %topic, subscription, "schemaless consumer subscribed");
                Ok(None)
            }
            Some(schema) => {
                let version = self.registry.check_and_register(topic, schema).await?;
                info!(
                    topic = %topic,
                    subscription,
                    version = version.version,
                    "consumer subscribed with schema"
                );
                Ok(Some(version))
            }
        }
    }

    /// Explicit schema registration through the admin surface.
    pub async fn register(
        &self,
        topic: &TopicName,
        schema: SchemaData,
    ) -> Result<SchemaVersion, SchemaError> {
        self.registry.check_and_register(topic, schema).await
    }
}
