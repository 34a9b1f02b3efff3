//! Namespace compatibility policy
//!
//! The compatibility strategy is configured per namespace through the admin
//! surface and owned outside the checker. The registry queries an injected
//! store, which keeps the core testable with a fake policy source.

use crate::schema::CompatibilityStrategy;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Externally owned per-namespace compatibility policy.
pub trait NamespacePolicyStore: Send + Sync {
    /// The strategy configured for `namespace`, if any.
    ///
    /// Returning `None` is not an error; the registry fails closed to its
    /// default strategy.
    fn strategy_for(&self, namespace: &str) -> Option<CompatibilityStrategy>;
}

/// In-memory policy store, written through the admin surface.
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    strategies: RwLock<HashMap<String, CompatibilityStrategy>>,
}

impl MemoryPolicyStore {
    /// Create an empty policy store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy for a namespace (admin operation).
    pub fn set_strategy(&self, namespace: impl Into<String>, strategy: CompatibilityStrategy) {
        self.strategies.write().insert(namespace.into(), strategy);
    }

    /// Clear the namespace policy, reverting it to the registry default.
    pub fn clear_strategy(&self, namespace: &str) {
        self.strategies.write().remove(namespace);
    }
}

impl NamespacePolicyStore for MemoryPolicyStore {
    fn strategy_for(&self, namespace: &str) -> Option<CompatibilityStrategy> {
        self.strategies.read().get(namespace).copied()
    }
}
