//! Topic naming
//!
//! Topics are identified as `domain://tenant/namespace/local-name`. Short
//! forms are expanded the way the broker expands them: a schemeless
//! `tenant/namespace/local` defaults to the persistent domain, and a bare
//! local name lands in `public/default`.

use crate::schema::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Topic persistence domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TopicDomain {
    #[default]
    Persistent,
    NonPersistent,
}

impl fmt::Display for TopicDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicDomain::Persistent => write!(f, "persistent"),
            TopicDomain::NonPersistent => write!(f, "non-persistent"),
        }
    }
}

impl FromStr for TopicDomain {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "persistent" => Ok(TopicDomain::Persistent),
            "non-persistent" => Ok(TopicDomain::NonPersistent),
            _ => Err(SchemaError::InvalidTopicName(format!(
                "unknown domain '{}'",
                s
            ))),
        }
    }
}

/// Fully qualified topic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicName {
    domain: TopicDomain,
    tenant: String,
    namespace: String,
    local: String,
}

impl TopicName {
    /// Build a fully qualified topic name from its parts.
    pub fn new(
        domain: TopicDomain,
        tenant: impl Into<String>,
        namespace: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        Self {
            domain,
            tenant: tenant.into(),
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    pub fn domain(&self) -> TopicDomain {
        self.domain
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// The `tenant/namespace` key compatibility policies are resolved under.
    pub fn namespace(&self) -> String {
        format!("{}/{}", self.tenant, self.namespace)
    }

    /// The topic's local name within its namespace.
    pub fn local(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}/{}/{}",
            self.domain, self.tenant, self.namespace, self.local
        )
    }
}

impl FromStr for TopicName {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, rest) = match s.split_once("://") {
            Some((scheme, rest)) => (scheme.parse::<TopicDomain>()?, rest),
            None => (TopicDomain::Persistent, s),
        };

        let parts: Vec<&str> = rest.split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(SchemaError::InvalidTopicName(s.to_string()));
        }

        match parts.as_slice() {
            [tenant, namespace, local] => {
                Ok(TopicName::new(domain, *tenant, *namespace, *local))
            }
            [local] => Ok(TopicName::new(domain, "public", "default", *local)),
            _ => Err(SchemaError::InvalidTopicName(s.to_string())),
        }
    }
}
