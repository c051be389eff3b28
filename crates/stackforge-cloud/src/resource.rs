//! Resource descriptors handed to a provisioning engine

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deferred value owned by a declared resource.
///
/// The value only exists once the engine has materialised the resource,
/// so at declaration time it is carried around as `resource.attribute`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Logical id of the resource that owns the attribute
    #[serde(rename = "ref")]
    pub resource_id: String,

    /// Attribute name (e.g., "bucket_name", "instance_id")
    pub attribute: String,
}

impl Reference {
    pub fn new(resource_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            attribute: attribute.into(),
        }
    }

    /// Reference to the primary identifier of a resource
    pub fn primary(resource_id: impl Into<String>) -> Self {
        Self::new(resource_id, "id")
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}}}", self.resource_id, self.attribute)
    }
}

/// Configuration for a single declared resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type (e.g., "storage.container", "network.vpc")
    pub resource_type: String,

    /// Logical identifier, unique within a stack
    pub id: String,

    /// Provider name
    pub provider: String,

    /// Resource-specific configuration
    pub config: serde_json::Value,

    /// Logical ids this resource must be created after
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        provider: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            provider: provider.into(),
            config,
            depends_on: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    /// Get the full resource key (type:id)
    pub fn key(&self) -> String {
        format!("{}:{}", self.resource_type, self.id)
    }

    /// Get a configuration value as a specific type
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Ordered set of resources declared in one stack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceSet {
    resources: Vec<ResourceConfig>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resource, rejecting a logical id that is already taken
    pub fn add(&mut self, resource: ResourceConfig) -> Result<()> {
        if self.contains(&resource.id) {
            return Err(CloudError::DuplicateResource(resource.id));
        }
        self.resources.push(resource);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resources.iter().any(|r| r.id == id)
    }

    pub fn get(&self, resource_type: &str, id: &str) -> Option<&ResourceConfig> {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type && r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.iter()
    }

    pub fn by_type(&self, resource_type: &str) -> Vec<&ResourceConfig> {
        self.resources
            .iter()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
