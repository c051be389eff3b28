//! Provisioning engine trait definition

use crate::error::Result;
use crate::resource::{Reference, ResourceConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provisioning engine abstraction trait
///
/// A stack definition only describes resources. Everything past that point
/// (ordering, diffing, talking to the control plane) belongs to the engine
/// behind this trait.
pub trait ProvisioningEngine: Send {
    /// Returns the engine name (e.g., "synth")
    fn name(&self) -> &str;

    /// Start collecting declarations for a new stack
    fn open_stack(&mut self, stack_id: &str, props: &StackProps) -> Result<()>;

    /// Register a resource and return a reference to its primary identifier
    fn construct(&mut self, stack_id: &str, resource: ResourceConfig) -> Result<Reference>;

    /// Register a value to be published once the stack has been applied
    fn export_value(&mut self, stack_id: &str, output: ExportedValue) -> Result<()>;

    /// Drop everything declared for a stack that failed part-way
    fn discard_stack(&mut self, stack_id: &str);
}

/// Base configuration shared by every deployable stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackProps {
    /// Human readable description
    pub description: Option<String>,

    /// Tags recorded on the stack template for the engine to propagate
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Refuse stack deletion while enabled
    #[serde(default)]
    pub termination_protection: bool,
}

impl StackProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Named value published after apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedValue {
    /// Output name, unique within a stack
    pub name: String,

    /// Deferred value
    pub value: Reference,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExportedValue {
    pub fn new(name: impl Into<String>, value: Reference) -> Self {
        Self {
            name: name.into(),
            value,
            description: None,
        }
    }
}
