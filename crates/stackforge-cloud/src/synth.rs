//! In-process engine that records declarations as a template
//!
//! `SynthEngine` stops where a real engine would start talking to a control
//! plane: it validates the graph it is handed and keeps it as an
//! [`Assembly`] that can be rendered to JSON or YAML.

use crate::engine::{ExportedValue, ProvisioningEngine, StackProps};
use crate::error::{CloudError, Result};
use crate::resource::{Reference, ResourceConfig, ResourceSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const ENGINE_NAME: &str = "synth";
const TEMPLATE_VERSION: u32 = 1;

/// Every stack recorded by a [`SynthEngine`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub stacks: Vec<StackTemplate>,
}

impl Assembly {
    pub fn stack(&self, stack_id: &str) -> Option<&StackTemplate> {
        self.stacks.iter().find(|s| s.stack_id == stack_id)
    }

    fn stack_mut(&mut self, stack_id: &str) -> Result<&mut StackTemplate> {
        self.stacks
            .iter_mut()
            .find(|s| s.stack_id == stack_id)
            .ok_or_else(|| CloudError::StackNotFound(stack_id.to_string()))
    }
}

/// Declarative description of one stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackTemplate {
    /// Template format version
    pub version: u32,

    pub stack_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default)]
    pub termination_protection: bool,

    pub resources: ResourceSet,

    #[serde(default)]
    pub outputs: Vec<ExportedValue>,
}

impl StackTemplate {
    fn new(stack_id: &str, props: &StackProps) -> Self {
        Self {
            version: TEMPLATE_VERSION,
            stack_id: stack_id.to_string(),
            description: props.description.clone(),
            tags: props.tags.clone(),
            termination_protection: props.termination_protection,
            resources: ResourceSet::new(),
            outputs: Vec::new(),
        }
    }

    pub fn output(&self, name: &str) -> Option<&ExportedValue> {
        self.outputs.iter().find(|o| o.name == name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Engine that synthesises templates instead of creating resources
#[derive(Debug, Default)]
pub struct SynthEngine {
    assembly: Assembly,
}

impl SynthEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    pub fn into_assembly(self) -> Assembly {
        self.assembly
    }
}

impl ProvisioningEngine for SynthEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn open_stack(&mut self, stack_id: &str, props: &StackProps) -> Result<()> {
        if self.assembly.stack(stack_id).is_some() {
            return Err(CloudError::DuplicateStack(stack_id.to_string()));
        }
        self.assembly.stacks.push(StackTemplate::new(stack_id, props));
        tracing::debug!("Opened stack: {}", stack_id);
        Ok(())
    }

    fn construct(&mut self, stack_id: &str, resource: ResourceConfig) -> Result<Reference> {
        let stack = self.assembly.stack_mut(stack_id)?;

        if let Some(missing) = resource
            .depends_on
            .iter()
            .find(|dep| !stack.resources.contains(dep))
        {
            return Err(CloudError::UnknownReference(format!(
                "{} depends on undeclared resource {}",
                resource.id, missing
            )));
        }

        let reference = Reference::primary(&resource.id);
        tracing::debug!("Declared {} in stack {}", resource.key(), stack_id);
        stack.resources.add(resource)?;
        Ok(reference)
    }

    fn export_value(&mut self, stack_id: &str, output: ExportedValue) -> Result<()> {
        let stack = self.assembly.stack_mut(stack_id)?;

        if stack.output(&output.name).is_some() {
            return Err(CloudError::DuplicateOutput(output.name));
        }
        if !stack.resources.contains(&output.value.resource_id) {
            return Err(CloudError::UnknownReference(output.value.to_string()));
        }

        tracing::debug!("Exported {} = {}", output.name, output.value);
        stack.outputs.push(output);
        Ok(())
    }

    fn discard_stack(&mut self, stack_id: &str) {
        let before = self.assembly.stacks.len();
        self.assembly.stacks.retain(|s| s.stack_id != stack_id);
        if self.assembly.stacks.len() < before {
            tracing::debug!("Discarded stack: {}", stack_id);
        }
    }
}
