//! stackforge provisioning engine abstraction
//!
//! Stack definitions never create anything themselves. They hand resource
//! descriptors to a [`ProvisioningEngine`], which owns ordering, diffing and
//! every conversation with the remote control plane.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 stackforge CLI                   │
//! │             (stackforge synth/list)              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                stackforge-core                   │
//! │        App / AppStack / resource models          │
//! └─────────────────┬───────────────────────────────┘
//!                   │ ResourceConfig, ExportedValue
//! ┌─────────────────▼───────────────────────────────┐
//! │                stackforge-cloud                  │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait ProvisioningEngine { ... }        │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐                               │
//! │  │ SynthEngine  │ -> Assembly -> JSON / YAML    │
//! │  └──────────────┘                               │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod engine;
pub mod error;
pub mod resource;
pub mod synth;

// Re-exports
pub use engine::{ExportedValue, ProvisioningEngine, StackProps};
pub use error::{CloudError, Result};
pub use resource::{Reference, ResourceConfig, ResourceSet};
pub use synth::{Assembly, StackTemplate, SynthEngine};
