use cuff_types::KeepFlags;
use feature_graph::{GraphError, Identifier, RegistryError};
use model_engine::EngineError;
use serde::{Deserialize, Serialize};

/// Configuration document problems, detected before anything is emitted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{context}: '{first}' and '{second}' are mutually exclusive")]
    AmbiguousConfiguration {
        context: String,
        first: String,
        second: String,
    },

    #[error("{context}: missing required value '{key}'")]
    MissingRequiredConfiguration { context: String, key: String },

    #[error("invalid configuration document: {reason}")]
    Parse { reason: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse {
            reason: err.to_string(),
        }
    }
}

/// Errors from assembling the shared document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssemblyError {
    #[error("unsupported primitive '{pseudonym}'")]
    UnsupportedPrimitive { pseudonym: String },

    #[error("no template was built for '{pseudonym}'")]
    MissingTemplate { pseudonym: String },

    #[error("instance {instance}: keep vector has {found} entries, catalog has {expected}")]
    KeepVectorMismatch {
        instance: String,
        expected: usize,
        found: usize,
    },

    #[error("instance {instance}: selection '{selection}' must retain its {level}")]
    SelectionNotRetained {
        instance: String,
        selection: String,
        level: &'static str,
    },

    #[error("no instance labelled '{label}'")]
    UnknownInstance { label: String },

    #[error("template {pseudonym} has no selection '{selection}'")]
    MissingSelection { pseudonym: String, selection: String },

    #[error("material link '{label}' requested twice")]
    DuplicateMaterialLink { label: String },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// An instance placed into the shared geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub id: Identifier,
    pub label: String,
    pub pseudonym: String,
    /// Environment parts (the medium) are not cuff components.
    pub environment: bool,
    /// Effective keep flags, aligned with the template catalog.
    pub keep: Vec<KeepFlags>,
    /// Shared labels bound for retained selections, in catalog order.
    pub retained: Vec<String>,
    pub point_source: Option<Identifier>,
}

/// A point current source tied to a contact instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSource {
    /// Instance label.
    pub name: String,
    pub pcs: Identifier,
    pub cuff_index: Option<usize>,
}

/// A defined model-level material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub id: Identifier,
    pub function: String,
    pub description: String,
}

/// A material link created for one retained domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLinkRecord {
    pub id: Identifier,
    pub label: String,
    pub material: Identifier,
    pub selection: String,
}

/// Outcome of linking one instance's materials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkReport {
    pub linked: Vec<Identifier>,
    /// Catalog labels whose domain was discarded at bind time.
    pub skipped: Vec<String>,
}

/// A nerve part built into the shared geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NerveRecord {
    pub kind: cuff_types::NervePartKind,
    /// Catalog labels in declaration order.
    pub selections: Vec<String>,
    pub contact_impedance: Option<Identifier>,
}
