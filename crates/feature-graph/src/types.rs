use crate::registry::Identifier;

/// Label-map failures. Each indicates a wiring defect in a recipe.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("label '{label}' is already bound to {existing}")]
    DuplicateLabel { label: String, existing: Identifier },

    #[error("label '{label}' was never bound")]
    UnknownLabel { label: String },

    #[error("identifier {identifier} is already taken, cannot bind '{label}'")]
    DuplicateIdentifier { identifier: Identifier, label: String },

    #[error("invalid identifier prefix '{prefix}': must be non-empty and not end in a digit")]
    InvalidPrefix { prefix: String },
}

/// Errors from building or submitting a construction graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("step {step} consumes {identifier}, which no earlier step produced")]
    ForwardReference { step: Identifier, identifier: Identifier },

    #[error("unbalanced branch at {at}: {reason}")]
    UnbalancedBranch { at: String, reason: String },

    #[error("catalog index {index} out of range (catalog has {count} entries)")]
    CatalogIndexOutOfRange { index: usize, count: usize },

    #[error("engine error: {0}")]
    Engine(#[from] model_engine::EngineError),
}
