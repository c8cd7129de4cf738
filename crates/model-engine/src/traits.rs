use cuff_types::{Dimension, FeatureKind, PropValue};

use crate::types::{Container, EngineError};

/// Sink of identifier-tagged commands for the external modeling engine.
///
/// The build never reads geometry back; the only query is whether a named
/// selection exists. Implemented by the engine bridge and by
/// `RecordingEngine` (deterministic test double).
pub trait ModelEngine {
    /// Create a feature `id` of `kind` in `at`.
    fn create(
        &mut self,
        at: &Container,
        id: &str,
        kind: FeatureKind,
        dim: Option<Dimension>,
    ) -> Result<(), EngineError>;

    /// Attach a human-readable label to a feature.
    fn label(&mut self, at: &Container, id: &str, text: &str) -> Result<(), EngineError>;

    /// Set a scalar property on a feature.
    fn set(
        &mut self,
        at: &Container,
        id: &str,
        property: &str,
        value: PropValue,
    ) -> Result<(), EngineError>;

    /// Set one keyed entry of a table-like property (`inputexpr`, `selkeepdom`, ...).
    fn set_entry(
        &mut self,
        at: &Container,
        id: &str,
        property: &str,
        key: &str,
        value: PropValue,
    ) -> Result<(), EngineError>;

    /// Point an input of a feature at a named selection. `input` is `None`
    /// for features with a single implicit selection (physics, materials).
    fn select_named(
        &mut self,
        at: &Container,
        id: &str,
        input: Option<&str>,
        selection: &str,
    ) -> Result<(), EngineError>;

    /// Whether a named selection currently exists in the document.
    fn has_selection(&self, name: &str) -> bool;

    /// Run the feature sequence of `at`.
    fn run(&mut self, at: &Container) -> Result<(), EngineError>;
}
