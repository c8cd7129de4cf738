use cuff_types::{Dimension, FeatureKind, PropValue};
use model_engine::{Container, ModelEngine};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::catalog::SelectionCatalog;
use crate::graph::{ConstructionGraph, GraphBuilder};
use crate::registry::IdentifierRegistry;
use crate::submit::{submit, SubmitReport};
use crate::types::GraphError;
use crate::Identifier;

/// A declared input parameter of a primitive and its literal default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParameter {
    pub name: String,
    pub default: String,
}

impl TemplateParameter {
    pub fn new(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
        }
    }
}

/// A primitive's construction graph, built once against its own registry.
///
/// The catalog is the template's public interface: instances address its
/// entries by position.
#[derive(Debug, Clone)]
pub struct PrimitiveTemplate {
    pseudonym: String,
    parameters: Vec<TemplateParameter>,
    registry: IdentifierRegistry,
    catalog: SelectionCatalog,
    graph: ConstructionGraph,
}

impl PrimitiveTemplate {
    /// Run `recipe` in a fresh registry scope.
    ///
    /// Returns `Ok(None)` when the recipe bound no label at all; such a
    /// result must never be instantiated.
    pub fn build<F>(
        pseudonym: &str,
        parameters: Vec<TemplateParameter>,
        recipe: F,
    ) -> Result<Option<Self>, GraphError>
    where
        F: FnOnce(&mut GraphBuilder<'_>) -> Result<SelectionCatalog, GraphError>,
    {
        let mut registry = IdentifierRegistry::new();
        let (catalog, graph) = {
            let mut builder = GraphBuilder::new(&mut registry);
            let catalog = recipe(&mut builder)?;
            (catalog, builder.finish()?)
        };

        if registry.count() == 0 {
            debug!(pseudonym, "template builder registered nothing");
            return Ok(None);
        }

        Ok(Some(Self {
            pseudonym: pseudonym.to_string(),
            parameters,
            registry,
            catalog,
            graph,
        }))
    }

    pub fn pseudonym(&self) -> &str {
        &self.pseudonym
    }

    pub fn parameters(&self) -> &[TemplateParameter] {
        &self.parameters
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    pub fn registry(&self) -> &IdentifierRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &SelectionCatalog {
        &self.catalog
    }

    pub fn graph(&self) -> &ConstructionGraph {
        &self.graph
    }

    /// Create the part `part_id`, declare its input parameters with their
    /// defaults, emit the graph into the part and run it.
    #[instrument(skip(self, engine), fields(pseudonym = %self.pseudonym))]
    pub fn emit(
        &self,
        part_id: &Identifier,
        engine: &mut dyn ModelEngine,
    ) -> Result<SubmitReport, GraphError> {
        let id = part_id.as_str();
        engine.create(&Container::Model, id, FeatureKind::Part, Some(Dimension::Volumes))?;
        engine.label(&Container::Model, id, &self.pseudonym)?;
        for param in &self.parameters {
            engine.set_entry(
                &Container::Model,
                id,
                "inputParam",
                &param.name,
                PropValue::expr(param.default.as_str()),
            )?;
        }

        let at = Container::part(id);
        let report = submit(&self.graph, &at, engine)?;
        engine.run(&at)?;
        Ok(report)
    }
}
