use cuff_types::{KeepFlags, PrimitiveKind};
use feature_graph::{GraphBuilder, GraphError, PrimitiveTemplate, TemplateParameter};
use tracing::debug;

use crate::{
    circle_contact, cuff_fill, helical_cuffn_contact, medium, rectangle_contact, ribbon_contact,
    tube_cuff, tube_cuff_sweep, wire_contact,
};

/// Construction steps of a primitive, run after its catalog is declared.
pub type Recipe = fn(&mut GraphBuilder<'_>) -> Result<(), GraphError>;

/// Everything needed to build one primitive kind: declared parameters with
/// defaults, the ordered catalog with its import policy, and the recipe.
pub struct PrimitiveDefinition {
    pub kind: PrimitiveKind,
    pub parameters: &'static [(&'static str, &'static str)],
    pub catalog: &'static [(&'static str, KeepFlags)],
    /// Catalog index whose points carry the instance's current source.
    pub point_source: Option<usize>,
    pub recipe: Recipe,
}

impl PrimitiveDefinition {
    pub fn pseudonym(&self) -> &'static str {
        self.kind.pseudonym()
    }

    pub fn template_parameters(&self) -> Vec<TemplateParameter> {
        self.parameters
            .iter()
            .map(|(name, default)| TemplateParameter::new(*name, *default))
            .collect()
    }

    /// Declared keep policy, aligned with the catalog.
    pub fn keep_vector(&self) -> Vec<KeepFlags> {
        self.catalog.iter().map(|(_, keep)| *keep).collect()
    }

    /// Declare the catalog, then run the recipe, in a fresh scope.
    pub fn build(&self) -> Result<Option<PrimitiveTemplate>, GraphError> {
        let recipe = self.recipe;
        let catalog = self.catalog;
        let template = PrimitiveTemplate::build(self.pseudonym(), self.template_parameters(), |g| {
            let declared = g.declare_catalog(catalog.iter().copied())?;
            recipe(g)?;
            Ok(declared)
        })?;
        if let Some(t) = &template {
            debug!(
                pseudonym = self.pseudonym(),
                steps = t.graph().len(),
                labels = t.registry().count(),
                "primitive template built"
            );
        }
        Ok(template)
    }
}

/// Definition of a supported primitive kind.
pub fn definition(kind: PrimitiveKind) -> &'static PrimitiveDefinition {
    match kind {
        PrimitiveKind::Medium => &medium::DEFINITION,
        PrimitiveKind::TubeCuff => &tube_cuff::DEFINITION,
        PrimitiveKind::TubeCuffSweep => &tube_cuff_sweep::DEFINITION,
        PrimitiveKind::RibbonContact => &ribbon_contact::DEFINITION,
        PrimitiveKind::WireContact => &wire_contact::DEFINITION,
        PrimitiveKind::CircleContact => &circle_contact::DEFINITION,
        PrimitiveKind::CuffFill => &cuff_fill::DEFINITION,
        PrimitiveKind::HelicalCuffnContact => &helical_cuffn_contact::DEFINITION,
        PrimitiveKind::RectangleContact => &rectangle_contact::DEFINITION,
    }
}

/// Definition by pseudonym; `None` outside the closed vocabulary.
pub fn lookup(pseudonym: &str) -> Option<&'static PrimitiveDefinition> {
    PrimitiveKind::from_pseudonym(pseudonym).map(definition)
}
