use cuff_types::{FeatureKind, KeepFlags, PrimitiveKind};
use feature_graph::{GraphBuilder, GraphError};

use crate::definition::PrimitiveDefinition;

pub const MEDIUM: &str = "MEDIUM";

/// Cylindrical surrounding medium. Instances keep both the volume and its
/// outer boundary so a distant ground can be placed on it.
pub static DEFINITION: PrimitiveDefinition = PrimitiveDefinition {
    kind: PrimitiveKind::Medium,
    parameters: &[("radius", "10 [mm]"), ("length", "100 [mm]")],
    catalog: &[(MEDIUM, KeepFlags::DOMAIN_AND_BOUNDARY)],
    point_source: None,
    recipe: build_medium,
};

pub fn build_medium(g: &mut GraphBuilder<'_>) -> Result<(), GraphError> {
    g.feature(FeatureKind::Cylinder, "Medium")
        .set("r", "radius")
        .set("h", "length")
        .contribute_to(MEDIUM)
        .finish()?;
    Ok(())
}
