use cuff_types::{FeatureKind, KeepFlags, PrimitiveKind};
use feature_graph::{GraphBuilder, GraphError};

use crate::definition::PrimitiveDefinition;

pub static DEFINITION: PrimitiveDefinition = PrimitiveDefinition {
    kind: PrimitiveKind::CuffFill,
    parameters: &[
        ("Radius", "0.5 [mm]"),
        ("Thk", "100 [um]"),
        ("L", "2.5 [mm]"),
        ("Center", "0"),
        ("x_shift", "0"),
        ("y_shift", "0"),
    ],
    catalog: &[("CUFF FILL FINAL", KeepFlags::DOMAIN)],
    point_source: None,
    recipe: build_cuff_fill,
};

/// Saline filling the lumen of a cuff.
pub fn build_cuff_fill(g: &mut GraphBuilder<'_>) -> Result<(), GraphError> {
    g.feature(FeatureKind::Cylinder, "Cuff Fill")
        .set("pos", ["x_shift", "y_shift", "Center-(L/2)"])
        .set("r", "Radius")
        .set("h", "L")
        .contribute_to("CUFF FILL FINAL")
        .finish()?;
    Ok(())
}
