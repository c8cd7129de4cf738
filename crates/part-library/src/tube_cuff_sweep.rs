use cuff_types::{FeatureKind, KeepFlags, PrimitiveKind};
use feature_graph::{GraphBuilder, GraphError};

use crate::definition::PrimitiveDefinition;

pub static DEFINITION: PrimitiveDefinition = PrimitiveDefinition {
    kind: PrimitiveKind::TubeCuffSweep,
    parameters: &[
        ("Cuff_thk", "0.1 [mm]"),
        ("Cuff_z", "3 [mm]"),
        ("R_in", "1 [mm]"),
        ("Center", "10 [mm]"),
        ("Cuff_theta", "300 [deg]"),
        ("Rot_def", "0 [deg]"),
    ],
    catalog: &[
        ("CUFF CROSS SECTION", KeepFlags::NONE),
        ("CUFF FINAL", KeepFlags::DOMAIN),
    ],
    point_source: None,
    recipe: build_tube_cuff_sweep,
};

/// Partial tube revolved from a rectangular cross section.
pub fn build_tube_cuff_sweep(g: &mut GraphBuilder<'_>) -> Result<(), GraphError> {
    g.work_plane("Cuff Cross Section")
        .set("quickplane", "xz")
        .set("unite", true)
        .contribute_to("CUFF CROSS SECTION")
        .body(|wp| {
            wp.feature(FeatureKind::Rectangle, "Cuff Cross Section")
                .set("pos", ["R_in+Cuff_thk/2", "Center"])
                .set("base", "center")
                .set("size", ["Cuff_thk", "Cuff_z"])
                .finish()?;
            Ok(())
        })
        .finish()?;

    g.feature(FeatureKind::Revolve, "Make Cuff")
        .set("angle1", "Rot_def")
        .set("angle2", "Rot_def+Cuff_theta")
        .input("input", "CUFF CROSS SECTION")
        .contribute_to("CUFF FINAL")
        .finish()?;
    Ok(())
}
