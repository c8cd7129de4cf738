use cuff_types::{FeatureKind, KeepFlags, PrimitiveKind};
use feature_graph::{GraphBuilder, GraphError};

use crate::definition::PrimitiveDefinition;

pub static DEFINITION: PrimitiveDefinition = PrimitiveDefinition {
    kind: PrimitiveKind::WireContact,
    parameters: &[
        ("Wire_r", "37.5 [um]"),
        ("R_in", "250 [um]"),
        ("Center", "10 [mm]"),
        ("Pitch", "1 [mm]"),
        ("Wire_sep", "10 [um]"),
        ("Wire_theta", "250 [deg]"),
    ],
    catalog: &[
        ("CONTACT CROSS SECTION", KeepFlags::NONE),
        ("CONTACT FINAL", KeepFlags::DOMAIN),
        ("SRC", KeepFlags::POINT),
    ],
    point_source: Some(2),
    recipe: build_wire_contact,
};

/// Round wire bent around the nerve, with a source point at mid-arc.
pub fn build_wire_contact(g: &mut GraphBuilder<'_>) -> Result<(), GraphError> {
    g.work_plane("Contact Cross Section")
        .set("quickplane", "zx")
        .set("unite", true)
        .contribute_to("CONTACT CROSS SECTION")
        .body(|wp| {
            wp.selection("CONTACT CROSS SECTION")?;
            wp.feature(FeatureKind::Circle, "Contact Cross Section")
                .set("pos", ["Center", "R_in-Wire_r-Wire_sep"])
                .set("r", "Wire_r")
                .contribute_to("CONTACT CROSS SECTION")
                .finish()?;
            Ok(())
        })
        .finish()?;

    g.feature(FeatureKind::Revolve, "Make Contact")
        .set("angle2", "Wire_theta")
        .set("axis", ["1", "0"])
        .input("input", "CONTACT CROSS SECTION")
        .contribute_to("CONTACT FINAL")
        .finish()?;

    g.feature(FeatureKind::Point, "Src")
        .set(
            "p",
            [
                "(R_in-Wire_r-Wire_sep)*cos(Wire_theta/2)",
                "(R_in-Wire_r-Wire_sep)*sin(Wire_theta/2)",
                "Center",
            ],
        )
        .contribute_to("SRC")
        .finish()?;
    Ok(())
}
