use cuff_types::{FeatureKind, KeepFlags, PrimitiveKind};
use feature_graph::{GraphBuilder, GraphError};

use crate::definition::PrimitiveDefinition;

pub static DEFINITION: PrimitiveDefinition = PrimitiveDefinition {
    kind: PrimitiveKind::RibbonContact,
    parameters: &[
        ("Ribbon_thk", "0.1 [mm]"),
        ("Ribbon_z", "3 [mm]"),
        ("R_in", "1 [mm]"),
        ("Ribbon_recess", "0.1 [mm]"),
        ("Center", "10 [mm]"),
        ("Ribbon_theta", "100 [deg]"),
        ("Rot_def", "0 [deg]"),
    ],
    catalog: &[
        ("CONTACT CROSS SECTION", KeepFlags::NONE),
        ("RECESS CROSS SECTION", KeepFlags::NONE),
        ("SRC", KeepFlags::POINT),
        ("CONTACT FINAL", KeepFlags::DOMAIN),
        ("RECESS FINAL", KeepFlags::DOMAIN),
    ],
    point_source: Some(2),
    recipe: build_ribbon_contact,
};

/// Curved ribbon contact, optionally sitting in a recess of the cuff wall.
pub fn build_ribbon_contact(g: &mut GraphBuilder<'_>) -> Result<(), GraphError> {
    g.work_plane("Contact Cross Section")
        .set("quickplane", "xz")
        .set("unite", true)
        .contribute_to("CONTACT CROSS SECTION")
        .body(|wp| {
            wp.feature(FeatureKind::Rectangle, "Contact Cross Section")
                .set("pos", ["R_in+Ribbon_recess+Ribbon_thk/2", "Center"])
                .set("base", "center")
                .set("size", ["Ribbon_thk", "Ribbon_z"])
                .finish()?;
            Ok(())
        })
        .finish()?;

    g.feature(FeatureKind::Revolve, "Make Contact")
        .set("angle1", "Rot_def")
        .set("angle2", "Rot_def+Ribbon_theta")
        .input("input", "CONTACT CROSS SECTION")
        .contribute_to("CONTACT FINAL")
        .finish()?;

    g.begin_if("IF RECESS", "Ribbon_recess>0")?;
    g.work_plane("Recess Cross Section 1")
        .set("quickplane", "xz")
        .set("unite", true)
        .contribute_to("RECESS CROSS SECTION")
        .body(|wp| {
            wp.selection("wp RECESS CROSS SECTION")?;
            wp.feature(FeatureKind::Rectangle, "Recess Cross Section")
                .set("pos", ["R_in+Ribbon_recess/2", "Center"])
                .set("base", "center")
                .set("size", ["Ribbon_recess", "Ribbon_z"])
                .contribute_to("wp RECESS CROSS SECTION")
                .finish()?;
            Ok(())
        })
        .finish()?;
    g.feature(FeatureKind::Revolve, "Make Recess")
        .set("angle1", "Rot_def")
        .set("angle2", "Rot_def+Ribbon_theta")
        .input("input", "RECESS CROSS SECTION")
        .contribute_to("RECESS FINAL")
        .finish()?;
    g.end_if(None)?;

    g.feature(FeatureKind::Point, "Src")
        .set(
            "p",
            [
                "(R_in+Ribbon_recess+Ribbon_thk/2)*cos(Rot_def+Ribbon_theta/2)",
                "(R_in+Ribbon_recess+Ribbon_thk/2)*sin(Rot_def+Ribbon_theta/2)",
                "Center",
            ],
        )
        .contribute_to("SRC")
        .finish()?;
    Ok(())
}
