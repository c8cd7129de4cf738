use cuff_types::{FeatureKind, KeepFlags, PrimitiveKind};
use feature_graph::{GraphBuilder, GraphError};

use crate::definition::PrimitiveDefinition;

pub static DEFINITION: PrimitiveDefinition = PrimitiveDefinition {
    kind: PrimitiveKind::TubeCuff,
    parameters: &[
        ("N_holes", "0"),
        ("Tube_theta", "340 [deg]"),
        ("Center", "10 [mm]"),
        ("R_in", "1 [mm]"),
        ("R_out", "2 [mm]"),
        ("Tube_L", "5 [mm]"),
        ("Rot_def", "0 [deg]"),
        ("D_hole", "0.3 [mm]"),
        ("Buffer_hole", "0.1 [mm]"),
        ("L_holecenter_cuffseam", "0.3 [mm]"),
        ("Pitch_holecenter_holecenter", "0 [mm]"),
    ],
    catalog: &[
        ("INNER CUFF SURFACE", KeepFlags::NONE),
        ("OUTER CUFF SURFACE", KeepFlags::NONE),
        ("CUFF FINAL", KeepFlags::DOMAIN),
        ("CUFF wGAP PRE HOLES", KeepFlags::NONE),
        ("CUFF PRE GAP", KeepFlags::NONE),
        ("CUFF PRE GAP PRE HOLES", KeepFlags::NONE),
        ("CUFF GAP CROSS SECTION", KeepFlags::NONE),
        ("CUFF GAP", KeepFlags::NONE),
        ("CUFF PRE HOLES", KeepFlags::NONE),
        ("HOLE 1", KeepFlags::NONE),
        ("HOLE 2", KeepFlags::NONE),
        ("HOLES", KeepFlags::NONE),
    ],
    point_source: None,
    recipe: build_tube_cuff,
};

const HOLE_ROTATION: &str = "(360*L_holecenter_cuffseam)/(pi*2*R_in)";

/// Insulating tube with an optional longitudinal gap and up to two fluid
/// holes. The four gap/hole combinations are engine-side branches.
pub fn build_tube_cuff(g: &mut GraphBuilder<'_>) -> Result<(), GraphError> {
    g.feature(FeatureKind::Cylinder, "Make Inner Cuff Surface")
        .set("pos", ["0", "0", "Center-(Tube_L/2)"])
        .set("r", "R_in")
        .set("h", "Tube_L")
        .contribute_to("INNER CUFF SURFACE")
        .finish()?;
    g.feature(FeatureKind::Cylinder, "Make Outer Cuff Surface")
        .set("pos", ["0", "0", "Center-(Tube_L/2)"])
        .set("r", "R_out")
        .set("h", "Tube_L")
        .contribute_to("OUTER CUFF SURFACE")
        .finish()?;

    g.begin_if("If (No Gap AND No Holes)", "(Tube_theta>=359) && (N_holes==0)")?;
    remove_lumen(g, "Remove Domain Within Inner Cuff Surface", "CUFF FINAL")?;

    g.else_if("If (Gap AND No Holes)", "(Tube_theta<359) && (N_holes==0)")?;
    remove_lumen(g, "Remove Domain Within Inner Cuff Surface 1", "CUFF PRE GAP")?;
    gap_cross_section(g, "Make Cuff Gap Cross Section")?;
    g.feature(FeatureKind::Revolve, "Make Cuff Gap")
        .set("angle1", "Tube_theta")
        .input_features("input", &["Make Cuff Gap Cross Section"])
        .contribute_to("CUFF GAP")
        .finish()?;
    g.feature(FeatureKind::Difference, "Remove Cuff Gap")
        .input("input", "CUFF PRE GAP")
        .input("input2", "CUFF GAP")
        .contribute_to("CUFF FINAL")
        .finish()?;
    rotate_to_default(g, "Rotate to Default Conformation 1")?;

    g.else_if("If (No Gap AND Holes)", "(Tube_theta>=359) && (N_holes>0)")?;
    remove_lumen(g, "Remove Domain Within Inner Cuff Surface 2", "CUFF PRE HOLES")?;
    hole_shape(g, "Make Hole Shape", "Center+Pitch_holecenter_holecenter/2")?;
    g.feature(FeatureKind::Rotate, "Position Hole in Cuff")
        .set("rot", HOLE_ROTATION)
        .input("input", "HOLES")
        .finish()?;
    g.feature(FeatureKind::Difference, "Make Inner Cuff Hole")
        .input("input", "CUFF PRE HOLES")
        .input("input2", "HOLES")
        .contribute_to("CUFF FINAL")
        .finish()?;

    g.else_if("If (Gap AND Holes)", "(Tube_theta<359) && (N_holes>0)")?;
    remove_lumen(g, "Remove Domain Within Inner Cuff Surface 3", "CUFF PRE GAP PRE HOLES")?;
    gap_cross_section(g, "Make Cuff Gap Cross Section 1")?;
    g.feature(FeatureKind::Revolve, "Make Cuff Gap 1")
        .set("angle1", "Tube_theta")
        .input("input", "CUFF GAP CROSS SECTION")
        .contribute_to("CUFF GAP")
        .finish()?;
    g.feature(FeatureKind::Difference, "Remove Cuff Gap 1")
        .input("input", "CUFF PRE GAP PRE HOLES")
        .input("input2", "CUFF GAP")
        .contribute_to("CUFF wGAP PRE HOLES")
        .finish()?;
    hole_shape(g, "Make Hole Shape 1", "Center+Pitch_holecenter_holecenter/2")?;
    g.begin_if("If (Gap AND 2 Holes)", "N_holes==2")?;
    hole_shape(g, "Make Hole Shape 2", "Center-Pitch_holecenter_holecenter/2")?;
    g.end_if(Some("End If (Gap AND 2 Holes)"))?;
    g.feature(FeatureKind::Rotate, "Position Hole in Cuff 1")
        .set("rot", HOLE_ROTATION)
        .input("input", "HOLES")
        .finish()?;
    g.feature(FeatureKind::Difference, "Make Inner Cuff Hole 1")
        .input("input", "CUFF wGAP PRE HOLES")
        .input("input2", "HOLES")
        .contribute_to("CUFF FINAL")
        .finish()?;
    rotate_to_default(g, "Rotate to Default Conformation")?;
    g.end_if(Some("End"))?;
    Ok(())
}

fn remove_lumen(g: &mut GraphBuilder<'_>, label: &str, into: &str) -> Result<(), GraphError> {
    g.feature(FeatureKind::Difference, label)
        .input("input", "OUTER CUFF SURFACE")
        .input("input2", "INNER CUFF SURFACE")
        .contribute_to(into)
        .finish()?;
    Ok(())
}

fn gap_cross_section(g: &mut GraphBuilder<'_>, label: &str) -> Result<(), GraphError> {
    g.work_plane(label)
        .set("quickplane", "xz")
        .set("unite", true)
        .contribute_to("CUFF GAP CROSS SECTION")
        .body(|wp| {
            wp.feature(FeatureKind::Rectangle, "Cuff Gap Cross Section")
                .set("pos", ["R_in+((R_out-R_in)/2)", "Center"])
                .set("base", "center")
                .set("size", ["R_out-R_in", "Tube_L"])
                .finish()?;
            Ok(())
        })
        .finish()?;
    Ok(())
}

fn hole_shape(g: &mut GraphBuilder<'_>, label: &str, z: &str) -> Result<(), GraphError> {
    g.feature(FeatureKind::Cone, label)
        .set("pos", ["R_in-Buffer_hole/2", "0", z])
        .set("axis", ["1", "0", "0"])
        .set("semiaxes", ["D_hole/2", "D_hole/2"])
        .set("h", "(R_out-R_in)+Buffer_hole")
        .set("rat", "R_out/R_in")
        .contribute_to("HOLES")
        .finish()?;
    Ok(())
}

fn rotate_to_default(g: &mut GraphBuilder<'_>, label: &str) -> Result<(), GraphError> {
    g.feature(FeatureKind::Rotate, label)
        .set("rot", "Rot_def")
        .input("input", "CUFF FINAL")
        .finish()?;
    Ok(())
}
