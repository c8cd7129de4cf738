use cuff_types::{FeatureKind, KeepFlags, PrimitiveKind};
use feature_graph::{GraphBuilder, GraphError};

use crate::definition::PrimitiveDefinition;

pub static DEFINITION: PrimitiveDefinition = PrimitiveDefinition {
    kind: PrimitiveKind::CircleContact,
    parameters: &[
        ("Circle_recess", "0.05 [mm]"),
        ("Rotation_angle", "0 [deg]"),
        ("Center", "20 [mm]"),
        ("Circle_def", "1"),
        ("R_in", "1.5 [mm]"),
        ("Circle_thk", "0.05 [mm]"),
        ("Overshoot", "0.05 [mm]"),
        ("Circle_diam", "2 [mm]"),
        ("L", "0.354 [inch]"),
    ],
    catalog: &[
        ("CONTACT CUTTER IN", KeepFlags::NONE),
        ("PRE CUT CONTACT", KeepFlags::NONE),
        ("RECESS FINAL", KeepFlags::DOMAIN),
        ("RECESS OVERSHOOT", KeepFlags::NONE),
        ("SRC", KeepFlags::POINT),
        ("PLANE FOR CONTACT", KeepFlags::NONE),
        ("CONTACT FINAL", KeepFlags::DOMAIN),
        ("CONTACT CUTTER OUT", KeepFlags::NONE),
        ("BASE CONTACT PLANE (PRE ROTATION)", KeepFlags::NONE),
        ("PLANE FOR RECESS", KeepFlags::NONE),
        ("PRE CUT RECESS", KeepFlags::NONE),
        ("RECESS CUTTER IN", KeepFlags::NONE),
        ("RECESS CUTTER OUT", KeepFlags::NONE),
        ("BASE PLANE (PRE ROTATION)", KeepFlags::NONE),
    ],
    point_source: Some(4),
    recipe: build_circle_contact,
};

const BASE_PLANE: &str = "Base Plane (Pre Rotation)";
const OUTLINE_SEMIAXIS: &str = "(R_in+Circle_recess)*sin((Circle_diam)/(2*(R_in+Circle_recess)))";

/// Disc contact cut to the cuff's inner curvature, optionally recessed.
///
/// Both the recess and the contact are extruded radially from a rotated
/// plane, then trimmed between two coaxial cutter cylinders.
pub fn build_circle_contact(g: &mut GraphBuilder<'_>) -> Result<(), GraphError> {
    g.work_plane(BASE_PLANE)
        .set("quickplane", "yz")
        .set("unite", true)
        .set("showworkplane", false)
        .contribute_to("BASE PLANE (PRE ROTATION)")
        .finish()?;

    g.begin_if("If Recess", "Circle_recess>0")?;
    outline_plane(g, "Rotated Plane (for Recess)", "PLANE FOR RECESS", "for recess")?;
    g.feature(FeatureKind::Extrude, "Make Pre Cut Recess Domains")
        .set("distance", ["R_in+Circle_recess+Overshoot"])
        .input("input", "PLANE FOR RECESS")
        .contribute_to("PRE CUT RECESS")
        .finish()?;
    cutter(g, "Recess Cut In", "R_in", "RECESS CUTTER IN")?;
    cutter(g, "Recess Cut Out", "R_in+Circle_recess", "RECESS CUTTER OUT")?;
    trim(
        g,
        "Recess",
        "PRE CUT RECESS",
        ("RECESS CUTTER IN", "RECESS CUTTER OUT"),
        "RECESS FINAL",
        "R_in+Circle_recess+Overshoot/2",
    )?;
    g.end_if(None)?;

    outline_plane(g, "Rotated Plane for Contact", "PLANE FOR CONTACT", "for contact")?;
    g.feature(FeatureKind::Extrude, "Make Pre Cut Contact Domains")
        .set("distance", ["R_in+Circle_recess+Circle_thk+Overshoot"])
        .input("input", "PLANE FOR CONTACT")
        .contribute_to("PRE CUT CONTACT")
        .finish()?;
    cutter(g, "Contact Cut In", "R_in+Circle_recess", "CONTACT CUTTER IN")?;
    cutter(g, "Contact Cut Out", "R_in+Circle_recess+Circle_thk", "CONTACT CUTTER OUT")?;
    trim(
        g,
        "Contact",
        "PRE CUT CONTACT",
        ("CONTACT CUTTER IN", "CONTACT CUTTER OUT"),
        "CONTACT FINAL",
        "R_in+Circle_recess+Circle_thk+Overshoot/2",
    )?;

    g.feature(FeatureKind::Point, "Src")
        .set(
            "p",
            [
                "(R_in+Circle_recess+Circle_thk/2)*cos(Rotation_angle)",
                "(R_in+Circle_recess+Circle_thk/2)*sin(Rotation_angle)",
                "Center",
            ],
        )
        .contribute_to("SRC")
        .finish()?;
    Ok(())
}

/// Plane rotated off the base plane carrying the contact outline; circular
/// or elliptical depending on `Circle_def`.
fn outline_plane(
    g: &mut GraphBuilder<'_>,
    label: &str,
    into: &str,
    purpose: &str,
) -> Result<(), GraphError> {
    g.work_plane(label)
        .set("planetype", "transformed")
        .set_ref("workplane", BASE_PLANE)
        .set("transaxis", ["0", "1", "0"])
        .set("transrot", "Rotation_angle")
        .set("unite", true)
        .contribute_to(into)
        .body(|wp| {
            wp.selection("CONTACT OUTLINE SHAPE")?;
            wp.begin_if(
                &format!("If Contact Surface is Circle ({purpose})"),
                "Circle_def==1",
            )?;
            wp.feature(FeatureKind::Ellipse, &format!("Contact Outline ({purpose})"))
                .set("pos", ["0", "Center"])
                .set("semiaxes", [OUTLINE_SEMIAXIS, "Circle_diam/2"])
                .contribute_to("CONTACT OUTLINE SHAPE")
                .finish()?;
            wp.else_if(
                &format!("Else If Contact Outline is Circle ({purpose})"),
                "Circle_def==2",
            )?;
            wp.feature(FeatureKind::Ellipse, &format!("Contact Outline 1 ({purpose})"))
                .set("pos", ["0", "Center"])
                .set("semiaxes", ["Circle_diam/2", "Circle_diam/2"])
                .contribute_to("CONTACT OUTLINE SHAPE")
                .finish()?;
            wp.end_if(None)?;
            Ok(())
        })
        .finish()?;
    Ok(())
}

fn cutter(g: &mut GraphBuilder<'_>, label: &str, radius: &str, into: &str) -> Result<(), GraphError> {
    g.feature(FeatureKind::Cylinder, label)
        .set("pos", ["0", "0", "Center-L/2"])
        .set("r", radius)
        .set("h", "L")
        .contribute_to(into)
        .finish()?;
    Ok(())
}

/// Cut the pre-cut domain at the inner cutter, split it at the outer one
/// and delete the overshoot beyond.
fn trim(
    g: &mut GraphBuilder<'_>,
    what: &str,
    pre_cut: &str,
    (cut_in, cut_out): (&str, &str),
    into: &str,
    overshoot_radius: &str,
) -> Result<(), GraphError> {
    g.feature(FeatureKind::Difference, &format!("Execute {what} Cut In"))
        .input("input", pre_cut)
        .input("input2", cut_in)
        .contribute_to(into)
        .finish()?;
    g.feature(FeatureKind::PartitionDomains, &format!("Partition Outer {what} Domain"))
        .set("partitionwith", "objects")
        .set("keepobject", false)
        .input("domain", pre_cut)
        .input("object", cut_out)
        .contribute_to(into)
        .finish()?;
    g.feature(FeatureKind::BallSelection, &format!("Select {what} Overshoot"))
        .set("posx", format!("({overshoot_radius})*cos(Rotation_angle)"))
        .set("posy", format!("({overshoot_radius})*sin(Rotation_angle)"))
        .set("posz", "Center")
        .set("r", 1_i64)
        .set("selkeep", false)
        .contribute_to("RECESS OVERSHOOT")
        .finish()?;
    g.feature(FeatureKind::Delete, &format!("Delete {what} Overshoot"))
        .input("input", "RECESS OVERSHOOT")
        .finish()?;
    Ok(())
}
