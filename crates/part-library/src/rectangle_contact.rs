use cuff_types::{FeatureKind, KeepFlags, PrimitiveKind};
use feature_graph::{GraphBuilder, GraphError};

use crate::definition::PrimitiveDefinition;

pub static DEFINITION: PrimitiveDefinition = PrimitiveDefinition {
    kind: PrimitiveKind::RectangleContact,
    parameters: &[
        ("Center", "0 [mm]"),
        ("Rotation_angle", "0 [deg]"),
        ("Rect_w", "0.475 [mm]"),
        ("Rect_z", "0.475 [mm]"),
        ("Rect_fillet", "0.1 [mm]"),
        ("L_cuff", "4.1917 [mm]"),
        ("R_in", "1.5 [mm]"),
        ("Rect_recess", "0.018 [mm]"),
        ("Rect_thk", "0.018 [mm]"),
        ("Rect_def", "1"),
    ],
    catalog: &[
        ("OUTER CONTACT CUTTER", KeepFlags::NONE),
        ("SEL INNER EXCESS CONTACT", KeepFlags::NONE),
        ("INNER CONTACT CUTTER", KeepFlags::NONE),
        ("SEL OUTER EXCESS RECESS", KeepFlags::NONE),
        ("SEL INNER EXCESS RECESS", KeepFlags::NONE),
        ("OUTER CUTTER", KeepFlags::NONE),
        ("FINAL RECESS", KeepFlags::DOMAIN),
        ("RECESS CROSS SECTION", KeepFlags::NONE),
        ("OUTER RECESS CUTTER", KeepFlags::NONE),
        ("RECESS PRE CUTS", KeepFlags::NONE),
        ("INNER RECESS CUTTER", KeepFlags::NONE),
        ("FINAL CONTACT", KeepFlags::DOMAIN),
        ("SEL OUTER EXCESS CONTACT", KeepFlags::NONE),
        ("SEL OUTER EXCESS", KeepFlags::NONE),
        ("SEL INNER EXCESS", KeepFlags::NONE),
        ("BASE CONTACT PLANE (PRE ROTATION)", KeepFlags::NONE),
        ("SRC", KeepFlags::POINT),
        ("CONTACT PRE CUTS", KeepFlags::NONE),
        ("CONTACT CROSS SECTION", KeepFlags::NONE),
        ("INNER CUFF CUTTER", KeepFlags::NONE),
        ("OUTER CUFF CUTTER", KeepFlags::NONE),
        ("FINAL", KeepFlags::NONE),
        ("INNER CUTTER", KeepFlags::NONE),
    ],
    point_source: Some(16),
    recipe: build_rectangle_contact,
};

const BASE_PLANE: &str = "base plane (pre rotation)";
const CURVATURE_SCALE: &str = "(2*(R_in+Rect_recess)*sin((Rect_w)/(2*(R_in+Rect_recess))))/Rect_w";

/// Rectangular contact with filleted corners, bent to the cuff's inner
/// radius, optionally seated in a recess of the same outline.
///
/// `Rect_def` picks the outline: 1 scales the filleted rectangle to the
/// curvature of the recess radius, 2 keeps it flat.
pub fn build_rectangle_contact(g: &mut GraphBuilder<'_>) -> Result<(), GraphError> {
    g.work_plane(BASE_PLANE)
        .set("quickplane", "yz")
        .set("unite", true)
        .contribute_to("BASE CONTACT PLANE (PRE ROTATION)")
        .finish()?;

    outline_plane(g, "Contact Cross Section", "CONTACT CROSS SECTION", ("CONTACT", ""))?;
    g.feature(FeatureKind::Extrude, "Make Contact Pre Cuts")
        .set("distance", ["2*R_in"])
        .input("input", "CONTACT CROSS SECTION")
        .contribute_to("CONTACT PRE CUTS")
        .finish()?;
    cutter(g, "Inner Contact Cutter", "R_in+Rect_recess", "INNER CONTACT CUTTER")?;
    cutter(g, "Outer Contact Cutter", "R_in+Rect_recess+Rect_thk", "OUTER CONTACT CUTTER")?;
    trim(
        g,
        "Contact",
        "CONTACT PRE CUTS",
        ("INNER CONTACT CUTTER", "OUTER CONTACT CUTTER"),
        "FINAL CONTACT",
        ("SEL INNER EXCESS CONTACT", "SEL OUTER EXCESS CONTACT"),
        "(2*R_in-(R_in+Rect_recess+Rect_thk))/2+R_in+Rect_recess+Rect_thk",
    )?;

    g.begin_if("If Recess", "Rect_recess>0")?;
    outline_plane(g, "Recess Cross Section", "RECESS CROSS SECTION", ("RECESS", " (for recess)"))?;
    g.feature(FeatureKind::Extrude, "Make Recess Pre Cuts 1")
        .set("distance", ["2*R_in"])
        .input("input", "RECESS CROSS SECTION")
        .contribute_to("RECESS PRE CUTS")
        .finish()?;
    cutter(g, "Inner Recess Cutter", "R_in", "INNER RECESS CUTTER")?;
    cutter(g, "Outer Recess Cutter", "R_in+Rect_recess", "OUTER RECESS CUTTER")?;
    trim(
        g,
        "Recess",
        "RECESS PRE CUTS",
        ("INNER RECESS CUTTER", "OUTER RECESS CUTTER"),
        "FINAL RECESS",
        ("SEL INNER EXCESS RECESS", "SEL OUTER EXCESS RECESS"),
        "(R_in+2*R_in)/2",
    )?;
    g.end_if(None)?;

    g.feature(FeatureKind::Point, "src")
        .set(
            "p",
            [
                "(R_in+Rect_recess+(Rect_thk/2))*cos(Rotation_angle)",
                "(R_in+Rect_recess+(Rect_thk/2))*sin(Rotation_angle)",
                "Center",
            ],
        )
        .contribute_to("SRC")
        .finish()?;
    Ok(())
}

/// Plane rotated off the base plane carrying the filleted outline.
///
/// `what` names the local selections (`<what> PRE FILLET`,
/// `<what> FILLETED`); `suffix` tells the contact and recess features apart.
fn outline_plane(
    g: &mut GraphBuilder<'_>,
    label: &str,
    into: &str,
    (what, suffix): (&str, &str),
) -> Result<(), GraphError> {
    let pre_fillet = format!("{what} PRE FILLET");
    let filleted = format!("{what} FILLETED");
    g.work_plane(label)
        .set("planetype", "transformed")
        .set_ref("workplane", BASE_PLANE)
        .set("transaxis", ["0", "1", "0"])
        .set("transrot", "Rotation_angle")
        .set("unite", true)
        .contribute_to(into)
        .body(|wp| {
            wp.selection(&pre_fillet)?;
            wp.selection(&filleted)?;
            wp.begin_if(&format!("If Contact Surface is True{suffix}"), "Rect_def==1")?;
            filleted_rectangle(wp, &pre_fillet, &filleted, 1)?;
            wp.feature(FeatureKind::Scale, &format!("Scale to Curvature{suffix}"))
                .set("type", "anisotropic")
                .set("factor", [CURVATURE_SCALE, "1"])
                .input("input", &filleted)
                .finish()?;
            wp.else_if(&format!("Else If Contact Outline is True{suffix}"), "Rect_def==2")?;
            filleted_rectangle(wp, &pre_fillet, &filleted, 2)?;
            wp.end_if(None)?;
            wp.anonymous(FeatureKind::Move)
                .set("disply", "Center")
                .input("input", &filleted)
                .finish()?;
            Ok(())
        })
        .finish()?;
    Ok(())
}

fn filleted_rectangle(
    wp: &mut GraphBuilder<'_>,
    pre_fillet: &str,
    filleted: &str,
    n: u8,
) -> Result<(), GraphError> {
    wp.feature(FeatureKind::Rectangle, &format!("Pre Fillet Corners {n}"))
        .set("pos", ["0", "0"])
        .set("base", "center")
        .set("size", ["Rect_w", "Rect_z"])
        .contribute_to(pre_fillet)
        .finish()?;
    wp.feature(FeatureKind::Fillet, &format!("Fillet Corners {n}"))
        .set("radius", "Rect_fillet")
        .input("point", pre_fillet)
        .contribute_to(filleted)
        .finish()?;
    Ok(())
}

fn cutter(g: &mut GraphBuilder<'_>, label: &str, radius: &str, into: &str) -> Result<(), GraphError> {
    g.feature(FeatureKind::Cylinder, label)
        .set("pos", ["0", "0", "-L_cuff/2+Center"])
        .set("r", radius)
        .set("h", "L_cuff")
        .contribute_to(into)
        .finish()?;
    Ok(())
}

/// Partition the pre-cut slab at both cutters, then delete what lies inside
/// the inner one and outside the outer one.
fn trim(
    g: &mut GraphBuilder<'_>,
    what: &str,
    pre_cuts: &str,
    (cut_in, cut_out): (&str, &str),
    into: &str,
    (sel_in, sel_out): (&str, &str),
    outer_radius: &str,
) -> Result<(), GraphError> {
    for (side, tool) in [("Outer", cut_out), ("Inner", cut_in)] {
        g.feature(FeatureKind::PartitionDomains, &format!("Cut {side} Excess {what}"))
            .set("partitionwith", "objects")
            .input("domain", pre_cuts)
            .input("object", tool)
            .contribute_to(into)
            .finish()?;
    }
    for (side, radius, selection) in [
        ("Inner", "(R_in+Rect_recess)/2", sel_in),
        ("Outer", outer_radius, sel_out),
    ] {
        g.feature(FeatureKind::BallSelection, &format!("Select {side} Excess {what}"))
            .set("posx", format!("({radius})*cos(Rotation_angle)"))
            .set("posy", format!("({radius})*sin(Rotation_angle)"))
            .set("posz", "Center")
            .set("r", 1_i64)
            .set("selkeep", false)
            .contribute_to(selection)
            .finish()?;
    }
    for (side, selection) in [("Inner", sel_in), ("Outer", sel_out)] {
        g.feature(FeatureKind::Delete, &format!("Delete {side} Excess {what}"))
            .input("input", selection)
            .finish()?;
    }
    Ok(())
}
