use cuff_types::{FeatureKind, KeepFlags, PrimitiveKind, PropValue};
use feature_graph::{GraphBuilder, GraphError, OperationBuilder};

use crate::definition::PrimitiveDefinition;

pub static DEFINITION: PrimitiveDefinition = PrimitiveDefinition {
    kind: PrimitiveKind::HelicalCuffnContact,
    parameters: &[
        ("Center", "20 [mm]"),
        ("Corr", "0 [deg]"),
        ("rev_BD_insul", "0.75"),
        ("rev_BD_cond", "1"),
    ],
    catalog: &[
        ("PC1", KeepFlags::NONE),
        ("Cuffp1", KeepFlags::NONE),
        ("SEL END P1", KeepFlags::NONE),
        ("PC2", KeepFlags::NONE),
        ("SRC", KeepFlags::POINT),
        ("Cuffp2", KeepFlags::NONE),
        ("Conductorp2", KeepFlags::DOMAIN),
        ("SEL END P2", KeepFlags::NONE),
        ("Cuffp3", KeepFlags::NONE),
        ("PC3", KeepFlags::NONE),
        ("CUFF FINAL", KeepFlags::DOMAIN),
    ],
    point_source: Some(4),
    recipe: build_helical_cuffn_contact,
};

/// Radius of the helix centre line.
const HELIX_R: &str = "(thk_cuff_LN/2)+r_cuff_in_LN";
/// Sweep boundaries as fractions of the total revolutions.
const END_P1: &str = "rev_cuff_LN*(rev_BD_insul/2.5)";
const END_P2: &str = "rev_cuff_LN*((rev_BD_insul+rev_BD_cond)/2.5)";

/// Helical insulator in three swept parts; the middle part carries the
/// conductor ribbon. The three insulator sweeps are united into
/// `CUFF FINAL`.
///
/// Parts 2 and 3 start on the end face of the part before them, found with
/// a ball selection at the helix position of that boundary.
pub fn build_helical_cuffn_contact(g: &mut GraphBuilder<'_>) -> Result<(), GraphError> {
    g.work_plane("Helical Insulator Cross Section Part 1")
        .set("quickplane", "xz")
        .set("unite", true)
        .body(|wp| {
            wp.selection("HELICAL INSULATOR CROSS SECTION")?;
            wp.selection("HELICAL INSULATOR CROSS SECTION P1")?;
            insulator_section(wp, "Helical Insulator Cross Section Part 1", "HELICAL INSULATOR CROSS SECTION P1")
                .set("pos", ["r_cuff_in_LN+(thk_cuff_LN/2)", "Center-(L_cuff_LN/2)"])
                .finish()?;
            Ok(())
        })
        .promote("HELICAL INSULATOR CROSS SECTION P1", "HELICAL INSULATOR CROSS SECTION P1")
        .finish()?;
    helix(g, "Parametric Curve Part 1", None, END_P1, "PC1")?;
    sweep(
        g,
        "Make Cuff Part 1",
        "HELICAL INSULATOR CROSS SECTION P1",
        ("PC1", "Parametric Curve Part 1"),
        "Cuffp1",
    )
    .set("keep", false)
    .finish()?;
    end_face(g, "Select End Face Part 1", "rev_BD_insul", "SEL END P1")?;

    g.work_plane("Helical Insulator Cross Section Part 2")
        .set("planetype", "faceparallel")
        .set("unite", true)
        .input("face", "SEL END P1")
        .body(|wp| {
            wp.selection("HELICAL INSULATOR CROSS SECTION P2")?;
            wp.selection("HELICAL CONDUCTOR CROSS SECTION P2")?;
            insulator_section(wp, "Helical Insulator Cross Section Part 2", "HELICAL INSULATOR CROSS SECTION P2")
                .finish()?;
            Ok(())
        })
        .promote("HELICAL INSULATOR CROSS SECTION P2", "HELICAL INSULATOR CROSS SECTION P2")
        .finish()?;
    g.work_plane("Helical Conductor Cross Section Part 2")
        .set("planetype", "faceparallel")
        .set("unite", true)
        .input("face", "SEL END P1")
        .body(|wp| {
            wp.selection("wp HELICAL INSULATOR CROSS SECTION P2")?;
            wp.selection("wp HELICAL CONDUCTOR CROSS SECTION P2")?;
            wp.feature(FeatureKind::Rectangle, "Helical Conductor Cross Section Part 2")
                .set("pos", ["(thk_elec_LN-thk_cuff_LN)/2", "0"])
                .set("base", "center")
                .set("size", ["thk_elec_LN", "w_elec_LN"])
                .contribute_to("wp HELICAL CONDUCTOR CROSS SECTION P2")
                .finish()?;
            Ok(())
        })
        .promote("wp HELICAL CONDUCTOR CROSS SECTION P2", "HELICAL CONDUCTOR CROSS SECTION P2")
        .finish()?;
    helix(g, "Parametric Curve Part 2", Some(END_P1), END_P2, "PC2")?;
    let pc2 = ("PC2", "Parametric Curve Part 2");
    sweep(g, "Make Cuff Part 2", "HELICAL INSULATOR CROSS SECTION P2", pc2, "Cuffp2").finish()?;
    sweep(g, "Make Conductor Part 2", "HELICAL CONDUCTOR CROSS SECTION P2", pc2, "Conductorp2").finish()?;
    end_face(g, "Select End Face Part 2", "rev_BD_insul+rev_BD_cond", "SEL END P2")?;

    g.work_plane("Helical Insulator Cross Section Part 3")
        .set("planetype", "faceparallel")
        .set("unite", true)
        .input("face", "SEL END P2")
        .body(|wp| {
            wp.selection("HELICAL INSULATOR CROSS SECTION P3")?;
            insulator_section(wp, "Helical Insulator Cross Section Part 3", "HELICAL INSULATOR CROSS SECTION P3")
                .finish()?;
            Ok(())
        })
        .promote("HELICAL INSULATOR CROSS SECTION P3", "HELICAL INSULATOR CROSS SECTION P3")
        .finish()?;
    helix(g, "Parametric Curve Part 3", Some(END_P2), "rev_cuff_LN", "PC3")?;
    g.feature(FeatureKind::Sweep, "Make Cuff Part 3")
        .input("face", "HELICAL INSULATOR CROSS SECTION P3")
        .input("edge", "PC3")
        .set("keep", false)
        .set("twistcomp", false)
        .contribute_to("Cuffp3")
        .finish()?;

    g.feature(FeatureKind::Point, "ptSRC")
        .set(
            "p",
            [
                "cos(2*pi*rev_cuff_LN*(1.25/2.5))*((thk_elec_LN/2)+r_cuff_in_LN)",
                "sin(2*pi*rev_cuff_LN*(1.25/2.5))*((thk_elec_LN/2)+r_cuff_in_LN)",
                "Center",
            ],
        )
        .contribute_to("SRC")
        .finish()?;

    g.feature(FeatureKind::Union, "Union Silicone Parts")
        .input_features(
            "input",
            &["Make Cuff Part 1", "Make Cuff Part 2", "Make Cuff Part 3"],
        )
        .contribute_to("CUFF FINAL")
        .finish()?;
    Ok(())
}

fn insulator_section<'b, 'r>(
    wp: &'b mut GraphBuilder<'r>,
    label: &str,
    into: &str,
) -> OperationBuilder<'b, 'r> {
    wp.feature(FeatureKind::Rectangle, label)
        .set("base", "center")
        .set("size", ["thk_cuff_LN", "w_cuff_LN"])
        .contribute_to(into)
}

/// Stretch of the helix centre line between two parameter values.
fn helix(
    g: &mut GraphBuilder<'_>,
    label: &str,
    parmin: Option<&str>,
    parmax: &str,
    into: &str,
) -> Result<(), GraphError> {
    let mut curve = g.feature(FeatureKind::ParametricCurve, label);
    if let Some(parmin) = parmin {
        curve = curve.set("parmin", parmin);
    }
    curve
        .set("parmax", parmax)
        .set(
            "coord",
            PropValue::exprs([
                format!("cos(2*pi*s)*({HELIX_R})"),
                format!("sin(2*pi*s)*({HELIX_R})"),
                "Center+(L_cuff_LN)*(s/rev_cuff_LN)-(L_cuff_LN/2)".to_string(),
            ]),
        )
        .contribute_to(into)
        .finish()?;
    Ok(())
}

fn sweep<'b, 'r>(
    g: &'b mut GraphBuilder<'r>,
    label: &str,
    face: &str,
    (edge, curve): (&str, &str),
    into: &str,
) -> OperationBuilder<'b, 'r> {
    g.feature(FeatureKind::Sweep, label)
        .set("crossfaces", true)
        .set("includefinal", false)
        .set("twistcomp", false)
        .input("face", face)
        .input("edge", edge)
        .input_features("diredge", &[curve])
        .contribute_to(into)
}

/// Ball selection on the sweep end face at `revs` of the 2.5-turn scale.
fn end_face(g: &mut GraphBuilder<'_>, label: &str, revs: &str, into: &str) -> Result<(), GraphError> {
    let turns = format!("rev_cuff_LN*(({revs})/2.5)");
    g.feature(FeatureKind::BallSelection, label)
        .set("entitydim", 2_i64)
        .set("posx", format!("cos(2*pi*{turns})*({HELIX_R})"))
        .set("posy", format!("sin(2*pi*{turns})*({HELIX_R})"))
        .set("posz", format!("Center+(L_cuff_LN)*({turns}/rev_cuff_LN)-(L_cuff_LN/2)"))
        .set("r", 1_i64)
        .contribute_to(into)
        .finish()?;
    Ok(())
}
