use cuff_types::{FeatureKind, KeepFlags};
use feature_graph::{GraphBuilder, GraphError, SelectionCatalog};

use super::{NervePartBuild, TraceFile, UnionContribution, ALL_ONLY};

const EPINEURIUM: &str = "EPINEURIUM";
const EPIXS: &str = "EPIXS";
const MAKE_EPINEURIUM: &str = "Make Epineurium";

fn declare(g: &mut GraphBuilder<'_>) -> Result<SelectionCatalog, GraphError> {
    g.declare_catalog([(EPINEURIUM, KeepFlags::DOMAIN), (EPIXS, KeepFlags::NONE)])
}

fn finish(catalog: SelectionCatalog) -> NervePartBuild {
    NervePartBuild {
        catalog,
        contributions: vec![UnionContribution {
            feature: MAKE_EPINEURIUM.to_string(),
            groups: ALL_ONLY,
        }],
        impedance_on: None,
    }
}

/// Circular epineurium of radius `r_nerve`.
pub fn build_epi_circle(g: &mut GraphBuilder<'_>) -> Result<NervePartBuild, GraphError> {
    let catalog = declare(g)?;
    g.work_plane("Epineurium Cross Section")
        .set("unite", true)
        .contribute_to(EPIXS)
        .body(|wp| {
            wp.anonymous(FeatureKind::Ellipse)
                .set("semiaxes", ["r_nerve", "r_nerve"])
                .finish()?;
            Ok(())
        })
        .finish()?;
    g.feature(FeatureKind::Extrude, MAKE_EPINEURIUM)
        .set("distance", ["z_nerve"])
        .input("input", EPIXS)
        .contribute_to(EPINEURIUM)
        .finish()?;
    Ok(finish(catalog))
}

/// Epineurium following a traced nerve outline.
pub fn build_epi_trace(
    g: &mut GraphBuilder<'_>,
    nerve: &TraceFile,
    rtol: f64,
) -> Result<NervePartBuild, GraphError> {
    let catalog = declare(g)?;
    let plane = "Epineurium Geometry";
    g.work_plane(plane)
        .set("unite", true)
        .contribute_to(EPIXS)
        .body(|wp| {
            wp.selection("nerve curve")?;
            wp.selection("nerve sel")?;
            wp.feature(FeatureKind::InterpolationCurve, "Epineurium Trace")
                .set("source", "file")
                .set("filename", nerve.path.as_str())
                .set("type", "closed")
                .set("rtol", rtol)
                .contribute_to("nerve curve")
                .finish()?;
            wp.feature(FeatureKind::ConvertToSolid, "Epineurium Outer Surface")
                .set("keep", false)
                .input("input", "nerve curve")
                .contribute_to("nerve sel")
                .finish()?;
            Ok(())
        })
        .finish()?;
    g.feature(FeatureKind::Extrude, MAKE_EPINEURIUM)
        .set_ref("workplane", plane)
        .set("distance", ["z_nerve"])
        .input("input", EPIXS)
        .contribute_to(EPINEURIUM)
        .finish()?;
    Ok(finish(catalog))
}
