use cuff_types::{FeatureKind, KeepFlags};
use feature_graph::{GraphBuilder, GraphError};

use super::{NervePartBuild, TraceFile, UnionContribution, ALL_AND_ENDO, ALL_AND_PERI};

/// Closed interpolation curve from a trace file, converted to a surface.
///
/// `rtol` is left to the engine default when absent.
fn trace_surface(
    wp: &mut GraphBuilder<'_>,
    curve_label: &str,
    curve_into: &str,
    surface_label: &str,
    surface_into: Option<&str>,
    trace: &TraceFile,
    rtol: Option<f64>,
) -> Result<(), GraphError> {
    let mut curve = wp
        .feature(FeatureKind::InterpolationCurve, curve_label)
        .set("source", "file")
        .set("filename", trace.path.as_str())
        .set("type", "closed");
    if let Some(rtol) = rtol {
        curve = curve.set("rtol", rtol);
    }
    curve.contribute_to(curve_into).finish()?;

    let mut surface = wp
        .feature(FeatureKind::ConvertToSolid, surface_label)
        .set("keep", false)
        .input("input", curve_into);
    if let Some(into) = surface_into {
        surface = surface.contribute_to(into);
    }
    surface.finish()?;
    Ok(())
}

/// Fascicle whose perineurium is represented by a contact impedance on the
/// endoneurium boundary rather than by a meshed layer.
pub fn build_fascicle_ci(
    g: &mut GraphBuilder<'_>,
    index: usize,
    inner: &TraceFile,
    rtol: Option<f64>,
) -> Result<NervePartBuild, GraphError> {
    let name = format!("inner{index}");
    let inners_label = format!("{name}_INNERS_CI");
    let endo_label = format!("{name}_ENDONEURIUM");
    let catalog = g.declare_catalog([
        (inners_label.clone(), KeepFlags::NONE),
        (endo_label.clone(), KeepFlags::DOMAIN_AND_BOUNDARY),
    ])?;

    g.work_plane(&format!("{name} Inner Geometry"))
        .set("unite", true)
        .contribute_to(&inners_label)
        .body(|wp| {
            let ic = format!("{name}_IC");
            wp.selection(&ic)?;
            trace_surface(
                wp,
                &format!("{name} Inner Trace {}", inner.index),
                &ic,
                &format!("{name} Inner Surface {}", inner.index),
                None,
                inner,
                rtol,
            )
        })
        .finish()?;

    let make_endo = format!("{name} Make Endoneurium");
    g.feature(FeatureKind::Extrude, &make_endo)
        .set("distance", ["z_nerve"])
        .input("input", &inners_label)
        .contribute_to(&endo_label)
        .finish()?;

    Ok(NervePartBuild {
        catalog,
        contributions: vec![UnionContribution {
            feature: make_endo,
            groups: ALL_AND_ENDO,
        }],
        impedance_on: Some(endo_label),
    })
}

/// Fascicle with a meshed perineurium: the outer trace extruded as
/// perineurium, every inner trace extruded as endoneurium.
pub fn build_fascicle_mesh(
    g: &mut GraphBuilder<'_>,
    index: usize,
    inners: &[TraceFile],
    outer: &TraceFile,
    inner_rtol: Option<f64>,
    outer_rtol: Option<f64>,
) -> Result<NervePartBuild, GraphError> {
    let name = format!("outer{index}");
    let inners_label = format!("{name}_INNERS");
    let outer_label = format!("{name}_OUTER");
    let peri_label = format!("{name}_PERINEURIUM");
    let endo_label = format!("{name}_ENDONEURIUM");
    let catalog = g.declare_catalog([
        (inners_label.clone(), KeepFlags::NONE),
        (outer_label.clone(), KeepFlags::NONE),
        (peri_label.clone(), KeepFlags::DOMAIN),
        (endo_label.clone(), KeepFlags::DOMAIN),
    ])?;

    let inners_plane = format!("{name} Inners Geometry");
    g.work_plane(&inners_plane)
        .set("selresult", true)
        .set("unite", true)
        .contribute_to(&inners_label)
        .body(|wp| {
            let all = format!("{name} inners_all");
            wp.selection(&all)?;
            for inner in inners {
                let ic = format!("{name} IC{}", inner.index);
                wp.selection(&ic)?;
                trace_surface(
                    wp,
                    &format!("{name} Inner Trace {}", inner.index),
                    &ic,
                    &format!("{name} Inner Surface {}", inner.index),
                    Some(&all),
                    inner,
                    inner_rtol,
                )?;
            }
            Ok(())
        })
        .finish()?;

    let outer_plane = format!("{name} Outer Geometry");
    g.work_plane(&outer_plane)
        .set("unite", true)
        .contribute_to(&outer_label)
        .body(|wp| {
            let oc = format!("{name} OC");
            let sel = format!("{name} sel");
            wp.selection(&oc)?;
            wp.selection(&sel)?;
            trace_surface(
                wp,
                &format!("{name} Outer Trace"),
                &oc,
                &format!("{name} Outer Surface"),
                Some(&sel),
                outer,
                outer_rtol,
            )
        })
        .finish()?;

    let make_peri = format!("{name} Make Perineurium");
    g.feature(FeatureKind::Extrude, &make_peri)
        .set_ref("workplane", &outer_plane)
        .set("distance", ["z_nerve"])
        .input("input", &outer_label)
        .contribute_to(&peri_label)
        .finish()?;

    let make_endo = format!("{name} Make Endoneurium");
    g.feature(FeatureKind::Extrude, &make_endo)
        .set_ref("workplane", &inners_plane)
        .set("distance", ["z_nerve"])
        .input("input", &inners_label)
        .contribute_to(&endo_label)
        .finish()?;

    Ok(NervePartBuild {
        catalog,
        contributions: vec![
            UnionContribution {
                feature: make_peri,
                groups: ALL_AND_PERI,
            },
            UnionContribution {
                feature: make_endo,
                groups: ALL_AND_ENDO,
            },
        ],
        impedance_on: None,
    })
}
