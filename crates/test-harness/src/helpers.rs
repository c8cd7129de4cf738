//! Helper functions: error type and recipe fixtures.

use cuff_assembly::AssemblyError;
use cuff_types::{FeatureKind, KeepFlags};
use feature_graph::{GraphError, PrimitiveTemplate, TemplateParameter};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("instance not found: {label}")]
    InstanceNotFound { label: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("template registered nothing: {pseudonym}")]
    EmptyTemplate { pseudonym: String },
}

// ── Recipe Fixtures ─────────────────────────────────────────────────────────

/// Two-stage template: an anonymous cylinder fills `A`, an anonymous move of
/// `A` fills `B`. Binds exactly the two catalog labels.
pub fn two_stage_template(pseudonym: &str) -> Result<PrimitiveTemplate, HarnessError> {
    let params = vec![
        TemplateParameter::new("R_in", "1 [mm]"),
        TemplateParameter::new("L", "2 [mm]"),
    ];
    PrimitiveTemplate::build(pseudonym, params, |g| {
        let catalog = g.declare_catalog([("A", KeepFlags::ALL), ("B", KeepFlags::ALL)])?;
        g.anonymous(FeatureKind::Cylinder)
            .set("r", "R_in")
            .set("h", "L")
            .contribute_to("A")
            .finish()?;
        g.anonymous(FeatureKind::Move)
            .input("input", "A")
            .set("displz", "L")
            .contribute_to("B")
            .finish()?;
        Ok(catalog)
    })?
    .ok_or_else(|| HarnessError::EmptyTemplate {
        pseudonym: pseudonym.to_string(),
    })
}

/// A recipe that only creates anonymous operations; builds to `None`.
pub fn empty_template(pseudonym: &str) -> Result<Option<PrimitiveTemplate>, GraphError> {
    PrimitiveTemplate::build(pseudonym, Vec::new(), |g| {
        g.anonymous(FeatureKind::Block).set("size", ["1", "1", "1"]).finish()?;
        Ok(Default::default())
    })
}
