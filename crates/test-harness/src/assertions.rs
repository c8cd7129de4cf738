//! Assertion helpers with diagnostic output.
//!
//! Failures name the context and show what was actually there.

use std::collections::BTreeSet;

use cuff_types::FeatureKind;
use feature_graph::{ConstructionGraph, IdentifierRegistry};
use model_engine::{Container, RecordingEngine};

use crate::helpers::HarnessError;

/// Assert the number of features of `kind` in a container.
pub fn assert_feature_count(
    engine: &RecordingEngine,
    at: &Container,
    kind: FeatureKind,
    expected: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    let found = engine.features_of_kind(at, kind);
    if found.len() == expected {
        Ok(())
    } else {
        let ids: Vec<&str> = found.iter().map(|f| f.id.as_str()).collect();
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{ctx}] expected {expected} {kind} in {at}, got {}: {ids:?}",
                found.len()
            ),
        })
    }
}

/// Assert a part-instance selection was exported into the shared geometry.
pub fn assert_imported(engine: &RecordingEngine, name: &str, ctx: &str) -> Result<(), HarnessError> {
    if engine.imported_selections().any(|s| s == name) {
        Ok(())
    } else {
        let imported: Vec<&str> = engine.imported_selections().collect();
        Err(HarnessError::AssertionFailed {
            detail: format!("[{ctx}] '{name}' not imported; imported: {imported:?}"),
        })
    }
}

/// Assert that no label starting with `a` resolves to the same identifier as
/// a label starting with `b`.
pub fn assert_disjoint_namespaces(
    registry: &IdentifierRegistry,
    a: &str,
    b: &str,
) -> Result<(), HarnessError> {
    let ids_with = |prefix: &str| -> Result<BTreeSet<String>, HarnessError> {
        let mut ids = BTreeSet::new();
        for label in registry.labels().filter(|l| l.starts_with(prefix)) {
            ids.insert(registry.get(label).map_err(|e| HarnessError::AssertionFailed {
                detail: e.to_string(),
            })?.to_string());
        }
        Ok(ids)
    };
    let left = ids_with(a)?;
    let right = ids_with(b)?;
    let shared: Vec<_> = left.intersection(&right).collect();
    if left.is_empty() || right.is_empty() {
        return Err(HarnessError::AssertionFailed {
            detail: format!("no labels under '{a}' or '{b}'"),
        });
    }
    if shared.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!("'{a}' and '{b}' share identifiers {shared:?}"),
        })
    }
}

/// Assert every step consumes only identifiers produced earlier (or
/// external to the graph) and branches are balanced.
pub fn assert_forward_only(graph: &ConstructionGraph) -> Result<(), HarnessError> {
    graph.validate().map_err(|e| HarnessError::AssertionFailed {
        detail: e.to_string(),
    })
}
