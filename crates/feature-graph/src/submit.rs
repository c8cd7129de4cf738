use cuff_types::{FeatureKind, PropValue};
use model_engine::{Container, ModelEngine};
use tracing::{debug, instrument};

use crate::graph::{ConstructionGraph, Input, Operation, Step};
use crate::registry::Identifier;
use crate::types::GraphError;

/// What a successful submission sent to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitReport {
    /// Created identifiers in emission order, work plane bodies inlined.
    pub created: Vec<Identifier>,
}

impl SubmitReport {
    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}

/// Emit every step of `graph` into container `at`, in order.
///
/// Stops at the first rejected command; nothing already sent is undone.
#[instrument(skip_all, fields(container = %at, steps = graph.len()))]
pub fn submit(
    graph: &ConstructionGraph,
    at: &Container,
    engine: &mut dyn ModelEngine,
) -> Result<SubmitReport, GraphError> {
    let mut report = SubmitReport::default();
    submit_into(graph, at, engine, &mut report)?;
    debug!(created = report.len(), "graph submitted");
    Ok(report)
}

fn submit_into(
    graph: &ConstructionGraph,
    at: &Container,
    engine: &mut dyn ModelEngine,
    report: &mut SubmitReport,
) -> Result<(), GraphError> {
    for step in graph.steps() {
        match step {
            Step::Selection { id, label } => {
                engine.create(at, id.as_str(), FeatureKind::CumulativeSelection, None)?;
                engine.label(at, id.as_str(), label)?;
                report.created.push(id.clone());
            }
            Step::Feature(op) => {
                emit_operation(op, at, engine)?;
                report.created.push(op.id.clone());
            }
            Step::Branch { id, label, kind } => {
                engine.create(at, id.as_str(), kind.feature_kind(), None)?;
                if let Some(label) = label {
                    engine.label(at, id.as_str(), label)?;
                }
                if let Some(guard) = kind.guard() {
                    engine.set(at, id.as_str(), "condition", PropValue::expr(&guard.0))?;
                }
                report.created.push(id.clone());
            }
            Step::WorkPlane(wp) => {
                emit_operation(&wp.op, at, engine)?;
                report.created.push(wp.op.id.clone());
                let inner = at.work_plane(wp.op.id.as_str());
                submit_into(&wp.body, &inner, engine, report)?;
            }
        }
    }
    Ok(())
}

fn emit_operation(
    op: &Operation,
    at: &Container,
    engine: &mut dyn ModelEngine,
) -> Result<(), GraphError> {
    let id = op.id.as_str();
    engine.create(at, id, op.kind, op.dim)?;
    if let Some(label) = &op.label {
        engine.label(at, id, label)?;
    }
    for (property, value) in &op.params {
        engine.set(at, id, property, value.clone())?;
    }
    for input in &op.inputs {
        match input {
            Input::Named { input, selection } => {
                engine.select_named(at, id, input.as_deref(), selection.as_str())?;
            }
            Input::Features { input, features } => {
                let names = features.iter().map(|f| f.to_string()).collect();
                engine.set(at, id, &format!("selection.{input}"), PropValue::Exprs(names))?;
            }
            Input::Property { property, target } => {
                engine.set(at, id, property, PropValue::expr(target.as_str()))?;
            }
        }
    }
    if let Some(target) = &op.contributes_to {
        engine.set(at, id, "contributeto", PropValue::expr(target.as_str()))?;
    }
    Ok(())
}
