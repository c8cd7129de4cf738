use std::collections::BTreeSet;

use cuff_types::{Dimension, FeatureKind, KeepFlags, PropValue};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, SelectionCatalog};
use crate::registry::{Identifier, IdentifierRegistry};
use crate::types::GraphError;

/// Engine-evaluated branch condition. Never evaluated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guard(pub String);

/// Something an operation reads from earlier steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Input {
    /// `selection(input).named(selection)`.
    Named {
        input: Option<String>,
        selection: Identifier,
    },
    /// `selection(input).set(features)`: direct feature references.
    Features {
        input: String,
        features: Vec<Identifier>,
    },
    /// A property whose value is another step's identifier.
    Property { property: String, target: Identifier },
}

impl Input {
    fn consumed(&self) -> Vec<&Identifier> {
        match self {
            Input::Named { selection, .. } => vec![selection],
            Input::Features { features, .. } => features.iter().collect(),
            Input::Property { target, .. } => vec![target],
        }
    }
}

/// A single geometry or physics operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: Identifier,
    pub kind: FeatureKind,
    pub dim: Option<Dimension>,
    pub label: Option<String>,
    /// Literal and expression parameters, in the order they are set.
    pub params: Vec<(String, PropValue)>,
    /// Cumulative selection this operation's result is added to.
    pub contributes_to: Option<Identifier>,
    pub inputs: Vec<Input>,
}

impl Operation {
    fn new(id: Identifier, kind: FeatureKind, label: Option<String>) -> Self {
        Self {
            id,
            kind,
            dim: None,
            label,
            params: Vec::new(),
            contributes_to: None,
            inputs: Vec::new(),
        }
    }

    /// Identifiers this operation depends on.
    pub fn consumes(&self) -> Vec<&Identifier> {
        let mut out: Vec<&Identifier> = self.contributes_to.iter().collect();
        for input in &self.inputs {
            out.extend(input.consumed());
        }
        out
    }

    pub fn param(&self, name: &str) -> Option<&PropValue> {
        self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BranchKind {
    If { guard: Guard },
    ElseIf { guard: Guard },
    Else,
    EndIf,
}

impl BranchKind {
    pub fn feature_kind(&self) -> FeatureKind {
        match self {
            BranchKind::If { .. } => FeatureKind::If,
            BranchKind::ElseIf { .. } => FeatureKind::ElseIf,
            BranchKind::Else => FeatureKind::Else,
            BranchKind::EndIf => FeatureKind::EndIf,
        }
    }

    pub fn guard(&self) -> Option<&Guard> {
        match self {
            BranchKind::If { guard } | BranchKind::ElseIf { guard } => Some(guard),
            BranchKind::Else | BranchKind::EndIf => None,
        }
    }
}

/// A work plane and the 2-D sub-graph built on it.
///
/// The body has its own registry; only explicitly promoted selections are
/// visible to the enclosing graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPlane {
    pub op: Operation,
    pub body: ConstructionGraph,
    pub registry: IdentifierRegistryView,
    /// `(label in enclosing scope, scoped identifier)`.
    pub promoted: Vec<(String, Identifier)>,
}

/// Read-only snapshot of a work plane's local labels, in binding order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifierRegistryView {
    pub bindings: Vec<(String, Identifier)>,
}

impl IdentifierRegistryView {
    fn of(registry: &IdentifierRegistry) -> Self {
        let bindings = registry
            .labels()
            .filter_map(|l| registry.get(l).ok().map(|id| (l.to_string(), id)))
            .collect();
        Self { bindings }
    }

    pub fn get(&self, label: &str) -> Option<&Identifier> {
        self.bindings.iter().find(|(l, _)| l == label).map(|(_, id)| id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Step {
    /// Declaration of a named cumulative selection.
    Selection { id: Identifier, label: String },
    Feature(Operation),
    Branch {
        id: Identifier,
        label: Option<String>,
        kind: BranchKind,
    },
    WorkPlane(Box<WorkPlane>),
}

impl Step {
    pub fn id(&self) -> &Identifier {
        match self {
            Step::Selection { id, .. } | Step::Branch { id, .. } => id,
            Step::Feature(op) => &op.id,
            Step::WorkPlane(wp) => &wp.op.id,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Step::Selection { label, .. } => Some(label),
            Step::Feature(op) => op.label.as_deref(),
            Step::Branch { label, .. } => label.as_deref(),
            Step::WorkPlane(wp) => wp.op.label.as_deref(),
        }
    }

    /// Identifiers that become available once this step has run.
    pub fn produces(&self) -> Vec<Identifier> {
        let mut out = vec![self.id().clone()];
        if let Step::WorkPlane(wp) = self {
            out.extend(wp.promoted.iter().map(|(_, id)| id.clone()));
        }
        out
    }

    /// Identifiers this step reads.
    pub fn consumes(&self) -> Vec<&Identifier> {
        match self {
            Step::Selection { .. } | Step::Branch { .. } => Vec::new(),
            Step::Feature(op) => op.consumes(),
            Step::WorkPlane(wp) => wp.op.consumes(),
        }
    }
}

/// Ordered construction operations over an arena of identifiers.
///
/// Every step consumes only identifiers produced by strictly earlier steps
/// (or present in the document before the graph starts), and branch nodes
/// form balanced `If … ElseIf … Else … EndIf` groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructionGraph {
    steps: Vec<Step>,
    external: BTreeSet<Identifier>,
}

impl ConstructionGraph {
    /// Assemble a graph from explicit steps, checking the ordering rules.
    pub fn from_steps(
        steps: Vec<Step>,
        external: impl IntoIterator<Item = Identifier>,
    ) -> Result<Self, GraphError> {
        let graph = Self {
            steps,
            external: external.into_iter().collect(),
        };
        graph.validate()?;
        Ok(graph)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn position(&self, id: &Identifier) -> Option<usize> {
        self.steps.iter().position(|s| s.id() == id)
    }

    pub fn find(&self, id: &Identifier) -> Option<&Step> {
        self.steps.iter().find(|s| s.id() == id)
    }

    /// Re-check forward-only references and branch balance.
    ///
    /// Only one arm of a branch group runs, so an arm never sees what a
    /// sibling arm produced, and nothing produced inside the group outlives
    /// its `EndIf`.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut produced = self.external.clone();
        let mut branches = BranchTracker::default();
        for step in &self.steps {
            for consumed in step.consumes() {
                if !produced.contains(consumed) {
                    return Err(GraphError::ForwardReference {
                        step: step.id().clone(),
                        identifier: consumed.clone(),
                    });
                }
            }
            if let Step::Branch { id, kind, .. } = step {
                branches.apply(id, kind, &mut produced)?;
            }
            if let Step::WorkPlane(wp) = step {
                wp.body.validate()?;
            }
            produced.extend(step.produces());
        }
        branches.finish()
    }
}

/// One open `If` group.
#[derive(Debug)]
struct BranchFrame {
    opened_by: Identifier,
    else_seen: bool,
    /// What was available when the group opened; every arm starts from it.
    before: BTreeSet<Identifier>,
}

#[derive(Debug, Default)]
struct BranchTracker {
    open: Vec<BranchFrame>,
}

impl BranchTracker {
    /// Check balance and rescope `produced` to the arm being entered.
    fn apply(
        &mut self,
        id: &Identifier,
        kind: &BranchKind,
        produced: &mut BTreeSet<Identifier>,
    ) -> Result<(), GraphError> {
        let unbalanced = |reason: &str| GraphError::UnbalancedBranch {
            at: id.to_string(),
            reason: reason.to_string(),
        };
        match kind {
            BranchKind::If { .. } => self.open.push(BranchFrame {
                opened_by: id.clone(),
                else_seen: false,
                before: produced.clone(),
            }),
            BranchKind::ElseIf { .. } => match self.open.last() {
                None => return Err(unbalanced("ElseIf without an open If")),
                Some(frame) if frame.else_seen => return Err(unbalanced("ElseIf after Else")),
                Some(frame) => *produced = frame.before.clone(),
            },
            BranchKind::Else => match self.open.last_mut() {
                None => return Err(unbalanced("Else without an open If")),
                Some(frame) if frame.else_seen => {
                    return Err(unbalanced("second Else in one group"))
                }
                Some(frame) => {
                    frame.else_seen = true;
                    *produced = frame.before.clone();
                }
            },
            BranchKind::EndIf => match self.open.pop() {
                None => return Err(unbalanced("EndIf without an open If")),
                Some(frame) => *produced = frame.before,
            },
        }
        Ok(())
    }

    fn finish(&self) -> Result<(), GraphError> {
        match self.open.last() {
            Some(frame) => Err(GraphError::UnbalancedBranch {
                at: frame.opened_by.to_string(),
                reason: "If never closed by EndIf".to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Incremental graph construction over a registry scope.
///
/// Labels are resolved through the registry as steps are added, so a step
/// can only reach identifiers that already exist.
pub struct GraphBuilder<'r> {
    registry: &'r mut IdentifierRegistry,
    steps: Vec<Step>,
    produced: BTreeSet<Identifier>,
    external: BTreeSet<Identifier>,
    branches: BranchTracker,
}

impl<'r> GraphBuilder<'r> {
    pub fn new(registry: &'r mut IdentifierRegistry) -> Self {
        let external = registry.identifiers().cloned().collect();
        Self {
            registry,
            steps: Vec::new(),
            produced: BTreeSet::new(),
            external,
            branches: BranchTracker::default(),
        }
    }

    pub fn registry(&self) -> &IdentifierRegistry {
        &*self.registry
    }

    /// Register each label as a cumulative selection, in order.
    pub fn declare_catalog<I, S>(&mut self, entries: I) -> Result<SelectionCatalog, GraphError>
    where
        I: IntoIterator<Item = (S, KeepFlags)>,
        S: Into<String>,
    {
        let mut catalog = SelectionCatalog::default();
        for (label, keep) in entries {
            let label = label.into();
            let id = self.selection(&label)?;
            catalog.push(CatalogEntry { label, id, keep });
        }
        Ok(catalog)
    }

    /// Declare a single named cumulative selection outside any catalog.
    pub fn selection(&mut self, label: &str) -> Result<Identifier, GraphError> {
        let id = self
            .registry
            .next(FeatureKind::CumulativeSelection.default_prefix(), Some(label))?;
        self.push(Step::Selection {
            id: id.clone(),
            label: label.to_string(),
        });
        Ok(id)
    }

    /// Start a labelled operation.
    pub fn feature(&mut self, kind: FeatureKind, label: &str) -> OperationBuilder<'_, 'r> {
        let op = self
            .registry
            .next(kind.default_prefix(), Some(label))
            .map(|id| Operation::new(id, kind, Some(label.to_string())))
            .map_err(GraphError::from);
        OperationBuilder { graph: self, op }
    }

    /// Start a helper operation that is never referenced by label.
    pub fn anonymous(&mut self, kind: FeatureKind) -> OperationBuilder<'_, 'r> {
        let op = self
            .registry
            .next(kind.default_prefix(), None)
            .map(|id| Operation::new(id, kind, None))
            .map_err(GraphError::from);
        OperationBuilder { graph: self, op }
    }

    pub fn begin_if(&mut self, label: &str, guard: impl Into<String>) -> Result<Identifier, GraphError> {
        self.branch(
            Some(label),
            BranchKind::If {
                guard: Guard(guard.into()),
            },
        )
    }

    pub fn else_if(&mut self, label: &str, guard: impl Into<String>) -> Result<Identifier, GraphError> {
        self.branch(
            Some(label),
            BranchKind::ElseIf {
                guard: Guard(guard.into()),
            },
        )
    }

    pub fn else_branch(&mut self, label: &str) -> Result<Identifier, GraphError> {
        self.branch(Some(label), BranchKind::Else)
    }

    pub fn end_if(&mut self, label: Option<&str>) -> Result<Identifier, GraphError> {
        self.branch(label, BranchKind::EndIf)
    }

    fn branch(&mut self, label: Option<&str>, kind: BranchKind) -> Result<Identifier, GraphError> {
        let id = self
            .registry
            .next(kind.feature_kind().default_prefix(), label)?;
        self.branches.apply(&id, &kind, &mut self.produced)?;
        self.push(Step::Branch {
            id: id.clone(),
            label: label.map(str::to_string),
            kind,
        });
        Ok(id)
    }

    /// Start a work plane whose body is built in its own label scope.
    pub fn work_plane(&mut self, label: &str) -> WorkPlaneBuilder<'_, 'r> {
        let op = self
            .registry
            .next(FeatureKind::WorkPlane.default_prefix(), Some(label))
            .map(|id| Operation::new(id, FeatureKind::WorkPlane, Some(label.to_string())))
            .map_err(GraphError::from);
        WorkPlaneBuilder {
            graph: self,
            op,
            local: IdentifierRegistry::new(),
            body: None,
            promotions: Vec::new(),
        }
    }

    /// Close the graph. Every `If` must have been closed.
    pub fn finish(self) -> Result<ConstructionGraph, GraphError> {
        self.branches.finish()?;
        Ok(ConstructionGraph {
            steps: self.steps,
            external: self.external,
        })
    }

    fn resolve(&self, consumer: &Identifier, label: &str) -> Result<Identifier, GraphError> {
        let id = self.registry.get(label)?;
        if !self.produced.contains(&id) && !self.external.contains(&id) {
            return Err(GraphError::ForwardReference {
                step: consumer.clone(),
                identifier: id,
            });
        }
        Ok(id)
    }

    fn push(&mut self, step: Step) {
        self.produced.extend(step.produces());
        self.steps.push(step);
    }
}

/// Fluent configuration of one operation; the first error sticks and is
/// reported by `finish`.
pub struct OperationBuilder<'b, 'r> {
    graph: &'b mut GraphBuilder<'r>,
    op: Result<Operation, GraphError>,
}

impl<'b, 'r> OperationBuilder<'b, 'r> {
    fn with(mut self, f: impl FnOnce(&GraphBuilder<'r>, &mut Operation) -> Result<(), GraphError>) -> Self {
        if let Ok(op) = &mut self.op {
            if let Err(e) = f(&*self.graph, op) {
                self.op = Err(e);
            }
        }
        self
    }

    pub fn dim(self, dim: Dimension) -> Self {
        self.with(|_, op| {
            op.dim = Some(dim);
            Ok(())
        })
    }

    pub fn set(self, property: &str, value: impl Into<PropValue>) -> Self {
        let value = value.into();
        self.with(|_, op| {
            op.params.push((property.to_string(), value));
            Ok(())
        })
    }

    /// Add this operation's result to a named cumulative selection.
    pub fn contribute_to(self, label: &str) -> Self {
        self.with(|g, op| {
            op.contributes_to = Some(g.resolve(&op.id, label)?);
            Ok(())
        })
    }

    /// Feed a named selection into input `input`.
    pub fn input(self, input: &str, label: &str) -> Self {
        self.with(|g, op| {
            let selection = g.resolve(&op.id, label)?;
            op.inputs.push(Input::Named {
                input: Some(input.to_string()),
                selection,
            });
            Ok(())
        })
    }

    /// Feed a named selection into the feature's implicit selection.
    pub fn select(self, label: &str) -> Self {
        self.with(|g, op| {
            let selection = g.resolve(&op.id, label)?;
            op.inputs.push(Input::Named {
                input: None,
                selection,
            });
            Ok(())
        })
    }

    /// Reference earlier features directly by label.
    pub fn input_features(self, input: &str, labels: &[&str]) -> Self {
        self.with(|g, op| {
            let features = labels
                .iter()
                .map(|l| g.resolve(&op.id, l))
                .collect::<Result<Vec<_>, _>>()?;
            op.inputs.push(Input::Features {
                input: input.to_string(),
                features,
            });
            Ok(())
        })
    }

    /// Set a property to another step's identifier.
    pub fn set_ref(self, property: &str, label: &str) -> Self {
        self.with(|g, op| {
            let target = g.resolve(&op.id, label)?;
            op.inputs.push(Input::Property {
                property: property.to_string(),
                target,
            });
            Ok(())
        })
    }

    pub fn finish(self) -> Result<Identifier, GraphError> {
        let op = self.op?;
        let id = op.id.clone();
        self.graph.push(Step::Feature(op));
        Ok(id)
    }
}

/// Fluent configuration of a work plane and its nested sub-graph.
pub struct WorkPlaneBuilder<'b, 'r> {
    graph: &'b mut GraphBuilder<'r>,
    op: Result<Operation, GraphError>,
    local: IdentifierRegistry,
    body: Option<ConstructionGraph>,
    /// `(local label, label in the enclosing scope)`.
    promotions: Vec<(String, String)>,
}

impl<'b, 'r> WorkPlaneBuilder<'b, 'r> {
    pub fn set(mut self, property: &str, value: impl Into<PropValue>) -> Self {
        if let Ok(op) = &mut self.op {
            op.params.push((property.to_string(), value.into()));
        }
        self
    }

    pub fn contribute_to(mut self, label: &str) -> Self {
        if let Ok(op) = &mut self.op {
            match self.graph.resolve(&op.id, label) {
                Ok(id) => op.contributes_to = Some(id),
                Err(e) => self.op = Err(e),
            }
        }
        self
    }

    /// Place this plane relative to an earlier one.
    pub fn set_ref(mut self, property: &str, label: &str) -> Self {
        if let Ok(op) = &mut self.op {
            match self.graph.resolve(&op.id, label) {
                Ok(target) => op.inputs.push(Input::Property {
                    property: property.to_string(),
                    target,
                }),
                Err(e) => self.op = Err(e),
            }
        }
        self
    }

    /// Feed a named selection into input `input`, e.g. the face a
    /// face-parallel plane sits on.
    pub fn input(mut self, input: &str, label: &str) -> Self {
        if let Ok(op) = &mut self.op {
            match self.graph.resolve(&op.id, label) {
                Ok(selection) => op.inputs.push(Input::Named {
                    input: Some(input.to_string()),
                    selection,
                }),
                Err(e) => self.op = Err(e),
            }
        }
        self
    }

    /// Build the plane's 2-D geometry in a fresh label scope.
    pub fn body(mut self, build: impl FnOnce(&mut GraphBuilder<'_>) -> Result<(), GraphError>) -> Self {
        if self.op.is_err() {
            return self;
        }
        let mut inner = GraphBuilder::new(&mut self.local);
        let result = build(&mut inner).and_then(|()| inner.finish());
        match result {
            Ok(graph) => self.body = Some(graph),
            Err(e) => self.op = Err(e),
        }
        self
    }

    /// Expose a local selection to the enclosing scope under `as_label`.
    pub fn promote(mut self, local_label: &str, as_label: &str) -> Self {
        self.promotions
            .push((local_label.to_string(), as_label.to_string()));
        self
    }

    pub fn finish(self) -> Result<Identifier, GraphError> {
        let op = self.op?;
        let mut promoted = Vec::with_capacity(self.promotions.len());
        for (local_label, as_label) in &self.promotions {
            let local_id = self.local.get(local_label)?;
            let scoped = op.id.scoped(&local_id);
            self.graph.registry.bind(as_label, scoped.clone())?;
            promoted.push((as_label.clone(), scoped));
        }
        let id = op.id.clone();
        self.graph.push(Step::WorkPlane(Box::new(WorkPlane {
            op,
            body: self.body.unwrap_or_default(),
            registry: IdentifierRegistryView::of(&self.local),
            promoted,
        })));
        Ok(id)
    }
}
