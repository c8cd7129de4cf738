use std::fmt;

use cuff_types::{Dimension, EntityKind, FeatureKind, PropValue};
use serde::{Deserialize, Serialize};

/// Tag of the shared geometry sequence every instance is placed into.
pub const SHARED_GEOMETRY: &str = "geom1";

/// Where in the document a command is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Container {
    /// Model-level lists: parts, materials, parameter groups, node groups.
    Model,
    /// The shared geometry sequence.
    Geometry,
    /// A part's own geometry sequence.
    Part { part: String },
    /// Geometry nested inside a work plane feature.
    WorkPlane { parent: Box<Container>, plane: String },
    /// The electric-currents physics interface.
    Physics,
    /// Component materials (links into model-level materials).
    Materials,
}

impl Container {
    pub fn part(part: impl Into<String>) -> Self {
        Container::Part { part: part.into() }
    }

    /// Geometry of work plane `plane` nested in this container.
    pub fn work_plane(&self, plane: impl Into<String>) -> Self {
        Container::WorkPlane {
            parent: Box::new(self.clone()),
            plane: plane.into(),
        }
    }

    /// True for containers that hold geometry features.
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            Container::Geometry | Container::Part { .. } | Container::WorkPlane { .. }
        )
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Model => f.write_str("model"),
            Container::Geometry => f.write_str(SHARED_GEOMETRY),
            Container::Part { part } => f.write_str(part),
            Container::WorkPlane { parent, plane } => write!(f, "{parent}/{plane}"),
            Container::Physics => f.write_str("ec"),
            Container::Materials => f.write_str("materials"),
        }
    }
}

/// Name under which the engine exposes an imported part selection in the
/// shared geometry: `geom1_<instance>_<selection>_<dom|bnd|pnt>`.
pub fn imported_selection_name(instance_id: &str, selection_id: &str, kind: EntityKind) -> String {
    format!(
        "{SHARED_GEOMETRY}_{instance_id}_{selection_id}_{}",
        kind.suffix()
    )
}

/// Key of a part-instance keep switch: `<instance>_<selection>.<dom|bnd|pnt>`.
pub fn keep_entry_key(instance_id: &str, selection_id: &str, kind: EntityKind) -> String {
    format!("{instance_id}_{selection_id}.{}", kind.suffix())
}

/// One command sent to the engine, as recorded by a test double.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineCommand {
    Create {
        at: Container,
        id: String,
        kind: FeatureKind,
        dim: Option<Dimension>,
    },
    Label {
        at: Container,
        id: String,
        text: String,
    },
    Set {
        at: Container,
        id: String,
        property: String,
        value: PropValue,
    },
    SetEntry {
        at: Container,
        id: String,
        property: String,
        key: String,
        value: PropValue,
    },
    SelectNamed {
        at: Container,
        id: String,
        input: Option<String>,
        selection: String,
    },
    Run {
        at: Container,
    },
}

impl EngineCommand {
    /// Feature identifier the command targets, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            EngineCommand::Create { id, .. }
            | EngineCommand::Label { id, .. }
            | EngineCommand::Set { id, .. }
            | EngineCommand::SetEntry { id, .. }
            | EngineCommand::SelectNamed { id, .. } => Some(id),
            EngineCommand::Run { .. } => None,
        }
    }

    pub fn container(&self) -> &Container {
        match self {
            EngineCommand::Create { at, .. }
            | EngineCommand::Label { at, .. }
            | EngineCommand::Set { at, .. }
            | EngineCommand::SetEntry { at, .. }
            | EngineCommand::SelectNamed { at, .. }
            | EngineCommand::Run { at } => at,
        }
    }
}

/// Errors reported by the engine while accepting commands.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("identifier {id} already exists in {container}")]
    DuplicateIdentifier { container: String, id: String },

    #[error("no feature {id} in {container}")]
    UnknownFeature { container: String, id: String },

    #[error("no selection named {name} visible from {container}")]
    UnknownSelection { container: String, name: String },

    #[error("engine rejected command: {reason}")]
    Rejected { reason: String },
}
