use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of operation the engine is asked to create.
///
/// The set mirrors the engine's own operation vocabulary; `engine_name` is the
/// token sent across the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    // Containers and bookkeeping
    Part,
    PartInstance,
    CumulativeSelection,
    ParameterGroup,
    NodeGroup,
    // Solids and curves
    Cylinder,
    Cone,
    Block,
    Point,
    Rectangle,
    Ellipse,
    Circle,
    InterpolationCurve,
    ParametricCurve,
    ConvertToSolid,
    WorkPlane,
    Extrude,
    Revolve,
    Sweep,
    // Booleans and transforms
    Difference,
    Union,
    PartitionDomains,
    Delete,
    BallSelection,
    Rotate,
    Move,
    Scale,
    Fillet,
    // Branching
    If,
    ElseIf,
    Else,
    EndIf,
    // Physics and materials
    PointCurrentSource,
    Ground,
    ContactImpedance,
    Material,
    MaterialLink,
}

impl FeatureKind {
    /// The token the engine understands for this operation.
    pub fn engine_name(self) -> &'static str {
        match self {
            FeatureKind::Part => "Part",
            FeatureKind::PartInstance => "PartInstance",
            FeatureKind::CumulativeSelection => "CumulativeSelection",
            FeatureKind::ParameterGroup => "ParameterGroup",
            FeatureKind::NodeGroup => "NodeGroup",
            FeatureKind::Cylinder => "Cylinder",
            FeatureKind::Cone => "ECone",
            FeatureKind::Block => "Block",
            FeatureKind::Point => "Point",
            FeatureKind::Rectangle => "Rectangle",
            FeatureKind::Ellipse => "Ellipse",
            FeatureKind::Circle => "Circle",
            FeatureKind::InterpolationCurve => "InterpolationCurve",
            FeatureKind::ParametricCurve => "ParametricCurve",
            FeatureKind::ConvertToSolid => "ConvertToSolid",
            FeatureKind::WorkPlane => "WorkPlane",
            FeatureKind::Extrude => "Extrude",
            FeatureKind::Revolve => "Revolve",
            FeatureKind::Sweep => "Sweep",
            FeatureKind::Difference => "Difference",
            FeatureKind::Union => "Union",
            FeatureKind::PartitionDomains => "PartitionDomains",
            FeatureKind::Delete => "Delete",
            FeatureKind::BallSelection => "BallSelection",
            FeatureKind::Rotate => "Rotate",
            FeatureKind::Move => "Move",
            FeatureKind::Scale => "Scale",
            FeatureKind::Fillet => "Fillet",
            FeatureKind::If => "If",
            FeatureKind::ElseIf => "ElseIf",
            FeatureKind::Else => "Else",
            FeatureKind::EndIf => "EndIf",
            FeatureKind::PointCurrentSource => "PointCurrentSource",
            FeatureKind::Ground => "Ground",
            FeatureKind::ContactImpedance => "ContactImpedance",
            FeatureKind::Material => "Common",
            FeatureKind::MaterialLink => "Link",
        }
    }

    /// Identifier prefix conventionally used when allocating this kind.
    pub fn default_prefix(self) -> &'static str {
        match self {
            FeatureKind::Part => "part",
            FeatureKind::PartInstance => "pi",
            FeatureKind::CumulativeSelection => "csel",
            FeatureKind::ParameterGroup => "par",
            FeatureKind::NodeGroup => "grp",
            FeatureKind::Cylinder => "cyl",
            FeatureKind::Cone => "econ",
            FeatureKind::Block => "blk",
            FeatureKind::Point => "pt",
            FeatureKind::Rectangle => "r",
            FeatureKind::Ellipse => "e",
            FeatureKind::Circle => "c",
            FeatureKind::InterpolationCurve => "ic",
            FeatureKind::ParametricCurve => "pc",
            FeatureKind::ConvertToSolid => "csol",
            FeatureKind::WorkPlane => "wp",
            FeatureKind::Extrude => "ext",
            FeatureKind::Revolve => "rev",
            FeatureKind::Sweep => "swe",
            FeatureKind::Difference => "dif",
            FeatureKind::Union => "uni",
            FeatureKind::PartitionDomains => "pard",
            FeatureKind::Delete => "del",
            FeatureKind::BallSelection => "ballsel",
            FeatureKind::Rotate => "rot",
            FeatureKind::Move => "mov",
            FeatureKind::Scale => "sca",
            FeatureKind::Fillet => "fil",
            FeatureKind::If => "if",
            FeatureKind::ElseIf => "elseif",
            FeatureKind::Else => "else",
            FeatureKind::EndIf => "endif",
            FeatureKind::PointCurrentSource => "pcs",
            FeatureKind::Ground => "gnd",
            FeatureKind::ContactImpedance => "ci",
            FeatureKind::Material => "mat",
            FeatureKind::MaterialLink => "matlnk",
        }
    }

    pub fn is_branch(self) -> bool {
        matches!(
            self,
            FeatureKind::If | FeatureKind::ElseIf | FeatureKind::Else | FeatureKind::EndIf
        )
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.engine_name())
    }
}

/// Entity dimension a physics feature or selection operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Points = 0,
    Curves = 1,
    Surfaces = 2,
    Volumes = 3,
}

/// A property value pushed into the engine.
///
/// Expressions stay opaque strings; the engine evaluates them against the
/// part's or model's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PropValue {
    Expr(String),
    Exprs(Vec<String>),
    Number(f64),
    Int(i64),
    Bool(bool),
}

impl PropValue {
    pub fn expr(s: impl Into<String>) -> Self {
        PropValue::Expr(s.into())
    }

    pub fn exprs<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PropValue::Exprs(items.into_iter().map(Into::into).collect())
    }

    pub fn as_expr(&self) -> Option<&str> {
        match self {
            PropValue::Expr(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Expr(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Expr(s)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Int(n)
    }
}

impl<const N: usize> From<[&str; N]> for PropValue {
    fn from(items: [&str; N]) -> Self {
        PropValue::exprs(items)
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Expr(s) => write!(f, "{s}"),
            PropValue::Exprs(items) => write!(f, "[{}]", items.join(", ")),
            PropValue::Number(n) => write!(f, "{n}"),
            PropValue::Int(n) => write!(f, "{n}"),
            PropValue::Bool(b) => write!(f, "{b}"),
        }
    }
}
