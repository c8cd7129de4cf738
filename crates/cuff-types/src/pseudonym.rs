use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed vocabulary of part primitives that are built once as a template
/// and then instanced into the shared geometry.
///
/// Adding a kind means adding a definition to the part library; there is no
/// plugin path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveKind {
    #[serde(rename = "Medium_Primitive")]
    Medium,
    #[serde(rename = "TubeCuff_Primitive")]
    TubeCuff,
    #[serde(rename = "TubeCuffSweep_Primitive")]
    TubeCuffSweep,
    #[serde(rename = "RibbonContact_Primitive")]
    RibbonContact,
    #[serde(rename = "WireContact_Primitive")]
    WireContact,
    #[serde(rename = "CircleContact_Primitive")]
    CircleContact,
    #[serde(rename = "CuffFill_Primitive")]
    CuffFill,
    #[serde(rename = "HelicalCuffnContact_Primitive")]
    HelicalCuffnContact,
    #[serde(rename = "RectangleContact_Primitive")]
    RectangleContact,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Medium,
        PrimitiveKind::TubeCuff,
        PrimitiveKind::TubeCuffSweep,
        PrimitiveKind::RibbonContact,
        PrimitiveKind::WireContact,
        PrimitiveKind::CircleContact,
        PrimitiveKind::CuffFill,
        PrimitiveKind::HelicalCuffnContact,
        PrimitiveKind::RectangleContact,
    ];

    pub fn pseudonym(self) -> &'static str {
        match self {
            PrimitiveKind::Medium => "Medium_Primitive",
            PrimitiveKind::TubeCuff => "TubeCuff_Primitive",
            PrimitiveKind::TubeCuffSweep => "TubeCuffSweep_Primitive",
            PrimitiveKind::RibbonContact => "RibbonContact_Primitive",
            PrimitiveKind::WireContact => "WireContact_Primitive",
            PrimitiveKind::CircleContact => "CircleContact_Primitive",
            PrimitiveKind::CuffFill => "CuffFill_Primitive",
            PrimitiveKind::HelicalCuffnContact => "HelicalCuffnContact_Primitive",
            PrimitiveKind::RectangleContact => "RectangleContact_Primitive",
        }
    }

    pub fn from_pseudonym(pseudonym: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.pseudonym() == pseudonym)
    }

    /// Environment primitives are placed without cuff displacement/rotation.
    pub fn is_environment(self) -> bool {
        matches!(self, PrimitiveKind::Medium)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pseudonym())
    }
}

/// Nerve cross-section parts, built directly into the shared geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NervePartKind {
    /// Fascicle with perineurium as a contact impedance on the endoneurium.
    FascicleCI,
    /// Fascicle with meshed perineurium between outer and inner traces.
    FascicleMesh,
    /// Circular epineurium of radius `r_nerve`.
    #[serde(rename = "Epi_circle")]
    EpiCircle,
    /// Epineurium from a traced nerve boundary.
    #[serde(rename = "Epi_trace")]
    EpiTrace,
}

impl NervePartKind {
    pub const ALL: [NervePartKind; 4] = [
        NervePartKind::FascicleCI,
        NervePartKind::FascicleMesh,
        NervePartKind::EpiCircle,
        NervePartKind::EpiTrace,
    ];

    pub fn pseudonym(self) -> &'static str {
        match self {
            NervePartKind::FascicleCI => "FascicleCI",
            NervePartKind::FascicleMesh => "FascicleMesh",
            NervePartKind::EpiCircle => "Epi_circle",
            NervePartKind::EpiTrace => "Epi_trace",
        }
    }

    pub fn from_pseudonym(pseudonym: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.pseudonym() == pseudonym)
    }
}

impl fmt::Display for NervePartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pseudonym())
    }
}
