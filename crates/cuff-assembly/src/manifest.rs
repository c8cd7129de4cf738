use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use feature_graph::{CatalogEntry, Identifier};
use serde::{Deserialize, Serialize};

use crate::types::{InstanceRecord, MaterialLinkRecord, MaterialRecord, NerveRecord, PointSource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub pseudonym: String,
    pub part: Identifier,
    pub catalog: Vec<CatalogEntry>,
}

/// Summary of a finished build, handed to the material and mesh stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub built_at: DateTime<Utc>,
    pub templates: Vec<TemplateSummary>,
    pub instances: Vec<InstanceRecord>,
    pub nerve_parts: Vec<NerveRecord>,
    /// Union group label to member identifiers.
    pub unions: BTreeMap<String, Vec<Identifier>>,
    /// Union features emitted for the non-empty groups.
    pub union_features: Vec<Identifier>,
    pub point_sources: Vec<PointSource>,
    pub materials: Vec<MaterialRecord>,
    pub material_links: Vec<MaterialLinkRecord>,
}

impl BuildManifest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn instance(&self, label: &str) -> Option<&InstanceRecord> {
        self.instances.iter().find(|i| i.label == label)
    }
}
