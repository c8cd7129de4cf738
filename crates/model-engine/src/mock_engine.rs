//! RecordingEngine: deterministic test double implementing ModelEngine.
//!
//! Records every command in order and applies the engine's name-resolution
//! rules: a feature must exist before it is configured, a selection must
//! exist before it is consumed, and part-instance keep switches expose
//! `geom1_<instance>_<selection>_<suffix>` names to the rest of the model.

use std::collections::{BTreeSet, HashMap, HashSet};

use cuff_types::{Dimension, EntityKind, FeatureKind, PropValue};

use crate::traits::ModelEngine;
use crate::types::{Container, EngineCommand, EngineError, SHARED_GEOMETRY};

/// A feature as the mock engine sees it.
#[derive(Debug, Clone)]
pub struct RecordedFeature {
    pub id: String,
    pub kind: FeatureKind,
    pub dim: Option<Dimension>,
    pub label: Option<String>,
    pub properties: HashMap<String, PropValue>,
    pub entries: HashMap<(String, String), PropValue>,
    /// `(input, selection)` pairs in the order they were set.
    pub inputs: Vec<(Option<String>, String)>,
}

impl RecordedFeature {
    fn new(id: &str, kind: FeatureKind, dim: Option<Dimension>) -> Self {
        Self {
            id: id.to_string(),
            kind,
            dim,
            label: None,
            properties: HashMap::new(),
            entries: HashMap::new(),
            inputs: Vec::new(),
        }
    }
}

/// Deterministic recording double for the modeling engine.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    commands: Vec<EngineCommand>,
    features: HashMap<Container, Vec<RecordedFeature>>,
    /// Cumulative selections created per container.
    selections: HashMap<Container, HashSet<String>>,
    /// Selections exported from part instances into the shared geometry.
    imported: BTreeSet<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command accepted so far, in submission order.
    pub fn commands(&self) -> &[EngineCommand] {
        &self.commands
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Features of a container in creation order.
    pub fn features_in(&self, at: &Container) -> &[RecordedFeature] {
        self.features.get(at).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn feature(&self, at: &Container, id: &str) -> Option<&RecordedFeature> {
        self.features_in(at).iter().find(|f| f.id == id)
    }

    pub fn has_feature(&self, at: &Container, id: &str) -> bool {
        self.feature(at, id).is_some()
    }

    /// Features of `kind` in `at`, in creation order.
    pub fn features_of_kind(&self, at: &Container, kind: FeatureKind) -> Vec<&RecordedFeature> {
        self.features_in(at)
            .iter()
            .filter(|f| f.kind == kind)
            .collect()
    }

    pub fn property(&self, at: &Container, id: &str, property: &str) -> Option<&PropValue> {
        self.feature(at, id)?.properties.get(property)
    }

    pub fn entry(&self, at: &Container, id: &str, property: &str, key: &str) -> Option<&PropValue> {
        self.feature(at, id)?
            .entries
            .get(&(property.to_string(), key.to_string()))
    }

    /// Names exported into the shared geometry by part-instance keep switches.
    pub fn imported_selections(&self) -> impl Iterator<Item = &str> {
        self.imported.iter().map(String::as_str)
    }

    /// Containers that were run, in order.
    pub fn runs(&self) -> Vec<&Container> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                EngineCommand::Run { at } => Some(at),
                _ => None,
            })
            .collect()
    }

    fn ensure_container(&self, at: &Container) -> Result<(), EngineError> {
        match at {
            Container::Part { part } => {
                let exists = self
                    .features_in(&Container::Model)
                    .iter()
                    .any(|f| f.id == *part && f.kind == FeatureKind::Part);
                if !exists {
                    return Err(EngineError::UnknownFeature {
                        container: Container::Model.to_string(),
                        id: part.clone(),
                    });
                }
            }
            Container::WorkPlane { parent, plane } => {
                let exists = self
                    .features_in(parent)
                    .iter()
                    .any(|f| f.id == *plane && f.kind == FeatureKind::WorkPlane);
                if !exists {
                    return Err(EngineError::UnknownFeature {
                        container: parent.to_string(),
                        id: plane.clone(),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn feature_mut(&mut self, at: &Container, id: &str) -> Result<&mut RecordedFeature, EngineError> {
        self.features
            .get_mut(at)
            .and_then(|fs| fs.iter_mut().find(|f| f.id == id))
            .ok_or_else(|| EngineError::UnknownFeature {
                container: at.to_string(),
                id: id.to_string(),
            })
    }

    fn local_selection(&self, at: &Container, name: &str) -> bool {
        self.selections
            .get(at)
            .is_some_and(|set| set.contains(name))
    }

    /// Resolve a model-wide selection name: either an instance import or a
    /// cumulative selection of the shared geometry (`geom1_<csel>_<suffix>`).
    fn global_selection(&self, name: &str) -> bool {
        if self.imported.contains(name) {
            return true;
        }
        let Some(rest) = name.strip_prefix(&format!("{SHARED_GEOMETRY}_")) else {
            return false;
        };
        EntityKind::ALL.into_iter().any(|kind| {
            rest.strip_suffix(&format!("_{}", kind.suffix()))
                .is_some_and(|csel| self.local_selection(&Container::Geometry, csel))
        })
    }

    fn selection_visible(&self, at: &Container, name: &str) -> bool {
        if at.is_geometry() && (self.local_selection(at, name) || self.plane_selection(at, name)) {
            return true;
        }
        self.global_selection(name)
    }

    /// `<plane>_<csel>`: a selection of a work plane's geometry seen from
    /// the container holding the plane.
    fn plane_selection(&self, at: &Container, name: &str) -> bool {
        self.features_of_kind(at, FeatureKind::WorkPlane)
            .into_iter()
            .any(|wp| {
                name.strip_prefix(&format!("{}_", wp.id))
                    .is_some_and(|csel| self.local_selection(&at.work_plane(wp.id.as_str()), csel))
            })
    }

    fn apply_keep_switch(&mut self, key: &str, value: &PropValue) {
        let Some((base, suffix)) = key.rsplit_once('.') else {
            return;
        };
        let name = format!("{SHARED_GEOMETRY}_{base}_{suffix}");
        if value.as_expr() == Some("on") {
            self.imported.insert(name);
        } else {
            self.imported.remove(&name);
        }
    }
}

impl ModelEngine for RecordingEngine {
    fn create(
        &mut self,
        at: &Container,
        id: &str,
        kind: FeatureKind,
        dim: Option<Dimension>,
    ) -> Result<(), EngineError> {
        self.ensure_container(at)?;
        if self.has_feature(at, id) {
            return Err(EngineError::DuplicateIdentifier {
                container: at.to_string(),
                id: id.to_string(),
            });
        }
        self.features
            .entry(at.clone())
            .or_default()
            .push(RecordedFeature::new(id, kind, dim));
        if kind == FeatureKind::CumulativeSelection {
            self.selections
                .entry(at.clone())
                .or_default()
                .insert(id.to_string());
        }
        self.commands.push(EngineCommand::Create {
            at: at.clone(),
            id: id.to_string(),
            kind,
            dim,
        });
        Ok(())
    }

    fn label(&mut self, at: &Container, id: &str, text: &str) -> Result<(), EngineError> {
        self.feature_mut(at, id)?.label = Some(text.to_string());
        self.commands.push(EngineCommand::Label {
            at: at.clone(),
            id: id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn set(
        &mut self,
        at: &Container,
        id: &str,
        property: &str,
        value: PropValue,
    ) -> Result<(), EngineError> {
        if property == "contributeto" {
            let target = value.as_expr().unwrap_or_default();
            if !self.local_selection(at, target) {
                return Err(EngineError::UnknownSelection {
                    container: at.to_string(),
                    name: target.to_string(),
                });
            }
        }
        if property.starts_with("selection.") {
            if let PropValue::Exprs(features) = &value {
                if let Some(missing) = features.iter().find(|f| !self.has_feature(at, f)) {
                    return Err(EngineError::UnknownFeature {
                        container: at.to_string(),
                        id: missing.clone(),
                    });
                }
            }
        }
        self.feature_mut(at, id)?
            .properties
            .insert(property.to_string(), value.clone());
        self.commands.push(EngineCommand::Set {
            at: at.clone(),
            id: id.to_string(),
            property: property.to_string(),
            value,
        });
        Ok(())
    }

    fn set_entry(
        &mut self,
        at: &Container,
        id: &str,
        property: &str,
        key: &str,
        value: PropValue,
    ) -> Result<(), EngineError> {
        let feature = self.feature_mut(at, id)?;
        let is_instance = feature.kind == FeatureKind::PartInstance;
        feature
            .entries
            .insert((property.to_string(), key.to_string()), value.clone());
        if is_instance && property.starts_with("selkeep") {
            self.apply_keep_switch(key, &value);
        }
        self.commands.push(EngineCommand::SetEntry {
            at: at.clone(),
            id: id.to_string(),
            property: property.to_string(),
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    fn select_named(
        &mut self,
        at: &Container,
        id: &str,
        input: Option<&str>,
        selection: &str,
    ) -> Result<(), EngineError> {
        if !self.selection_visible(at, selection) {
            return Err(EngineError::UnknownSelection {
                container: at.to_string(),
                name: selection.to_string(),
            });
        }
        self.feature_mut(at, id)?
            .inputs
            .push((input.map(str::to_string), selection.to_string()));
        self.commands.push(EngineCommand::SelectNamed {
            at: at.clone(),
            id: id.to_string(),
            input: input.map(str::to_string),
            selection: selection.to_string(),
        });
        Ok(())
    }

    fn has_selection(&self, name: &str) -> bool {
        self.global_selection(name)
    }

    fn run(&mut self, at: &Container) -> Result<(), EngineError> {
        self.ensure_container(at)?;
        self.commands.push(EngineCommand::Run { at: at.clone() });
        Ok(())
    }
}
