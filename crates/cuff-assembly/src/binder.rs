//! Instance binding: placing a built template into the shared geometry.

use std::collections::BTreeMap;

use cuff_types::{Dimension, EntityKind, FeatureKind, KeepFlags, PrimitiveKind, PropValue, UnionGroup};
use feature_graph::{CatalogEntry, Identifier, RegistryError};
use model_engine::{imported_selection_name, keep_entry_key, Container, ModelEngine};
use tracing::{debug, info, instrument};

use crate::config::InstanceConfig;
use crate::types::{AssemblyError, ConfigError, InstanceRecord, PointSource};
use crate::Assembly;

/// Displacement and rotation of a placed instance, as expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub displacement: [String; 3],
    pub rotation: Option<String>,
}

impl Placement {
    /// Cuff placement driven by `<name>_<index>_cuff_shift_x|y|z` and
    /// `<name>_<index>_cuff_rot`.
    pub fn cuff(name: &str, index: usize) -> Self {
        let prefix = format!("{name}_{index}_cuff");
        Self {
            displacement: [
                format!("{prefix}_shift_x"),
                format!("{prefix}_shift_y"),
                format!("{prefix}_shift_z"),
            ],
            rotation: Some(format!("{prefix}_rot")),
        }
    }

    /// Add `offset` to the rotation expression.
    pub fn rotated_by(mut self, offset: &str) -> Self {
        self.rotation = Some(match self.rotation {
            Some(rotation) => format!("{rotation} + {offset}"),
            None => offset.to_string(),
        });
        self
    }

    /// Pure translation.
    pub fn shift(x: &str, y: &str, z: &str) -> Self {
        Self {
            displacement: [x.to_string(), y.to_string(), z.to_string()],
            rotation: None,
        }
    }
}

/// Everything needed to bind one instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceSpec {
    pub label: String,
    pub pseudonym: String,
    /// Parameter name to expression. Must cover every template parameter.
    pub params: BTreeMap<String, String>,
    /// Per-entry keep flags; `None` uses the catalog's declared policy.
    pub keep: Option<Vec<KeepFlags>>,
    pub placement: Option<Placement>,
    pub cuff_index: Option<usize>,
    /// Groups the placed instance joins.
    pub unions: Vec<UnionGroup>,
}

impl InstanceSpec {
    pub fn new(label: &str, pseudonym: &str) -> Self {
        Self {
            label: label.to_string(),
            pseudonym: pseudonym.to_string(),
            ..Default::default()
        }
    }

    /// A cuff component: placed by [`Placement::cuff`] and tagged with its
    /// cuff index.
    ///
    /// Helical cuffs also turn by the cuff's `corr_LN` correction.
    pub fn cuff(label: &str, pseudonym: &str, cuff_name: &str, index: usize) -> Self {
        let mut placement = Placement::cuff(cuff_name, index);
        if PrimitiveKind::from_pseudonym(pseudonym) == Some(PrimitiveKind::HelicalCuffnContact) {
            placement = placement.rotated_by("corr_LN");
        }
        Self {
            placement: Some(placement),
            cuff_index: Some(index),
            ..Self::new(label, pseudonym)
        }
    }

    pub fn param(mut self, name: &str, expr: &str) -> Self {
        self.params.insert(name.to_string(), expr.to_string());
        self
    }

    /// Take every parameter from an instance document.
    pub fn params_from(mut self, config: &InstanceConfig) -> Self {
        self.params
            .extend(config.def.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn keep<I, K>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<KeepFlags>,
    {
        self.keep = Some(flags.into_iter().map(Into::into).collect());
        self
    }

    pub fn placed(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn union(mut self, group: UnionGroup) -> Self {
        self.unions.push(group);
        self
    }
}

/// Instance settings resolved against a template, before anything is sent.
struct ResolvedInstance {
    part: Identifier,
    inputs: Vec<(String, String)>,
    catalog: Vec<CatalogEntry>,
    keep: Vec<KeepFlags>,
    /// Shared-scope label per catalog entry, `None` when discarded.
    shared: Vec<Option<String>>,
    point_source: Option<CatalogEntry>,
    environment: bool,
}

impl Assembly {
    /// Place an instance of a built template into the shared geometry.
    ///
    /// Every check runs before the first command is sent, so a failing
    /// instance leaves the document untouched.
    #[instrument(skip_all, fields(instance = %spec.label, pseudonym = %spec.pseudonym))]
    pub fn bind_instance(
        &mut self,
        spec: &InstanceSpec,
        engine: &mut dyn ModelEngine,
    ) -> Result<InstanceRecord, AssemblyError> {
        let resolved = self.resolve_instance(spec)?;
        let at = Container::Geometry;

        let id = self
            .registry
            .next(FeatureKind::PartInstance.default_prefix(), Some(&spec.label))?;
        let inst = id.as_str();
        engine.create(&at, inst, FeatureKind::PartInstance, None)?;
        engine.label(&at, inst, &spec.label)?;
        engine.set(&at, inst, "part", PropValue::expr(resolved.part.as_str()))?;
        if let Some(placement) = &spec.placement {
            engine.set(&at, inst, "displ", PropValue::exprs(placement.displacement.clone()))?;
            if let Some(rot) = &placement.rotation {
                engine.set(&at, inst, "rot", PropValue::expr(rot.as_str()))?;
            }
        }
        for (name, expr) in &resolved.inputs {
            engine.set_entry(&at, inst, "inputexpr", name, PropValue::expr(expr.as_str()))?;
        }

        engine.set(&at, inst, "selkeepnoncontr", PropValue::Bool(false))?;
        let mut retained = Vec::new();
        for ((entry, keep), shared) in resolved
            .catalog
            .iter()
            .zip(&resolved.keep)
            .zip(&resolved.shared)
        {
            for kind in EntityKind::ALL {
                let key = keep_entry_key(inst, entry.id.as_str(), kind);
                let switch = if keep.keeps(kind) { "on" } else { "off" };
                engine.set_entry(&at, inst, kind.keep_property(), &key, PropValue::expr(switch))?;
            }
            match shared {
                Some(shared) => {
                    self.registry.bind(shared, id.scoped(&entry.id))?;
                    retained.push(shared.clone());
                }
                None => debug!(selection = %entry.label, "selection discarded on import"),
            }
        }

        let point_source = match &resolved.point_source {
            Some(entry) => Some(self.add_point_source(spec, &id, entry, engine)?),
            None => None,
        };

        self.unions.contribute(&id, &spec.unions);

        let record = InstanceRecord {
            id,
            label: spec.label.clone(),
            pseudonym: spec.pseudonym.clone(),
            environment: resolved.environment,
            keep: resolved.keep,
            retained,
            point_source,
        };
        info!(
            identifier = %record.id,
            retained = record.retained.len(),
            "instance bound"
        );
        self.instances.push(record.clone());
        Ok(record)
    }

    fn resolve_instance(&self, spec: &InstanceSpec) -> Result<ResolvedInstance, AssemblyError> {
        let kind = PrimitiveKind::from_pseudonym(&spec.pseudonym);
        let built = match self.templates.get(&spec.pseudonym) {
            Some(built) => built,
            None if kind.is_none() => {
                return Err(AssemblyError::UnsupportedPrimitive {
                    pseudonym: spec.pseudonym.clone(),
                })
            }
            None => {
                return Err(AssemblyError::MissingTemplate {
                    pseudonym: spec.pseudonym.clone(),
                })
            }
        };
        self.ensure_unbound(&spec.label)?;

        let template = &built.template;
        let mut inputs = Vec::with_capacity(template.parameters().len());
        for name in template.parameter_names() {
            let expr = spec
                .params
                .get(name)
                .ok_or_else(|| ConfigError::MissingRequiredConfiguration {
                    context: format!("instance {}", spec.label),
                    key: name.to_string(),
                })?;
            inputs.push((name.to_string(), expr.clone()));
        }

        let catalog: Vec<CatalogEntry> = template.catalog().iter().cloned().collect();
        let keep = spec
            .keep
            .clone()
            .unwrap_or_else(|| template.catalog().keep_vector());
        if keep.len() != catalog.len() {
            return Err(AssemblyError::KeepVectorMismatch {
                instance: spec.label.clone(),
                expected: catalog.len(),
                found: keep.len(),
            });
        }

        // Catalog labels are unique within the template, so these are too.
        let mut shared = Vec::with_capacity(catalog.len());
        for (entry, flags) in catalog.iter().zip(&keep) {
            if !flags.retains_any() {
                shared.push(None);
                continue;
            }
            let label = shared_label(&spec.label, &entry.label);
            self.ensure_unbound(&label)?;
            shared.push(Some(label));
        }

        let point_source = match built.point_source {
            Some(index) => {
                let entry = template.catalog().get(index)?;
                if !keep[index].point {
                    return Err(AssemblyError::SelectionNotRetained {
                        instance: spec.label.clone(),
                        selection: entry.label.clone(),
                        level: "points",
                    });
                }
                self.ensure_unbound(&point_source_label(&spec.label))?;
                Some(entry.clone())
            }
            None => None,
        };

        Ok(ResolvedInstance {
            part: built.part.clone(),
            inputs,
            catalog,
            keep,
            shared,
            point_source,
            environment: kind.is_some_and(PrimitiveKind::is_environment),
        })
    }

    /// `DuplicateLabel` if `label` is already bound in the shared scope.
    pub(crate) fn ensure_unbound(&self, label: &str) -> Result<(), AssemblyError> {
        match self.registry.get(label) {
            Ok(existing) => Err(RegistryError::DuplicateLabel {
                label: label.to_string(),
                existing,
            }
            .into()),
            Err(_) => Ok(()),
        }
    }

    fn add_point_source(
        &mut self,
        spec: &InstanceSpec,
        instance: &Identifier,
        entry: &CatalogEntry,
        engine: &mut dyn ModelEngine,
    ) -> Result<Identifier, AssemblyError> {
        let at = Container::Physics;
        let label = point_source_label(&spec.label);
        let pcs = self
            .registry
            .next(FeatureKind::PointCurrentSource.default_prefix(), Some(&label))?;
        engine.create(&at, pcs.as_str(), FeatureKind::PointCurrentSource, Some(Dimension::Points))?;
        engine.label(&at, pcs.as_str(), &label)?;
        let selection = imported_selection_name(instance.as_str(), entry.id.as_str(), EntityKind::Point);
        engine.select_named(&at, pcs.as_str(), None, &selection)?;
        engine.set(&at, pcs.as_str(), "Qjp", PropValue::Number(0.0))?;
        self.point_sources.push(PointSource {
            name: spec.label.clone(),
            pcs: pcs.clone(),
            cuff_index: spec.cuff_index,
        });
        Ok(pcs)
    }
}

fn point_source_label(instance_label: &str) -> String {
    format!("{instance_label} Current Source")
}

/// Shared-scope label of an instance's retained selection.
pub fn shared_label(instance_label: &str, selection_label: &str) -> String {
    format!("{instance_label}_{selection_label}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuff_placement_uses_indexed_expressions() {
        let p = Placement::cuff("LivaNova", 1);
        assert_eq!(p.displacement[2], "LivaNova_1_cuff_shift_z");
        assert_eq!(p.rotation.as_deref(), Some("LivaNova_1_cuff_rot"));
    }

    #[test]
    fn helical_cuff_rotation_includes_correction() {
        let spec = InstanceSpec::cuff("Helix", "HelicalCuffnContact_Primitive", "LivaNova", 0);
        assert_eq!(
            spec.placement.and_then(|p| p.rotation).as_deref(),
            Some("LivaNova_0_cuff_rot + corr_LN")
        );
        let spec = InstanceSpec::cuff("Tube", "TubeCuff_Primitive", "LivaNova", 0);
        assert_eq!(
            spec.placement.and_then(|p| p.rotation).as_deref(),
            Some("LivaNova_0_cuff_rot")
        );
    }

    #[test]
    fn bool_keep_flags_convert() {
        let spec = InstanceSpec::new("inst1", "T").keep([true, false]);
        assert_eq!(spec.keep, Some(vec![KeepFlags::ALL, KeepFlags::NONE]));
    }

    #[test]
    fn params_from_document_override_earlier_values() {
        let mut cfg = InstanceConfig::default();
        cfg.def.insert("R_in".into(), "r_cuff".into());
        let spec = InstanceSpec::new("c", "T")
            .param("R_in", "1 [mm]")
            .params_from(&cfg);
        assert_eq!(spec.params["R_in"], "r_cuff");
    }
}
