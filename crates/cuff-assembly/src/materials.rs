//! Material definitions and links onto retained instance domains.

use cuff_types::{EntityKind, FeatureKind, PropValue};
use feature_graph::Identifier;
use model_engine::{imported_selection_name, Container, ModelEngine};
use tracing::{debug, info, instrument};

use crate::binder::shared_label;
use crate::config::{Conductivity, InstanceConfig, MaterialsConfig, ModelConfig};
use crate::types::{AssemblyError, ConfigError, LinkReport, MaterialLinkRecord, MaterialRecord};
use crate::Assembly;

const MATERIAL_PARAMETERS: &str = "Material Parameters";

/// A link resolved against the instance, waiting to be emitted.
struct PendingLink {
    label: String,
    material: Identifier,
    selection: String,
}

impl Assembly {
    /// Define the model-level material for `function` with its conductivity
    /// parameters.
    #[instrument(skip(self, model, library, engine))]
    pub fn define_material(
        &mut self,
        function: &str,
        model: &ModelConfig,
        library: &MaterialsConfig,
        engine: &mut dyn ModelEngine,
    ) -> Result<Identifier, AssemblyError> {
        let (sigma, description) = model.conductivity(function, library)?;
        let axes = if sigma.is_anisotropic() {
            Some(anisotropic_axes(function, sigma)?)
        } else {
            None
        };
        self.ensure_unbound(function)?;

        let params = self.material_parameters(engine)?;
        let at = Container::Model;
        let id = self
            .registry
            .next(FeatureKind::Material.default_prefix(), Some(function))?;
        engine.create(&at, id.as_str(), FeatureKind::Material, None)?;
        engine.label(&at, id.as_str(), function)?;

        let conductivity = match axes {
            Some(axes) => {
                let mut names = Vec::with_capacity(3);
                for (axis, value) in ["x", "y", "z"].into_iter().zip(axes) {
                    let name = format!("sigma_{function}_{axis}");
                    set_parameter(engine, &params, &name, format!("({value})"), &description)?;
                    names.push(name);
                }
                let [x, y, z] = [&names[0], &names[1], &names[2]].map(String::as_str);
                PropValue::exprs([x, "0", "0", "0", y, "0", "0", "0", z])
            }
            None => {
                let name = format!("sigma_{function}");
                let value = format!("({}) {}", sigma.value, sigma.unit);
                set_parameter(engine, &params, &name, value.trim_end().to_string(), &description)?;
                PropValue::expr(name)
            }
        };
        engine.set(&at, id.as_str(), "electricconductivity", conductivity)?;

        info!(identifier = %id, %description, "material defined");
        self.materials.push(MaterialRecord {
            id: id.clone(),
            function: function.to_string(),
            description,
        });
        Ok(id)
    }

    /// Link the materials of an instance document onto the instance's
    /// retained domains.
    ///
    /// Entries whose domain was discarded at bind time are skipped. An index
    /// outside the template catalog, an undefined material or a link that
    /// already exists fails before any link is emitted.
    #[instrument(skip(self, config, engine))]
    pub fn link_materials(
        &mut self,
        instance_label: &str,
        config: &InstanceConfig,
        engine: &mut dyn ModelEngine,
    ) -> Result<LinkReport, AssemblyError> {
        let instance = self
            .instances
            .iter()
            .find(|i| i.label == instance_label)
            .ok_or_else(|| AssemblyError::UnknownInstance {
                label: instance_label.to_string(),
            })?;
        let built = self
            .templates
            .get(&instance.pseudonym)
            .ok_or_else(|| AssemblyError::MissingTemplate {
                pseudonym: instance.pseudonym.clone(),
            })?;
        let catalog = built.template.catalog();

        let mut report = LinkReport::default();
        let mut pending = Vec::new();
        for assignment in &config.materials {
            let entry = catalog.get(assignment.label_index)?;
            let shared = shared_label(instance_label, &entry.label);
            let domain_kept = instance
                .keep
                .get(assignment.label_index)
                .is_some_and(|k| k.domain);
            if !self.registry.has(&shared) || !domain_kept {
                debug!(selection = %entry.label, info = %assignment.info, "domain not retained, link skipped");
                report.skipped.push(entry.label.clone());
                continue;
            }
            let label = [instance_label, entry.label.as_str(), assignment.info.as_str()].join("/");
            self.ensure_unbound(&label)?;
            if pending.iter().any(|p: &PendingLink| p.label == label) {
                return Err(AssemblyError::DuplicateMaterialLink { label });
            }
            pending.push(PendingLink {
                label,
                material: self.registry.get(&assignment.info)?,
                selection: imported_selection_name(
                    instance.id.as_str(),
                    entry.id.as_str(),
                    EntityKind::Domain,
                ),
            });
        }

        let at = Container::Materials;
        for link in pending {
            let id = self
                .registry
                .next(FeatureKind::MaterialLink.default_prefix(), Some(&link.label))?;
            engine.create(&at, id.as_str(), FeatureKind::MaterialLink, None)?;
            engine.label(&at, id.as_str(), &link.label)?;
            engine.set(&at, id.as_str(), "link", PropValue::expr(link.material.as_str()))?;
            engine.select_named(&at, id.as_str(), None, &link.selection)?;
            report.linked.push(id.clone());
            self.links.push(MaterialLinkRecord {
                id,
                label: link.label,
                material: link.material,
                selection: link.selection,
            });
        }
        info!(
            linked = report.linked.len(),
            skipped = report.skipped.len(),
            "materials linked"
        );
        Ok(report)
    }

    /// The model parameter group holding conductivities, created on first use.
    fn material_parameters(
        &mut self,
        engine: &mut dyn ModelEngine,
    ) -> Result<Identifier, AssemblyError> {
        if let Ok(id) = self.registry.get(MATERIAL_PARAMETERS) {
            return Ok(id);
        }
        let id = self.registry.next(
            FeatureKind::ParameterGroup.default_prefix(),
            Some(MATERIAL_PARAMETERS),
        )?;
        engine.create(&Container::Model, id.as_str(), FeatureKind::ParameterGroup, None)?;
        engine.label(&Container::Model, id.as_str(), MATERIAL_PARAMETERS)?;
        Ok(id)
    }
}

fn anisotropic_axes(function: &str, sigma: &Conductivity) -> Result<[String; 3], ConfigError> {
    let axis = |value: &Option<String>, key: &str| {
        value
            .clone()
            .ok_or_else(|| ConfigError::MissingRequiredConfiguration {
                context: format!("anisotropic conductivity of {function}"),
                key: key.to_string(),
            })
    };
    Ok([
        axis(&sigma.sigma_x, "sigma_x")?,
        axis(&sigma.sigma_y, "sigma_y")?,
        axis(&sigma.sigma_z, "sigma_z")?,
    ])
}

fn set_parameter(
    engine: &mut dyn ModelEngine,
    group: &Identifier,
    name: &str,
    value: String,
    description: &str,
) -> Result<(), AssemblyError> {
    let at = Container::Model;
    engine.set_entry(&at, group.as_str(), "param", name, PropValue::Expr(value))?;
    engine.set_entry(&at, group.as_str(), "descr", name, PropValue::expr(description))?;
    Ok(())
}
