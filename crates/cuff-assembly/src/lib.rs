pub mod binder;
pub mod config;
pub mod manifest;
pub mod materials;
pub mod medium;
pub mod nerve;
pub mod types;
pub mod unions;

use std::collections::BTreeMap;

use chrono::Utc;
use cuff_types::FeatureKind;
use feature_graph::{Identifier, IdentifierRegistry, PrimitiveTemplate};
use model_engine::{Container, ModelEngine};
use tracing::{info, instrument};

pub use binder::{InstanceSpec, Placement};
pub use config::{InstanceConfig, MaterialsConfig, ModelConfig};
pub use manifest::{BuildManifest, TemplateSummary};
pub use medium::MediumSide;
pub use nerve::NervePart;
pub use types::*;
pub use unions::UnionAggregator;

/// A template emitted as a part, ready to be instanced.
#[derive(Debug, Clone)]
pub struct BuiltTemplate {
    pub part: Identifier,
    pub template: PrimitiveTemplate,
    /// Catalog index whose points carry each instance's current source.
    pub point_source: Option<usize>,
}

/// The single owned build context for one document.
///
/// Holds the shared registry, the built templates, every placed instance
/// and the union memberships. All engine traffic goes through the
/// `&mut dyn ModelEngine` passed to each call, in call order.
#[derive(Debug, Default)]
pub struct Assembly {
    pub(crate) registry: IdentifierRegistry,
    pub(crate) templates: BTreeMap<String, BuiltTemplate>,
    pub(crate) instances: Vec<InstanceRecord>,
    pub(crate) unions: UnionAggregator,
    pub(crate) point_sources: Vec<PointSource>,
    pub(crate) materials: Vec<MaterialRecord>,
    pub(crate) links: Vec<MaterialLinkRecord>,
    pub(crate) nerve_parts: Vec<NerveRecord>,
    union_features: Vec<Identifier>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the template for a supported pseudonym and emit it as a part.
    ///
    /// Returns `None` when the recipe registered nothing; no part is created
    /// in that case and instances of the pseudonym stay unresolvable.
    #[instrument(skip(self, engine))]
    pub fn build_template(
        &mut self,
        pseudonym: &str,
        engine: &mut dyn ModelEngine,
    ) -> Result<Option<Identifier>, AssemblyError> {
        let definition =
            part_library::lookup(pseudonym).ok_or_else(|| AssemblyError::UnsupportedPrimitive {
                pseudonym: pseudonym.to_string(),
            })?;
        match definition.build()? {
            Some(template) => self
                .install_template(template, definition.point_source, engine)
                .map(Some),
            None => {
                info!("template registered nothing, not installed");
                Ok(None)
            }
        }
    }

    /// Emit an already built template as a part under its pseudonym.
    pub fn install_template(
        &mut self,
        template: PrimitiveTemplate,
        point_source: Option<usize>,
        engine: &mut dyn ModelEngine,
    ) -> Result<Identifier, AssemblyError> {
        if let Some(index) = point_source {
            template.catalog().get(index)?;
        }
        let part = self
            .registry
            .next(FeatureKind::Part.default_prefix(), Some(template.pseudonym()))?;
        let report = template.emit(&part, engine)?;
        info!(
            pseudonym = template.pseudonym(),
            identifier = %part,
            created = report.len(),
            "template installed"
        );
        self.templates.insert(
            template.pseudonym().to_string(),
            BuiltTemplate {
                part: part.clone(),
                template,
                point_source,
            },
        );
        Ok(part)
    }

    /// Emit the union features, run the shared geometry and summarise.
    #[instrument(skip_all)]
    pub fn finish(&mut self, engine: &mut dyn ModelEngine) -> Result<BuildManifest, AssemblyError> {
        let emitted = self.unions.emit(&mut self.registry, engine)?;
        self.union_features.extend(emitted);
        engine.run(&Container::Geometry)?;
        let manifest = self.manifest();
        info!(
            instances = manifest.instances.len(),
            unions = manifest.union_features.len(),
            "assembly finished"
        );
        Ok(manifest)
    }

    pub fn manifest(&self) -> BuildManifest {
        BuildManifest {
            built_at: Utc::now(),
            templates: self
                .templates
                .values()
                .map(|b| TemplateSummary {
                    pseudonym: b.template.pseudonym().to_string(),
                    part: b.part.clone(),
                    catalog: b.template.catalog().iter().cloned().collect(),
                })
                .collect(),
            instances: self.instances.clone(),
            nerve_parts: self.nerve_parts.clone(),
            unions: self
                .unions
                .iter()
                .map(|(group, members)| (group.label().to_string(), members.to_vec()))
                .collect(),
            union_features: self.union_features.clone(),
            point_sources: self.point_sources.clone(),
            materials: self.materials.clone(),
            material_links: self.links.clone(),
        }
    }

    pub fn registry(&self) -> &IdentifierRegistry {
        &self.registry
    }

    pub fn template(&self, pseudonym: &str) -> Option<&BuiltTemplate> {
        self.templates.get(pseudonym)
    }

    pub fn instances(&self) -> &[InstanceRecord] {
        &self.instances
    }

    pub fn instance(&self, label: &str) -> Option<&InstanceRecord> {
        self.instances.iter().find(|i| i.label == label)
    }

    pub fn unions(&self) -> &UnionAggregator {
        &self.unions
    }

    pub fn point_sources(&self) -> &[PointSource] {
        &self.point_sources
    }

    pub fn material_links(&self) -> &[MaterialLinkRecord] {
        &self.links
    }
}
