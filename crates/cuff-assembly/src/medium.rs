use cuff_types::{Dimension, EntityKind, FeatureKind, PrimitiveKind};
use feature_graph::Identifier;
use model_engine::{imported_selection_name, Container, ModelEngine};
use part_library::medium::MEDIUM;
use tracing::{info, instrument};

use crate::binder::{InstanceSpec, Placement};
use crate::config::ModelConfig;
use crate::types::{AssemblyError, InstanceRecord};
use crate::Assembly;

const GROUND: &str = "Ground";

/// The two surrounding media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediumSide {
    Proximal,
    Distal,
}

impl MediumSide {
    pub fn label(self) -> &'static str {
        match self {
            MediumSide::Proximal => "ProximalMedium",
            MediumSide::Distal => "DistalMedium",
        }
    }

    pub fn spec(self) -> InstanceSpec {
        let spec = InstanceSpec::new(self.label(), PrimitiveKind::Medium.pseudonym());
        match self {
            MediumSide::Proximal => spec.param("radius", "r_proximal").param("length", "z_nerve"),
            MediumSide::Distal => spec
                .param("radius", "r_distal")
                .param("length", "z_distal")
                .placed(Placement::shift(
                    "distal_shift_x",
                    "distal_shift_y",
                    "distal_shift_z",
                )),
        }
    }
}

impl Assembly {
    /// Place the proximal medium, the distal one when configured, and a
    /// distant ground on the outermost medium's boundary when requested.
    #[instrument(skip_all)]
    pub fn add_media(
        &mut self,
        config: &ModelConfig,
        engine: &mut dyn ModelEngine,
    ) -> Result<Vec<InstanceRecord>, AssemblyError> {
        let ground = if config.medium.distant_ground {
            Some(self.medium_boundary()?)
        } else {
            None
        };
        let mut sides = vec![MediumSide::Proximal];
        if config.medium.distal {
            sides.push(MediumSide::Distal);
        }
        let mut placed = Vec::with_capacity(sides.len());
        for side in sides {
            placed.push(self.bind_instance(&side.spec(), engine)?);
        }
        if let (Some(index), Some(outer)) = (ground, placed.last()) {
            self.add_ground(outer, index, engine)?;
        }
        Ok(placed)
    }

    /// Catalog index of the medium selection the ground attaches to.
    fn medium_boundary(&self) -> Result<usize, AssemblyError> {
        let pseudonym = PrimitiveKind::Medium.pseudonym();
        let built = self
            .templates
            .get(pseudonym)
            .ok_or_else(|| AssemblyError::MissingTemplate {
                pseudonym: pseudonym.to_string(),
            })?;
        built
            .template
            .catalog()
            .position(MEDIUM)
            .ok_or_else(|| AssemblyError::MissingSelection {
                pseudonym: pseudonym.to_string(),
                selection: MEDIUM.to_string(),
            })
    }

    fn add_ground(
        &mut self,
        medium: &InstanceRecord,
        index: usize,
        engine: &mut dyn ModelEngine,
    ) -> Result<Identifier, AssemblyError> {
        let built = self
            .templates
            .get(&medium.pseudonym)
            .ok_or_else(|| AssemblyError::MissingTemplate {
                pseudonym: medium.pseudonym.clone(),
            })?;
        let entry = built.template.catalog().get(index)?;
        if !medium.keep[index].boundary {
            return Err(AssemblyError::SelectionNotRetained {
                instance: medium.label.clone(),
                selection: entry.label.clone(),
                level: "boundaries",
            });
        }
        let selection = imported_selection_name(medium.id.as_str(), entry.id.as_str(), EntityKind::Boundary);

        let at = Container::Physics;
        let gnd = self
            .registry
            .next(FeatureKind::Ground.default_prefix(), Some(GROUND))?;
        engine.create(&at, gnd.as_str(), FeatureKind::Ground, Some(Dimension::Surfaces))?;
        engine.label(&at, gnd.as_str(), GROUND)?;
        engine.select_named(&at, gnd.as_str(), None, &selection)?;
        info!(identifier = %gnd, medium = %medium.label, "distant ground placed");
        Ok(gnd)
    }
}
