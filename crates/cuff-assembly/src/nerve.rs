use cuff_types::{Dimension, FeatureKind, NervePartKind, PropValue};
use feature_graph::{submit, GraphBuilder, Identifier};
use model_engine::{Container, ModelEngine, SHARED_GEOMETRY};
use part_library::nerve::{build_epi_circle, build_epi_trace, build_fascicle_ci, build_fascicle_mesh};
use part_library::{NervePartBuild, TraceFile};
use tracing::{info, instrument};

use crate::config::{ModelConfig, Tolerance};
use crate::types::{AssemblyError, NerveRecord};
use crate::Assembly;

const CONTACT_IMPEDANCES: &str = "Contact Impedances";

/// A nerve part to build, with its trace files.
#[derive(Debug, Clone, PartialEq)]
pub enum NervePart {
    FascicleCI {
        index: usize,
        inner: TraceFile,
        /// Surface resistivity expression for the perineurium impedance.
        rhos: Option<String>,
    },
    FascicleMesh {
        index: usize,
        inners: Vec<TraceFile>,
        outer: TraceFile,
    },
    EpiCircle,
    EpiTrace {
        nerve: TraceFile,
    },
}

impl NervePart {
    pub fn kind(&self) -> NervePartKind {
        match self {
            NervePart::FascicleCI { .. } => NervePartKind::FascicleCI,
            NervePart::FascicleMesh { .. } => NervePartKind::FascicleMesh,
            NervePart::EpiCircle => NervePartKind::EpiCircle,
            NervePart::EpiTrace { .. } => NervePartKind::EpiTrace,
        }
    }
}

impl Assembly {
    /// Build a nerve part straight into the shared geometry.
    #[instrument(skip_all, fields(kind = %part.kind()))]
    pub fn add_nerve_part(
        &mut self,
        part: &NervePart,
        config: &ModelConfig,
        engine: &mut dyn ModelEngine,
    ) -> Result<NerveRecord, AssemblyError> {
        // Tolerances resolve before the builder touches the registry.
        let (built, graph) = {
            let mut g = GraphBuilder::new(&mut self.registry);
            let built = match part {
                NervePart::FascicleCI { index, inner, .. } => {
                    let rtol = config.interp_tolerance(Tolerance::Inner)?;
                    build_fascicle_ci(&mut g, *index, inner, rtol)?
                }
                NervePart::FascicleMesh {
                    index,
                    inners,
                    outer,
                } => {
                    let inner_rtol = config.interp_tolerance(Tolerance::Inner)?;
                    let outer_rtol = config.interp_tolerance(Tolerance::Outer)?;
                    build_fascicle_mesh(&mut g, *index, inners, outer, inner_rtol, outer_rtol)?
                }
                NervePart::EpiCircle => build_epi_circle(&mut g)?,
                NervePart::EpiTrace { nerve } => {
                    let rtol = config.required_tolerance(Tolerance::Nerve)?;
                    build_epi_trace(&mut g, nerve, rtol)?
                }
            };
            (built, g.finish()?)
        };
        submit(&graph, &Container::Geometry, engine)?;
        self.contribute_nerve_unions(&built)?;

        let contact_impedance = match (part, &built.impedance_on) {
            (NervePart::FascicleCI { index, rhos, .. }, Some(on)) => {
                Some(self.add_contact_impedance(*index, on, rhos.as_deref(), engine)?)
            }
            _ => None,
        };

        let record = NerveRecord {
            kind: part.kind(),
            selections: built.catalog.labels().map(str::to_string).collect(),
            contact_impedance,
        };
        info!(steps = graph.len(), selections = record.selections.len(), "nerve part built");
        self.nerve_parts.push(record.clone());
        Ok(record)
    }

    fn contribute_nerve_unions(&mut self, built: &NervePartBuild) -> Result<(), AssemblyError> {
        for contribution in &built.contributions {
            let id = self.registry.get(&contribution.feature)?;
            self.unions.contribute(&id, contribution.groups);
        }
        Ok(())
    }

    /// Perineurium as a contact impedance on the endoneurium boundary.
    fn add_contact_impedance(
        &mut self,
        index: usize,
        endoneurium: &str,
        rhos: Option<&str>,
        engine: &mut dyn ModelEngine,
    ) -> Result<Identifier, AssemblyError> {
        let group = self.contact_impedance_group(engine)?;
        let csel = self.registry.get(endoneurium)?;

        let at = Container::Physics;
        let label = format!("inner{index} ContactImpedance");
        let ci = self
            .registry
            .next(FeatureKind::ContactImpedance.default_prefix(), Some(&label))?;
        engine.create(&at, ci.as_str(), FeatureKind::ContactImpedance, Some(Dimension::Surfaces))?;
        engine.label(&at, ci.as_str(), &label)?;
        engine.select_named(&at, ci.as_str(), None, &format!("{SHARED_GEOMETRY}_{csel}_bnd"))?;
        engine.set(&at, ci.as_str(), "spec_type", PropValue::expr("surfimp"))?;
        if let Some(rhos) = rhos {
            engine.set(&at, ci.as_str(), "rhos", PropValue::expr(rhos))?;
        }
        engine.set_entry(&Container::Model, group.as_str(), "members", ci.as_str(), PropValue::expr("ec"))?;
        Ok(ci)
    }

    fn contact_impedance_group(
        &mut self,
        engine: &mut dyn ModelEngine,
    ) -> Result<Identifier, AssemblyError> {
        if let Ok(id) = self.registry.get(CONTACT_IMPEDANCES) {
            return Ok(id);
        }
        let id = self
            .registry
            .next(FeatureKind::NodeGroup.default_prefix(), Some(CONTACT_IMPEDANCES))?;
        engine.create(&Container::Model, id.as_str(), FeatureKind::NodeGroup, None)?;
        engine.label(&Container::Model, id.as_str(), CONTACT_IMPEDANCES)?;
        Ok(id)
    }
}
