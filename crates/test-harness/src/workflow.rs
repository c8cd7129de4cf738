//! ScenarioBuilder: fluent API for scripting assembly builds in tests.
//!
//! Wraps an `Assembly` and a `RecordingEngine`. Every step is recorded in a
//! history so failures can print what led up to them.

use cuff_assembly::{
    Assembly, BuildManifest, InstanceConfig, InstanceRecord, InstanceSpec, LinkReport,
    MaterialsConfig, ModelConfig, NervePart, NerveRecord,
};
use feature_graph::{Identifier, PrimitiveTemplate};
use model_engine::{EngineCommand, RecordingEngine};

use crate::helpers::HarnessError;
use crate::report::BuildReport;

/// A fluent builder for running and verifying assembly scenarios.
pub struct ScenarioBuilder {
    assembly: Assembly,
    engine: RecordingEngine,
    history: Vec<(String, String)>,
}

impl ScenarioBuilder {
    /// A fresh document with an empty recording engine.
    pub fn new() -> Self {
        Self {
            assembly: Assembly::new(),
            engine: RecordingEngine::new(),
            history: Vec::new(),
        }
    }

    fn log(&mut self, step: &str, detail: impl Into<String>) {
        self.history.push((step.to_string(), detail.into()));
    }

    // ── Templates ───────────────────────────────────────────────────────

    /// Build and install a library template.
    pub fn template(&mut self, pseudonym: &str) -> Result<Option<Identifier>, HarnessError> {
        let part = self.assembly.build_template(pseudonym, &mut self.engine)?;
        self.log("template", pseudonym);
        Ok(part)
    }

    /// Install a template built outside the part library.
    pub fn install(
        &mut self,
        template: PrimitiveTemplate,
        point_source: Option<usize>,
    ) -> Result<Identifier, HarnessError> {
        let pseudonym = template.pseudonym().to_string();
        let part = self
            .assembly
            .install_template(template, point_source, &mut self.engine)?;
        self.log("install", pseudonym);
        Ok(part)
    }

    // ── Instances ───────────────────────────────────────────────────────

    pub fn instance(&mut self, spec: InstanceSpec) -> Result<InstanceRecord, HarnessError> {
        let record = self.assembly.bind_instance(&spec, &mut self.engine)?;
        self.log("instance", format!("{} -> {}", spec.label, record.id));
        Ok(record)
    }

    pub fn media(&mut self, config: &ModelConfig) -> Result<Vec<InstanceRecord>, HarnessError> {
        let placed = self.assembly.add_media(config, &mut self.engine)?;
        self.log("media", format!("{} placed", placed.len()));
        Ok(placed)
    }

    pub fn nerve(
        &mut self,
        part: &NervePart,
        config: &ModelConfig,
    ) -> Result<NerveRecord, HarnessError> {
        let record = self.assembly.add_nerve_part(part, config, &mut self.engine)?;
        self.log("nerve", record.kind.to_string());
        Ok(record)
    }

    // ── Materials ───────────────────────────────────────────────────────

    pub fn material(
        &mut self,
        function: &str,
        model: &ModelConfig,
        library: &MaterialsConfig,
    ) -> Result<Identifier, HarnessError> {
        let id = self
            .assembly
            .define_material(function, model, library, &mut self.engine)?;
        self.log("material", format!("{function} -> {id}"));
        Ok(id)
    }

    pub fn link(
        &mut self,
        instance: &str,
        config: &InstanceConfig,
    ) -> Result<LinkReport, HarnessError> {
        let report = self
            .assembly
            .link_materials(instance, config, &mut self.engine)?;
        self.log(
            "link",
            format!(
                "{instance}: {} linked, {} skipped",
                report.linked.len(),
                report.skipped.len()
            ),
        );
        Ok(report)
    }

    // ── Completion ──────────────────────────────────────────────────────

    pub fn finish(&mut self) -> Result<BuildManifest, HarnessError> {
        let manifest = self.assembly.finish(&mut self.engine)?;
        self.log("finish", format!("{} unions", manifest.union_features.len()));
        Ok(manifest)
    }

    pub fn report(&self) -> BuildReport {
        BuildReport::from_manifest(&self.assembly.manifest())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    pub fn engine(&self) -> &RecordingEngine {
        &self.engine
    }

    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    /// Current length of the command stream, for "nothing was sent" checks.
    pub fn mark(&self) -> usize {
        self.engine.command_count()
    }

    pub fn commands_since(&self, mark: usize) -> &[EngineCommand] {
        &self.engine.commands()[mark.min(self.engine.command_count())..]
    }

    pub fn instance_record(&self, label: &str) -> Result<&InstanceRecord, HarnessError> {
        self.assembly
            .instance(label)
            .ok_or_else(|| HarnessError::InstanceNotFound {
                label: label.to_string(),
            })
    }

    // ── Inline Assertions ───────────────────────────────────────────────

    /// Assert `label` resolves in the shared registry.
    pub fn assert_resolvable(&self, label: &str) -> Result<&Self, HarnessError> {
        if self.assembly.registry().has(label) {
            Ok(self)
        } else {
            Err(self.failure(format!("expected '{label}' to resolve")))
        }
    }

    /// Assert `label` does not resolve in the shared registry.
    pub fn assert_unresolvable(&self, label: &str) -> Result<&Self, HarnessError> {
        match self.assembly.registry().get(label) {
            Err(_) => Ok(self),
            Ok(id) => Err(self.failure(format!("expected '{label}' to be unbound, found {id}"))),
        }
    }

    /// Assert no command reached the engine after `mark`.
    pub fn assert_untouched_since(&self, mark: usize) -> Result<&Self, HarnessError> {
        let sent = self.commands_since(mark);
        if sent.is_empty() {
            Ok(self)
        } else {
            Err(self.failure(format!("{} command(s) sent, first: {:?}", sent.len(), sent[0])))
        }
    }

    fn failure(&self, detail: String) -> HarnessError {
        let steps: Vec<String> = self
            .history
            .iter()
            .map(|(step, detail)| format!("{step}: {detail}"))
            .collect();
        HarnessError::AssertionFailed {
            detail: format!("{detail}\n  history: [{}]", steps.join("; ")),
        }
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}
