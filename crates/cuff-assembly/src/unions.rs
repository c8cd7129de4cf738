use std::collections::BTreeMap;

use cuff_types::{FeatureKind, PropValue, UnionGroup};
use feature_graph::{Identifier, IdentifierRegistry};
use model_engine::{Container, ModelEngine};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::types::AssemblyError;

/// Append-only membership of the build-wide union groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnionAggregator {
    groups: BTreeMap<UnionGroup, Vec<Identifier>>,
}

impl UnionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` to every group in `groups`. Duplicates are kept.
    pub fn contribute(&mut self, id: &Identifier, groups: &[UnionGroup]) {
        for group in groups {
            self.groups.entry(*group).or_default().push(id.clone());
        }
    }

    pub fn members(&self, group: UnionGroup) -> &[Identifier] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty groups in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (UnionGroup, &[Identifier])> {
        self.groups
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(group, members)| (*group, members.as_slice()))
    }

    /// Emit one union feature per non-empty group into the shared geometry.
    #[instrument(skip_all, fields(groups = self.groups.len()))]
    pub fn emit(
        &self,
        registry: &mut IdentifierRegistry,
        engine: &mut dyn ModelEngine,
    ) -> Result<Vec<Identifier>, AssemblyError> {
        let at = Container::Geometry;
        let mut emitted = Vec::new();
        for (group, members) in self.iter() {
            let id = registry.next(FeatureKind::Union.default_prefix(), Some(group.label()))?;
            engine.create(&at, id.as_str(), FeatureKind::Union, None)?;
            engine.label(&at, id.as_str(), group.label())?;
            engine.set(&at, id.as_str(), "keep", PropValue::Bool(true))?;
            engine.set(
                &at,
                id.as_str(),
                "selection.input",
                PropValue::exprs(members.iter().map(Identifier::as_str)),
            )?;
            debug!(union = %id, %group, members = members.len(), "union emitted");
            emitted.push(id);
        }
        Ok(emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_engine::RecordingEngine;
    use proptest::prelude::*;

    #[test]
    fn empty_groups_emit_nothing() {
        let agg = UnionAggregator::new();
        let mut reg = IdentifierRegistry::new();
        let mut engine = RecordingEngine::new();
        assert!(agg.emit(&mut reg, &mut engine).unwrap().is_empty());
        assert_eq!(engine.command_count(), 0);
    }

    #[test]
    fn groups_emit_in_declaration_order() {
        let mut agg = UnionAggregator::new();
        agg.contribute(&Identifier::new("ext2"), &[UnionGroup::Perineurium]);
        agg.contribute(
            &Identifier::new("ext1"),
            &[UnionGroup::AllNerveParts, UnionGroup::Endoneurium],
        );
        let groups: Vec<_> = agg.iter().map(|(g, _)| g).collect();
        assert_eq!(
            groups,
            vec![
                UnionGroup::AllNerveParts,
                UnionGroup::Endoneurium,
                UnionGroup::Perineurium
            ]
        );
    }

    proptest! {
        #[test]
        fn membership_is_append_only(ids in proptest::collection::vec(0u8..5, 0..40)) {
            let mut agg = UnionAggregator::new();
            for n in &ids {
                agg.contribute(&Identifier::new(format!("ext{n}")), &[UnionGroup::Endoneurium]);
            }
            let members: Vec<String> = agg
                .members(UnionGroup::Endoneurium)
                .iter()
                .map(|id| id.to_string())
                .collect();
            let expected: Vec<String> = ids.iter().map(|n| format!("ext{n}")).collect();
            prop_assert_eq!(members, expected);
            prop_assert!(agg.members(UnionGroup::Perineurium).is_empty());
        }
    }
}
