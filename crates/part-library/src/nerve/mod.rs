//! Nerve cross-section parts.
//!
//! Unlike cuff primitives these are built once per sample directly into the
//! shared geometry, against the shared registry, so their catalog labels
//! carry the fascicle index (`outer3_ENDONEURIUM`).

pub mod epineurium;
pub mod fascicle;

use cuff_types::UnionGroup;
use feature_graph::SelectionCatalog;
use serde::{Deserialize, Serialize};

pub use epineurium::{build_epi_circle, build_epi_trace};
pub use fascicle::{build_fascicle_ci, build_fascicle_mesh};

/// A closed trace curve read by the engine from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFile {
    pub path: String,
    /// File stem (`0` for `0.txt`), used to label the curve.
    pub index: String,
}

impl TraceFile {
    /// `<dir>/<file>`, indexed by the file stem.
    pub fn new(dir: &str, file: &str) -> Self {
        let index = file.split('.').next().unwrap_or(file).to_string();
        Self {
            path: format!("{dir}/{file}"),
            index,
        }
    }
}

/// A feature whose result joins one or more union groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionContribution {
    pub feature: String,
    pub groups: &'static [UnionGroup],
}

/// Output of a nerve-part recipe.
#[derive(Debug, Clone, Default)]
pub struct NervePartBuild {
    pub catalog: SelectionCatalog,
    pub contributions: Vec<UnionContribution>,
    /// Catalog label whose boundary receives a contact impedance.
    pub impedance_on: Option<String>,
}

pub(crate) const ALL_AND_ENDO: &[UnionGroup] = &[UnionGroup::AllNerveParts, UnionGroup::Endoneurium];
pub(crate) const ALL_AND_PERI: &[UnionGroup] = &[UnionGroup::AllNerveParts, UnionGroup::Perineurium];
pub(crate) const ALL_ONLY: &[UnionGroup] = &[UnionGroup::AllNerveParts];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_index_is_file_stem() {
        let t = TraceFile::new("samples/0/slides/0/0/sectionwise2d/fascicles/3/inners", "1.txt");
        assert_eq!(t.index, "1");
        assert!(t.path.ends_with("/inners/1.txt"));
    }
}
