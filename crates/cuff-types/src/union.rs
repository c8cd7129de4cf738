use std::fmt;

use serde::{Deserialize, Serialize};

/// Build-wide aggregates of nerve-tissue domains consumed by the material
/// and mesh stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnionGroup {
    AllNerveParts,
    Endoneurium,
    Perineurium,
}

impl UnionGroup {
    /// Declaration order; unions are emitted in this order.
    pub const ALL: [UnionGroup; 3] = [
        UnionGroup::AllNerveParts,
        UnionGroup::Endoneurium,
        UnionGroup::Perineurium,
    ];

    /// Label the group is registered under in the shared scope.
    pub fn label(self) -> &'static str {
        match self {
            UnionGroup::AllNerveParts => "allNervePartsUnion",
            UnionGroup::Endoneurium => "endoUnion",
            UnionGroup::Perineurium => "periUnion",
        }
    }
}

impl fmt::Display for UnionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
