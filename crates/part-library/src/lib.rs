pub mod circle_contact;
pub mod cuff_fill;
pub mod definition;
pub mod helical_cuffn_contact;
pub mod medium;
pub mod nerve;
pub mod rectangle_contact;
pub mod ribbon_contact;
pub mod tube_cuff;
pub mod tube_cuff_sweep;
pub mod wire_contact;

pub use definition::{definition, lookup, PrimitiveDefinition, Recipe};
pub use nerve::{NervePartBuild, TraceFile, UnionContribution};
