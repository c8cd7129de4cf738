pub mod catalog;
pub mod graph;
pub mod registry;
pub mod submit;
pub mod template;
pub mod types;

pub use catalog::{CatalogEntry, SelectionCatalog};
pub use graph::{
    BranchKind, ConstructionGraph, GraphBuilder, Guard, Input, Operation, OperationBuilder, Step,
    WorkPlane, WorkPlaneBuilder,
};
pub use registry::{Identifier, IdentifierRegistry};
pub use submit::{submit, SubmitReport};
pub use template::{PrimitiveTemplate, TemplateParameter};
pub use types::*;
