pub mod entity;
pub mod feature;
pub mod pseudonym;
pub mod union;

pub use entity::*;
pub use feature::*;
pub use pseudonym::*;
pub use union::*;
