//! Test harness for scripted assembly builds.
//!
//! Drives an [`Assembly`](cuff_assembly::Assembly) against the recording
//! engine so scenarios can be written step by step and checked against the
//! exact command stream.
//!
//! # Key Components
//!
//! - [`ScenarioBuilder`]: Fluent API for building and verifying assemblies
//! - [`report`]: Structured text summaries of a finished build
//! - [`helpers`]: Error type and small recipe fixtures
//! - [`assertions`]: Assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod report;
pub mod workflow;

pub use helpers::HarnessError;
pub use report::BuildReport;
pub use workflow::ScenarioBuilder;
