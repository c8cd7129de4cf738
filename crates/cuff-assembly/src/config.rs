//! Typed views of the JSON configuration documents.
//!
//! Only the parts the assembly reads are modelled; unknown keys are ignored.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::ConfigError;

/// Parse any configuration document.
pub fn parse<T: DeserializeOwned>(json: &str) -> Result<T, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

/// One material assignment: a catalog position and the material function
/// it is linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialAssignment {
    pub label_index: usize,
    pub info: String,
}

/// Per-instance configuration: parameter expressions and material list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceConfig {
    #[serde(default)]
    pub def: BTreeMap<String, String>,
    #[serde(default)]
    pub materials: Vec<MaterialAssignment>,
}

impl InstanceConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        parse(json)
    }
}

/// A conductivity value with its unit.
///
/// `value == "anisotropic"` switches to the per-axis `sigma_x|y|z` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conductivity {
    pub value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub sigma_x: Option<String>,
    #[serde(default)]
    pub sigma_y: Option<String>,
    #[serde(default)]
    pub sigma_z: Option<String>,
}

impl Conductivity {
    pub const ANISOTROPIC: &'static str = "anisotropic";

    pub fn is_anisotropic(&self) -> bool {
        self.value == Self::ANISOTROPIC
    }
}

/// A material function's conductivity: a named library entry or a custom
/// definition given inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConductivityAssignment {
    Reference(String),
    Custom(Conductivity),
}

/// Library of default conductivities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialsConfig {
    #[serde(default)]
    pub conductivities: BTreeMap<String, Conductivity>,
}

impl MaterialsConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        parse(json)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediumConfig {
    #[serde(default)]
    pub distant_ground: bool,
    /// Place a second, distal medium around the proximal one.
    #[serde(default)]
    pub distal: bool,
}

/// Which interpolation tolerance a trace curve uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
    Inner,
    Outer,
    Nerve,
}

impl Tolerance {
    pub fn key(self) -> &'static str {
        match self {
            Tolerance::Inner => "inner_interp_tol",
            Tolerance::Outer => "outer_interp_tol",
            Tolerance::Nerve => "nerve_interp_tol",
        }
    }
}

/// Model-wide configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub conductivities: BTreeMap<String, ConductivityAssignment>,
    #[serde(default)]
    pub medium: MediumConfig,
    #[serde(default)]
    pub inner_interp_tol: Option<f64>,
    #[serde(default)]
    pub outer_interp_tol: Option<f64>,
    #[serde(default)]
    pub nerve_interp_tol: Option<f64>,
    /// Legacy single tolerance; exclusive with the specific keys.
    #[serde(default)]
    pub trace_interp_tol: Option<f64>,
}

impl ModelConfig {
    pub const LEGACY_TOLERANCE: &'static str = "trace_interp_tol";

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        parse(json)
    }

    /// Tolerance for one trace kind, falling back to the legacy key.
    pub fn interp_tolerance(&self, which: Tolerance) -> Result<Option<f64>, ConfigError> {
        let specific = match which {
            Tolerance::Inner => self.inner_interp_tol,
            Tolerance::Outer => self.outer_interp_tol,
            Tolerance::Nerve => self.nerve_interp_tol,
        };
        match (specific, self.trace_interp_tol) {
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousConfiguration {
                context: "interpolation tolerance".to_string(),
                first: which.key().to_string(),
                second: Self::LEGACY_TOLERANCE.to_string(),
            }),
            (Some(tol), None) | (None, Some(tol)) => Ok(Some(tol)),
            (None, None) => Ok(None),
        }
    }

    /// Like [`interp_tolerance`](Self::interp_tolerance), but absence is an error.
    pub fn required_tolerance(&self, which: Tolerance) -> Result<f64, ConfigError> {
        self.interp_tolerance(which)?
            .ok_or_else(|| ConfigError::MissingRequiredConfiguration {
                context: "interpolation tolerance".to_string(),
                key: which.key().to_string(),
            })
    }

    /// Resolve a material function to its conductivity and a description
    /// (`default: <ref>` or `custom: <label>`).
    pub fn conductivity<'a>(
        &'a self,
        function: &str,
        library: &'a MaterialsConfig,
    ) -> Result<(&'a Conductivity, String), ConfigError> {
        let assignment =
            self.conductivities
                .get(function)
                .ok_or_else(|| ConfigError::MissingRequiredConfiguration {
                    context: "conductivities".to_string(),
                    key: function.to_string(),
                })?;
        match assignment {
            ConductivityAssignment::Reference(name) => {
                let sigma = library.conductivities.get(name).ok_or_else(|| {
                    ConfigError::MissingRequiredConfiguration {
                        context: "materials library".to_string(),
                        key: name.clone(),
                    }
                })?;
                Ok((sigma, format!("default: {name}")))
            }
            ConductivityAssignment::Custom(sigma) => {
                let label = sigma.label.as_deref().unwrap_or(function);
                Ok((sigma, format!("custom: {label}")))
            }
        }
    }
}
