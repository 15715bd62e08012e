//! TOML description of a shape to scan: the observable, the optional hypothesis mass, the
//! model recipe and the scan grid.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Axes, Model};
use crate::pdf::Pdf;
use crate::workspace::Workspace;

fn default_observable_name() -> String {
    "x".to_owned()
}

fn default_mass_name() -> String {
    "MH".to_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservableConfig {
    #[serde(default = "default_observable_name")]
    pub name: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassConfig {
    #[serde(default = "default_mass_name")]
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub points: usize,
    /// Divide by the integral over the observable range.
    pub normalize: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            points: 201,
            normalize: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub observable: ObservableConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<MassConfig>,
    pub model: Model,
    #[serde(default)]
    pub scan: ScanConfig,
}

impl Config {
    /// Read and validate a configuration file.
    ///
    /// # Errors
    /// I/O and parse failures, or anything [`Config::validate`] rejects.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), model = %config.model.name, "loaded configuration");
        Ok(config)
    }

    /// # Errors
    /// Parse failures, or anything [`Config::validate`] rejects.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// [`Error::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let ObservableConfig { name, min, max } = &self.observable;
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(Error::InvalidConfig(format!(
                "observable `{name}` needs finite bounds with min < max, got [{min}, {max}]"
            )));
        }
        if let Some(mass) = &self.mass {
            if !(mass.min <= mass.value && mass.value <= mass.max) {
                return Err(Error::InvalidConfig(format!(
                    "mass `{}` = {} lies outside [{}, {}]",
                    mass.name, mass.value, mass.min, mass.max
                )));
            }
            if mass.name == *name {
                return Err(Error::InvalidConfig(
                    "observable and mass must have different names".to_owned(),
                ));
            }
        }
        if self.scan.points < 2 {
            return Err(Error::InvalidConfig(
                "scan.points must be at least 2".to_owned(),
            ));
        }
        if self.model.name.is_empty() {
            return Err(Error::InvalidConfig("model.name must not be empty".to_owned()));
        }
        Ok(())
    }

    /// Register the observable and mass in a fresh workspace and build the model into it.
    ///
    /// The observable starts at the middle of its range.
    ///
    /// # Errors
    /// See [`crate::models::ModelSpec::build`].
    pub fn build(&self) -> Result<(Workspace, Box<dyn Pdf>)> {
        let mut ws = Workspace::new();
        let ObservableConfig { name, min, max } = &self.observable;
        let observable = ws.add_variable(name.as_str(), 0.5 * (min + max), *min, *max)?;
        let mass = self
            .mass
            .as_ref()
            .map(|mass| ws.add_variable(mass.name.as_str(), mass.value, mass.min, mass.max))
            .transpose()?;
        let pdf = self.model.build(&mut ws, Axes { observable, mass })?;
        Ok((ws, pdf))
    }
}
