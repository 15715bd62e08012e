use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no parameter named `{0}` in the workspace")]
    UnknownParameter(String),

    #[error("a parameter named `{0}` is already registered")]
    DuplicateParameter(String),

    #[error("`{0}` is a derived quantity and cannot be assigned")]
    NotAVariable(String),

    #[error("`{0}` is constant")]
    ConstantParameter(String),

    #[error("invalid range for `{name}`: [{min}, {max}] (value {value})")]
    InvalidRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid spline `{name}`: {reason}")]
    InvalidSpline { name: String, reason: String },

    #[error("invalid shape `{name}`: {reason}")]
    InvalidShape { name: String, reason: String },

    #[error("spline parameter `{0}` needs a mass variable, but none is configured")]
    MissingMassVariable(String),

    #[error("integral of `{name}` over [{lo}, {hi}] is {value}")]
    ZeroIntegral {
        name: String,
        lo: f64,
        hi: f64,
        value: f64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
