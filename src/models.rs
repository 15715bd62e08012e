//! Declarative recipes that register a shape's parameters in a [`Workspace`] and bind the
//! shape to them.
//!
//! Parameters are named `<parameter>_<label>`, so several models can share a workspace as
//! long as their labels differ.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pdf::{
    BreitWignerPdf, DoubleSidedVoigtian, ExponentialPdf, GaussianPdf, Pdf, SideBindings,
    VoigtianPdf, YMaxRole,
};
use crate::workspace::{Node, ParamId, Spline1D, Workspace};

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamSpec {
    /// A constant.
    Fixed(f64),
    /// `[value, min, max]` of a floating variable.
    Range([f64; 3]),
    /// A function of the hypothesis mass, interpolated through `(masses, values)`.
    Spline { masses: Vec<f64>, values: Vec<f64> },
}

impl ParamSpec {
    fn lowest(&self) -> f64 {
        match self {
            ParamSpec::Fixed(value) => *value,
            ParamSpec::Range([value, min, _]) => value.min(*min),
            ParamSpec::Spline { values, .. } => {
                values.iter().copied().fold(f64::INFINITY, f64::min)
            }
        }
    }
}

fn default_mean() -> ParamSpec {
    ParamSpec::Range([1., 0., 1000.])
}

fn default_width() -> ParamSpec {
    ParamSpec::Range([1., 0., 100.])
}

fn default_lambda() -> ParamSpec {
    ParamSpec::Range([-1., -5., 0.])
}

fn default_y_max() -> f64 {
    1.
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ModelSpec {
    Gaussian {
        #[serde(default = "default_mean")]
        mean: ParamSpec,
        #[serde(default = "default_width")]
        sigma: ParamSpec,
    },
    BreitWigner {
        #[serde(default = "default_mean")]
        mean: ParamSpec,
        #[serde(default = "default_width")]
        width: ParamSpec,
    },
    Voigtian {
        #[serde(default = "default_mean")]
        mean: ParamSpec,
        #[serde(default = "default_width")]
        width: ParamSpec,
        #[serde(default = "default_width")]
        sigma: ParamSpec,
    },
    Exponential {
        #[serde(default = "default_lambda")]
        lambda: ParamSpec,
    },
    DoubleSidedVoigtian {
        #[serde(default = "default_mean")]
        mean: ParamSpec,
        #[serde(default = "default_width")]
        sigma1: ParamSpec,
        #[serde(default = "default_width")]
        sigma2: ParamSpec,
        #[serde(default = "default_width")]
        width1: ParamSpec,
        #[serde(default = "default_width")]
        width2: ParamSpec,
        #[serde(default = "default_y_max")]
        y_max: f64,
        #[serde(default)]
        y_max_role: YMaxRole,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// Workspace nodes a model is built against.
pub struct Axes {
    pub observable: ParamId,
    /// Hypothesis mass that spline parameters are functions of.
    pub mass: Option<ParamId>,
}

impl ModelSpec {
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            ModelSpec::Gaussian { .. } => "gaussian",
            ModelSpec::BreitWigner { .. } => "breit_wigner",
            ModelSpec::Voigtian { .. } => "voigtian",
            ModelSpec::Exponential { .. } => "exponential",
            ModelSpec::DoubleSidedVoigtian { .. } => "double_sided_voigtian",
        }
    }

    fn param_mut(&mut self, param: &str) -> Option<&mut ParamSpec> {
        match (self, param) {
            (
                ModelSpec::Gaussian { mean, .. }
                | ModelSpec::BreitWigner { mean, .. }
                | ModelSpec::Voigtian { mean, .. }
                | ModelSpec::DoubleSidedVoigtian { mean, .. },
                "mean",
            ) => Some(mean),
            (ModelSpec::Gaussian { sigma, .. } | ModelSpec::Voigtian { sigma, .. }, "sigma") => {
                Some(sigma)
            }
            (ModelSpec::BreitWigner { width, .. } | ModelSpec::Voigtian { width, .. }, "width") => {
                Some(width)
            }
            (ModelSpec::Exponential { lambda }, "lambda") => Some(lambda),
            (ModelSpec::DoubleSidedVoigtian { sigma1, .. }, "sigma1") => Some(sigma1),
            (ModelSpec::DoubleSidedVoigtian { sigma2, .. }, "sigma2") => Some(sigma2),
            (ModelSpec::DoubleSidedVoigtian { width1, .. }, "width1") => Some(width1),
            (ModelSpec::DoubleSidedVoigtian { width2, .. }, "width2") => Some(width2),
            _ => None,
        }
    }

    /// Register the parameters under `label` and bind a new shape named `label` to them.
    ///
    /// # Errors
    /// Fails on parameter name clashes, malformed ranges or splines, width parameters that
    /// could go negative, or spline parameters without a mass variable. On failure `ws` is
    /// left as it was.
    pub fn build(
        &self,
        ws: &mut Workspace,
        label: &str,
        title: &str,
        axes: Axes,
    ) -> Result<Box<dyn Pdf>> {
        if let ModelSpec::DoubleSidedVoigtian {
            y_max, y_max_role, ..
        } = self
        {
            if !y_max_role.accepts(*y_max) {
                return Err(Error::InvalidShape {
                    name: label.to_owned(),
                    reason: format!("y_max = {y_max} is not usable as {y_max_role:?}"),
                });
            }
        }
        let mut staged = ws.clone();
        let pdf = self.bind(&mut staged, label, title, axes)?;
        *ws = staged;
        tracing::debug!(label, shape = self.shape(), "built model");
        Ok(pdf)
    }

    fn bind(
        &self,
        ws: &mut Workspace,
        label: &str,
        title: &str,
        axes: Axes,
    ) -> Result<Box<dyn Pdf>> {
        let x = axes.observable;
        let param = |ws: &mut Workspace, name: &str, spec: &ParamSpec, is_width: bool| {
            register(ws, name, spec, is_width, label, axes.mass)
        };
        let pdf: Box<dyn Pdf> = match self {
            ModelSpec::Gaussian { mean, sigma } => Box::new(GaussianPdf::new(
                label,
                title,
                x,
                param(ws, "mean", mean, false)?,
                param(ws, "sigma", sigma, true)?,
            )),
            ModelSpec::BreitWigner { mean, width } => Box::new(BreitWignerPdf::new(
                label,
                title,
                x,
                param(ws, "mean", mean, false)?,
                param(ws, "width", width, true)?,
            )),
            ModelSpec::Voigtian { mean, width, sigma } => Box::new(VoigtianPdf::new(
                label,
                title,
                x,
                param(ws, "mean", mean, false)?,
                param(ws, "width", width, true)?,
                param(ws, "sigma", sigma, true)?,
            )),
            ModelSpec::Exponential { lambda } => Box::new(ExponentialPdf::new(
                label,
                title,
                x,
                param(ws, "lambda", lambda, false)?,
            )),
            ModelSpec::DoubleSidedVoigtian {
                mean,
                sigma1,
                sigma2,
                width1,
                width2,
                y_max,
                y_max_role,
            } => {
                let bindings = SideBindings {
                    x,
                    mean: param(ws, "mean", mean, false)?,
                    sig1: param(ws, "sigma1", sigma1, true)?,
                    sig2: param(ws, "sigma2", sigma2, true)?,
                    wid1: param(ws, "width1", width1, true)?,
                    wid2: param(ws, "width2", width2, true)?,
                };
                Box::new(DoubleSidedVoigtian::new_with_role(
                    label,
                    title,
                    ws,
                    bindings,
                    *y_max,
                    *y_max_role,
                )?)
            }
        };
        Ok(pdf)
    }
}

fn register(
    ws: &mut Workspace,
    param: &str,
    spec: &ParamSpec,
    is_width: bool,
    label: &str,
    mass: Option<ParamId>,
) -> Result<ParamId> {
    let name = format!("{param}_{label}");
    if is_width && spec.lowest() < 0. {
        let (value, min, max) = match spec {
            ParamSpec::Range([value, min, max]) => (*value, *min, *max),
            other => (other.lowest(), other.lowest(), f64::INFINITY),
        };
        return Err(Error::InvalidRange {
            name,
            value,
            min,
            max,
        });
    }
    match spec {
        ParamSpec::Fixed(value) => ws.add_constant(name, *value),
        ParamSpec::Range([value, min, max]) => ws.add_variable(name, *value, *min, *max),
        ParamSpec::Spline { masses, values } => {
            let mass = mass.ok_or_else(|| Error::MissingMassVariable(name.clone()))?;
            let mut spline = Spline1D::new(&name, masses.clone(), values.clone())?;
            if is_width {
                spline = spline.with_floor(0.);
            }
            ws.import_or_recycle(Node::Spline {
                name,
                input: mass,
                spline,
            })
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// A named recipe, optionally carrying the expected yield it is scaled to.
pub struct Model {
    pub name: String,
    #[serde(flatten)]
    pub spec: ModelSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    integral: Option<f64>,
}

impl Model {
    #[must_use]
    pub fn new(name: impl Into<String>, spec: ModelSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            integral: None,
        }
    }

    /// Replace the recipe of one parameter.
    ///
    /// # Errors
    /// [`Error::UnknownParameter`] if the shape has no such parameter.
    pub fn update(&mut self, param: &str, spec: ParamSpec) -> Result<()> {
        let slot = self
            .spec
            .param_mut(param)
            .ok_or_else(|| Error::UnknownParameter(format!("{param} of model `{}`", self.name)))?;
        *slot = spec;
        Ok(())
    }

    pub fn set_integral(&mut self, integral: f64) {
        self.integral = Some(integral);
    }

    #[must_use]
    /// The yield the model was scaled to, or unity if none was set.
    pub fn integral(&self) -> f64 {
        self.integral.unwrap_or(1.)
    }

    /// Build under the model's own name.
    ///
    /// # Errors
    /// See [`ModelSpec::build`].
    pub fn build(&self, ws: &mut Workspace, axes: Axes) -> Result<Box<dyn Pdf>> {
        self.spec.build(ws, &self.name, &self.name, axes)
    }
}
