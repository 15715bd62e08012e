//! Probability density shapes bound to workspace parameters.

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::numerics::{simpson, DEFAULT_SIMPSON_INTERVALS};
use crate::workspace::{ParamId, Workspace};

pub mod basic;
pub mod double_sided_voigtian;

pub use basic::{BreitWignerPdf, ExponentialPdf, GaussianPdf, VoigtianPdf};
pub use double_sided_voigtian::{DoubleSidedVoigtian, SideBindings, YMaxRole};

#[derive(Clone, PartialEq, Eq, Debug)]
/// A named, read-only binding from a shape to a workspace node.
pub struct RealProxy {
    /// Role of the binding within its shape, _e.g._ `"sig1"`.
    pub role: &'static str,
    pub id: ParamId,
}

impl RealProxy {
    #[must_use]
    pub fn new(role: &'static str, id: ParamId) -> Self {
        Self { role, id }
    }

    #[inline]
    #[must_use]
    pub fn value(&self, ws: &Workspace) -> f64 {
        ws.value(self.id)
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct PdfSummary {
    pub name: String,
    pub title: String,
    pub kind: &'static str,
    /// Role of each binding mapped to the workspace node it reads.
    pub bindings: BTreeMap<&'static str, String>,
}

/// A density shape over one observable.
///
/// Evaluation is pure: the result depends only on the current workspace values, and nothing
/// is cached between calls. The returned density is unnormalized over the observable range
/// but is always finite and non-negative.
pub trait Pdf: Debug {
    fn name(&self) -> &str;
    fn title(&self) -> &str;
    /// Stable identifier of the shape family.
    fn kind(&self) -> &'static str;
    fn observable(&self) -> &RealProxy;
    /// Every binding, the observable first.
    fn proxies(&self) -> Vec<&RealProxy>;

    /// Density at an explicit value of the observable, other inputs read from `ws`.
    fn evaluate_at(&self, ws: &Workspace, x: f64) -> f64;

    /// An independent copy under a new name, bound to the very same workspace nodes.
    fn clone_named(&self, name: &str) -> Box<dyn Pdf>;

    /// Density at the current value of the observable.
    fn evaluate(&self, ws: &Workspace) -> f64 {
        self.evaluate_at(ws, self.observable().value(ws))
    }

    /// Area under the density over `[lo, hi]` of the observable.
    fn integral(&self, ws: &Workspace, lo: f64, hi: f64) -> f64 {
        simpson(
            |x| self.evaluate_at(ws, x),
            lo,
            hi,
            DEFAULT_SIMPSON_INTERVALS,
        )
    }

    /// Density at the current observable value, normalized over the observable's range.
    ///
    /// # Errors
    /// The observable must be a workspace variable, and the integral over its range must be
    /// positive and finite.
    fn normalized(&self, ws: &Workspace) -> Result<f64> {
        let x = self.observable();
        let var = ws
            .variable(x.id)
            .ok_or_else(|| Error::NotAVariable(ws.name(x.id).to_owned()))?;
        let integral = self.integral(ws, var.min, var.max);
        if !(integral.is_finite() && integral > 0.) {
            return Err(Error::ZeroIntegral {
                name: self.name().to_owned(),
                lo: var.min,
                hi: var.max,
                value: integral,
            });
        }
        Ok(self.evaluate(ws) / integral)
    }

    fn depends_on(&self, id: ParamId) -> bool {
        self.proxies().iter().any(|proxy| proxy.id == id)
    }

    fn summary(&self, ws: &Workspace) -> PdfSummary {
        PdfSummary {
            name: self.name().to_owned(),
            title: self.title().to_owned(),
            kind: self.kind(),
            bindings: self
                .proxies()
                .into_iter()
                .map(|proxy| (proxy.role, ws.name(proxy.id).to_owned()))
                .collect(),
        }
    }
}

/// Swap non-finite or negative densities for zero, which is what a minimizer can cope with.
#[inline]
pub(crate) fn sanitize(kind: &str, value: f64) -> f64 {
    if value.is_finite() && value >= 0. {
        value
    } else {
        tracing::trace!(kind, value, "replacing unusable density with zero");
        0.
    }
}

/// A width parameter is usable when finite and not negative.
#[inline]
pub(crate) fn valid_width(width: f64) -> bool {
    width.is_finite() && width >= 0.
}
