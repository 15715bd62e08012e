//! Evaluate a shape on an evenly spaced grid of its observable.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use itertools::Itertools;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::numerics::linspace;
use crate::pdf::{Pdf, PdfSummary};
use crate::workspace::Workspace;

#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
pub struct ScanPoint {
    pub x: f64,
    pub density: f64,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Scan {
    pub pdf: PdfSummary,
    /// Every workspace value the scan was taken at.
    pub parameters: BTreeMap<String, f64>,
    /// Area under the unnormalized density over the scanned range, if it was divided out.
    pub integral: Option<f64>,
    pub points: Vec<ScanPoint>,
}

/// Sample `pdf` at `points` values of its observable spanning `range`.
///
/// # Errors
/// [`Error::InvalidConfig`] for fewer than two points or a malformed range, and
/// [`Error::ZeroIntegral`] when normalizing a shape with no area over `range`.
pub fn scan(
    pdf: &dyn Pdf,
    ws: &Workspace,
    range: RangeInclusive<f64>,
    points: usize,
    normalize: bool,
) -> Result<Scan> {
    let (lo, hi) = (*range.start(), *range.end());
    if points < 2 || !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Err(Error::InvalidConfig(format!(
            "cannot scan {points} points over [{lo}, {hi}]"
        )));
    }
    let integral = if normalize {
        let value = pdf.integral(ws, lo, hi);
        if !(value.is_finite() && value > 0.) {
            return Err(Error::ZeroIntegral {
                name: pdf.name().to_owned(),
                lo,
                hi,
                value,
            });
        }
        Some(value)
    } else {
        None
    };
    let scale = integral.map_or(1., f64::recip);
    let points = linspace(range, points)
        .map(|x| ScanPoint {
            x,
            density: scale * pdf.evaluate_at(ws, x),
        })
        .collect_vec();
    tracing::debug!(pdf = pdf.name(), n = points.len(), ?integral, "scanned");
    Ok(Scan {
        pdf: pdf.summary(ws),
        parameters: ws.snapshot(),
        integral,
        points,
    })
}

impl Scan {
    /// The grid point of highest density; the first of them on ties.
    #[must_use]
    pub fn max(&self) -> Option<&ScanPoint> {
        self.points
            .iter()
            .rev()
            .max_by(|a, b| a.density.total_cmp(&b.density))
    }

    /// Plain-text rendering: a header of parameter values, then one `x density` row per point.
    #[must_use]
    pub fn to_table(&self) -> String {
        let header = std::iter::once(format!("# {} ({})", self.pdf.name, self.pdf.kind))
            .chain(
                self.parameters
                    .iter()
                    .map(|(name, value)| format!("# {name} = {value}")),
            )
            .chain(self.integral.map(|integral| format!("# integral = {integral}")))
            .chain(std::iter::once(format!("{:>16} {:>16}", "x", "density")));
        let rows = self
            .points
            .iter()
            .map(|ScanPoint { x, density }| format!("{x:>16.8} {density:>16.8e}"));
        let mut out = header.chain(rows).join("\n");
        out.push('\n');
        out
    }
}
