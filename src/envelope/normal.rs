use crate::error::{GeometryError, Result};
use crate::math::{ScalarSeries, VectorSeries, TOLERANCE};

/// Solves the unit envelope normal from the spine derivatives.
///
/// `sa` is the axial derivative of the spine (the tool axis) and `st` the
/// time derivative, both as time series. The normal satisfies
/// `N . sa = -r'` and `N . st = 0`:
///
/// `N = alpha sa + beta st + gamma (sa x st) / |sa x st|`
///
/// with `E = sa . sa`, `F = sa . st`, `G = st . st`, `D = E G - F^2`,
/// `alpha = -(G / D) r'`, `beta = (F / D) r'` and
/// `gamma = branch * sqrt(1 - r'^2 G / D)`. The result is renormalized.
/// The output carries the lower of the two input orders.
///
/// A radicand at or below zero is clamped, selecting the tangential
/// solution.
///
/// # Errors
///
/// Returns [`GeometryError::NumericDegeneracy`] when `D` vanishes, i.e. the
/// path moves along the tool axis, or when an input is not finite.
pub fn solve_normal(
    sa: &VectorSeries,
    st: &VectorSeries,
    radius_derivative: f64,
    branch: f64,
) -> Result<VectorSeries> {
    let e = sa.dot(sa);
    let f = sa.dot(st);
    let g = st.dot(st);
    if !radius_derivative.is_finite() {
        return Err(GeometryError::NumericDegeneracy(format!(
            "radius derivative is {radius_derivative}"
        ))
        .into());
    }
    let d = &e.product(&g) - &f.product(&f);
    if !d.value().is_finite() || d.value() < TOLERANCE {
        return Err(GeometryError::NumericDegeneracy(format!(
            "first fundamental form discriminant {} vanishes",
            d.value()
        ))
        .into());
    }
    let inv_d = d.recip()?;
    let g_over_d = g.product(&inv_d);

    let alpha = &g_over_d * -radius_derivative;
    let beta = &f.product(&inv_d) * radius_derivative;
    let radicand = (&g_over_d * -(radius_derivative * radius_derivative)).offset(1.0);
    let gamma = if radicand.value() < TOLERANCE {
        tracing::trace!(radicand = radicand.value(), "clamping envelope normal radicand");
        ScalarSeries::constant(0.0, radicand.order())
    } else {
        &radicand.sqrt()? * branch.signum()
    };

    let binormal = sa.cross(st).normalize()?;
    let normal = &(&sa.scaled(&alpha) + &st.scaled(&beta)) + &binormal.scaled(&gamma);
    normal.normalize()
}
