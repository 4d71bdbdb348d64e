//! Derivatives of normalized vector fields.
//!
//! Given `a(t)` and its derivatives, computes the derivatives of
//! `b(t) = a(t) / |a(t)|` exactly. With `L = |a|` the identity `a = b L`
//! is differentiated with the general Leibniz rule and solved for the
//! highest derivative of `b`, carrying `L, L', L'', ...` forward; `L`
//! itself follows from `L^2 = a . a` the same way.

use crate::error::{GeometryError, Result};

use super::{Vector3, TOLERANCE};

#[allow(clippy::cast_precision_loss)]
fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Rejects vanishing and non-finite lengths.
fn checked_length(len: f64) -> Result<f64> {
    if !len.is_finite() {
        return Err(GeometryError::NumericDegeneracy(format!("vector length is {len}")).into());
    }
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(len)
}

/// Derivatives of `|a(t)|` from the derivatives of `a(t)`.
fn length_derivatives(a: &[Vector3]) -> Result<Vec<f64>> {
    let n = a.len();
    let q: Vec<f64> = (0..n)
        .map(|m| (0..=m).map(|k| binomial(m, k) * a[k].dot(&a[m - k])).sum())
        .collect();

    let l0 = checked_length(q[0].sqrt())?;

    let mut l = Vec::with_capacity(n);
    l.push(l0);
    for m in 1..n {
        let cross_terms: f64 = (1..m).map(|k| binomial(m, k) * l[k] * l[m - k]).sum();
        l.push((q[m] - cross_terms) / (2.0 * l0));
    }
    Ok(l)
}

/// Computes `b, b', b'', ...` for `b = a / |a|` from `a, a', a'', ...`.
///
/// The output has the same length as the input, so the requested order is
/// the number of supplied derivatives.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroVector`] if `a` vanishes, or
/// [`GeometryError::NumericDegeneracy`] if any input component is not finite.
pub fn normalized_derivatives(derivatives: &[Vector3]) -> Result<Vec<Vector3>> {
    if derivatives.is_empty() {
        return Ok(Vec::new());
    }
    if derivatives.iter().flat_map(|d| d.iter()).any(|c| !c.is_finite()) {
        return Err(GeometryError::NumericDegeneracy(
            "non-finite derivative of a direction field".into(),
        )
        .into());
    }
    let l = length_derivatives(derivatives)?;
    let l0 = l[0];

    let mut b: Vec<Vector3> = Vec::with_capacity(derivatives.len());
    for m in 0..derivatives.len() {
        let lower = (0..m).fold(Vector3::zeros(), |acc, k| {
            acc + b[k] * (binomial(m, k) * l[m - k])
        });
        b.push((derivatives[m] - lower) / l0);
    }
    Ok(b)
}

/// Closed-form first derivative `b' = (L^2 a' - a (a . a')) / L^3`.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroVector`] if `a` vanishes, or
/// [`GeometryError::NumericDegeneracy`] if its length is not finite.
pub fn normalized_first_derivative(a: &Vector3, da: &Vector3) -> Result<Vector3> {
    let len = checked_length(a.norm())?;
    Ok((da * (len * len) - a * a.dot(da)) / (len * len * len))
}
