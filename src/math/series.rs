use std::ops::{Add, Mul, Neg, Sub};

use crate::error::{GeometryError, Result};

use super::{Vector3, TOLERANCE};

/// Values usable as Taylor coefficients.
pub trait Coefficient:
    Copy + Add<Output = Self> + Sub<Output = Self> + Neg<Output = Self> + Mul<f64, Output = Self>
{
    /// The additive identity.
    fn zero() -> Self;
}

impl Coefficient for f64 {
    fn zero() -> Self {
        0.0
    }
}

impl Coefficient for Vector3 {
    fn zero() -> Self {
        Vector3::zeros()
    }
}

/// A truncated Taylor series in the time parameter around a fixed time.
///
/// Coefficient `k` holds `f^(k)(t) / k!`. The order of a series is the
/// highest derivative it carries; binary operations truncate to the lower
/// order of their operands, so exactness is preserved up to that order.
#[derive(Debug, Clone, PartialEq)]
pub struct Series<C> {
    coeffs: Vec<C>,
}

/// Scalar-valued series.
pub type ScalarSeries = Series<f64>;

/// Vector-valued series.
pub type VectorSeries = Series<Vector3>;

#[allow(clippy::cast_precision_loss)]
fn factorial(k: usize) -> f64 {
    (1..=k).map(|i| i as f64).product()
}

impl<C: Coefficient> Series<C> {
    /// Creates a series from raw Taylor coefficients.
    ///
    /// An empty coefficient list yields the zero series of order 0.
    #[must_use]
    pub fn from_coefficients(mut coeffs: Vec<C>) -> Self {
        if coeffs.is_empty() {
            coeffs.push(C::zero());
        }
        Self { coeffs }
    }

    /// Creates a series from the value and successive derivatives `f, f', f'', ...`.
    #[must_use]
    pub fn from_derivatives(derivatives: &[C]) -> Self {
        let coeffs = derivatives
            .iter()
            .enumerate()
            .map(|(k, &d)| d * (1.0 / factorial(k)))
            .collect();
        Self::from_coefficients(coeffs)
    }

    /// A constant series of the given order.
    #[must_use]
    pub fn constant(value: C, order: usize) -> Self {
        let mut coeffs = vec![C::zero(); order + 1];
        coeffs[0] = value;
        Self { coeffs }
    }

    /// The series of `value + slope * (s - t)`.
    #[must_use]
    pub fn linear(value: C, slope: C, order: usize) -> Self {
        let mut series = Self::constant(value, order);
        if order > 0 {
            series.coeffs[1] = slope;
        }
        series
    }

    /// Highest derivative order carried by this series.
    #[must_use]
    pub fn order(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// The value at the expansion point.
    #[must_use]
    pub fn value(&self) -> C {
        self.coeffs[0]
    }

    /// Raw Taylor coefficients.
    #[must_use]
    pub fn coefficients(&self) -> &[C] {
        &self.coeffs
    }

    /// Returns the `k`-th derivative, zero beyond the carried order.
    #[must_use]
    pub fn derivative_value(&self, k: usize) -> C {
        self.coeffs
            .get(k)
            .map_or_else(C::zero, |&c| c * factorial(k))
    }

    /// Returns the value followed by every carried derivative.
    #[must_use]
    pub fn derivatives(&self) -> Vec<C> {
        (0..=self.order()).map(|k| self.derivative_value(k)).collect()
    }

    /// Differentiates once, lowering the order by one.
    ///
    /// An order-0 series has no derivative information left and yields zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn derivative(&self) -> Self {
        if self.coeffs.len() == 1 {
            return Self::constant(C::zero(), 0);
        }
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, &c)| c * k as f64)
            .collect();
        Self { coeffs }
    }

    /// Drops every coefficient above `order`.
    #[must_use]
    pub fn truncate(&self, order: usize) -> Self {
        Self {
            coeffs: self.coeffs.iter().take(order + 1).copied().collect(),
        }
    }

    /// Multiplies by a scalar series (Leibniz rule).
    #[must_use]
    pub fn scaled(&self, factor: &ScalarSeries) -> Self {
        let n = self.coeffs.len().min(factor.coeffs.len());
        let coeffs = (0..n)
            .map(|k| {
                (0..=k).fold(C::zero(), |acc, j| {
                    acc + self.coeffs[j] * factor.coeffs[k - j]
                })
            })
            .collect();
        Self { coeffs }
    }

    fn zip_with(&self, other: &Self, f: impl Fn(C, C) -> C) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .zip(&other.coeffs)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Self { coeffs }
    }
}

impl<C: Coefficient> Add for &Series<C> {
    type Output = Series<C>;

    fn add(self, rhs: Self) -> Series<C> {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl<C: Coefficient> Add for Series<C> {
    type Output = Series<C>;

    fn add(self, rhs: Self) -> Series<C> {
        &self + &rhs
    }
}

impl<C: Coefficient> Sub for &Series<C> {
    type Output = Series<C>;

    fn sub(self, rhs: Self) -> Series<C> {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl<C: Coefficient> Sub for Series<C> {
    type Output = Series<C>;

    fn sub(self, rhs: Self) -> Series<C> {
        &self - &rhs
    }
}

impl<C: Coefficient> Neg for &Series<C> {
    type Output = Series<C>;

    fn neg(self) -> Series<C> {
        Series {
            coeffs: self.coeffs.iter().map(|&c| -c).collect(),
        }
    }
}

impl<C: Coefficient> Mul<f64> for &Series<C> {
    type Output = Series<C>;

    fn mul(self, rhs: f64) -> Series<C> {
        Series {
            coeffs: self.coeffs.iter().map(|&c| c * rhs).collect(),
        }
    }
}

impl<C: Coefficient> Mul<f64> for Series<C> {
    type Output = Series<C>;

    fn mul(self, rhs: f64) -> Series<C> {
        &self * rhs
    }
}

impl ScalarSeries {
    /// The identity function `s` expanded around `t`.
    #[must_use]
    pub fn variable(t: f64, order: usize) -> Self {
        Self::linear(t, 1.0, order)
    }

    /// Product of two scalar series.
    #[must_use]
    pub fn product(&self, other: &Self) -> Self {
        self.scaled(other)
    }

    /// Adds a constant to the value term.
    #[must_use]
    pub fn offset(&self, value: f64) -> Self {
        let mut coeffs = self.coeffs.clone();
        coeffs[0] += value;
        Self { coeffs }
    }

    /// Reciprocal `1 / u`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NumericDegeneracy`] if the value vanishes.
    pub fn recip(&self) -> Result<Self> {
        let v0 = self.coeffs[0];
        if v0.abs() < TOLERANCE {
            return Err(
                GeometryError::NumericDegeneracy("reciprocal of a vanishing value".into()).into(),
            );
        }
        let mut w: Vec<f64> = Vec::with_capacity(self.coeffs.len());
        for k in 0..self.coeffs.len() {
            let mut acc = if k == 0 { 1.0 } else { 0.0 };
            for j in 1..=k {
                acc -= self.coeffs[j] * w[k - j];
            }
            w.push(acc / v0);
        }
        Ok(Self { coeffs: w })
    }

    /// Square root `sqrt(u)`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NumericDegeneracy`] if the value is negative,
    /// or vanishes while derivatives are requested.
    pub fn sqrt(&self) -> Result<Self> {
        let u0 = self.coeffs[0];
        if u0 < 0.0 || (u0 < TOLERANCE && self.coeffs.len() > 1) {
            return Err(GeometryError::NumericDegeneracy(format!(
                "square root of non-positive value {u0}"
            ))
            .into());
        }
        let s0 = u0.sqrt();
        let mut s = Vec::with_capacity(self.coeffs.len());
        s.push(s0);
        for k in 1..self.coeffs.len() {
            let mut acc = self.coeffs[k];
            for j in 1..k {
                acc -= s[j] * s[k - j];
            }
            s.push(acc / (2.0 * s0));
        }
        Ok(Self { coeffs: s })
    }

    /// Returns `(sin(u), cos(u))`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sin_cos(&self) -> (Self, Self) {
        let n = self.coeffs.len();
        let (s0, c0) = self.coeffs[0].sin_cos();
        let mut s = Vec::with_capacity(n);
        let mut c = Vec::with_capacity(n);
        s.push(s0);
        c.push(c0);
        for k in 1..n {
            let mut ds = 0.0;
            let mut dc = 0.0;
            for j in 1..=k {
                let ju = j as f64 * self.coeffs[j];
                ds += ju * c[k - j];
                dc -= ju * s[k - j];
            }
            s.push(ds / k as f64);
            c.push(dc / k as f64);
        }
        (Self { coeffs: s }, Self { coeffs: c })
    }

    /// Arc cosine `acos(u)`, value clamped to `[-1, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NumericDegeneracy`] if derivatives are
    /// requested at `|u| = 1`.
    #[allow(clippy::cast_precision_loss)]
    pub fn acos(&self) -> Result<Self> {
        let n = self.coeffs.len();
        let y0 = self.coeffs[0].clamp(-1.0, 1.0).acos();
        if n == 1 {
            return Ok(Self { coeffs: vec![y0] });
        }
        let radicand = (-&self.product(self)).offset(1.0);
        let w = -&radicand.sqrt()?.recip()?;
        let mut y = Vec::with_capacity(n);
        y.push(y0);
        for k in 1..n {
            let acc: f64 = (1..=k)
                .map(|j| j as f64 * self.coeffs[j] * w.coeffs[k - j])
                .sum();
            y.push(acc / k as f64);
        }
        Ok(Self { coeffs: y })
    }
}

impl VectorSeries {
    /// Dot product series.
    #[must_use]
    pub fn dot(&self, other: &Self) -> ScalarSeries {
        let n = self.coeffs.len().min(other.coeffs.len());
        let coeffs = (0..n)
            .map(|k| {
                (0..=k)
                    .map(|j| self.coeffs[j].dot(&other.coeffs[k - j]))
                    .sum::<f64>()
            })
            .collect();
        Series { coeffs }
    }

    /// Cross product series.
    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        let n = self.coeffs.len().min(other.coeffs.len());
        let coeffs = (0..n)
            .map(|k| {
                (0..=k).fold(Vector3::zeros(), |acc, j| {
                    acc + self.coeffs[j].cross(&other.coeffs[k - j])
                })
            })
            .collect();
        Self { coeffs }
    }

    /// Squared length series.
    #[must_use]
    pub fn norm_squared(&self) -> ScalarSeries {
        self.dot(self)
    }

    /// Unit-length series `a / |a|`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector vanishes at the expansion point.
    pub fn normalize(&self) -> Result<Self> {
        let derivatives = super::normalized::normalized_derivatives(&self.derivatives())?;
        Ok(Self::from_derivatives(&derivatives))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn derivative_roundtrip_through_coefficients() {
        let s = ScalarSeries::from_derivatives(&[2.0, 3.0, 4.0, 6.0]);
        assert_relative_eq!(s.coefficients()[2], 2.0);
        assert_relative_eq!(s.coefficients()[3], 1.0);
        for (got, want) in s.derivatives().into_iter().zip([2.0, 3.0, 4.0, 6.0]) {
            assert_relative_eq!(got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn derivative_shifts_order() {
        // t^3 around t = 2: value 8, derivatives 12, 12, 6
        let s = ScalarSeries::from_derivatives(&[8.0, 12.0, 12.0, 6.0]);
        let d = s.derivative();
        assert_eq!(d.order(), 2);
        assert_relative_eq!(d.derivative_value(0), 12.0);
        assert_relative_eq!(d.derivative_value(1), 12.0);
        assert_relative_eq!(d.derivative_value(2), 6.0);
    }

    #[test]
    fn product_follows_leibniz() {
        let t = ScalarSeries::variable(1.5, 3);
        let sq = t.product(&t);
        assert_relative_eq!(sq.derivative_value(0), 2.25);
        assert_relative_eq!(sq.derivative_value(1), 3.0);
        assert_relative_eq!(sq.derivative_value(2), 2.0);
        assert_relative_eq!(sq.derivative_value(3), 0.0);
    }

    #[test]
    fn mixed_orders_truncate() {
        let a = ScalarSeries::constant(1.0, 4);
        let b = ScalarSeries::constant(2.0, 2);
        assert_eq!((&a + &b).order(), 2);
        assert_eq!(a.product(&b).order(), 2);
    }

    #[test]
    fn reciprocal_of_linear() {
        // 1/t at t = 2: 1/2, -1/4, 2/8, -6/16
        let r = ScalarSeries::variable(2.0, 3).recip().unwrap();
        let d = r.derivatives();
        assert_relative_eq!(d[0], 0.5);
        assert_relative_eq!(d[1], -0.25);
        assert_relative_eq!(d[2], 0.25);
        assert_relative_eq!(d[3], -0.375);
    }

    #[test]
    fn reciprocal_of_zero_is_degenerate() {
        assert!(ScalarSeries::variable(0.0, 2).recip().is_err());
    }

    #[test]
    fn sqrt_of_square() {
        let t = ScalarSeries::variable(3.0, 4);
        let root = t.product(&t).sqrt().unwrap();
        let d = root.derivatives();
        assert_relative_eq!(d[0], 3.0);
        assert_relative_eq!(d[1], 1.0);
        for &higher in &d[2..] {
            assert_relative_eq!(higher, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn sqrt_of_negative_fails() {
        assert!(ScalarSeries::constant(-1.0, 0).sqrt().is_err());
    }

    #[test]
    fn sin_cos_derivatives() {
        let t = 0.7;
        let (s, c) = ScalarSeries::variable(t, 4).sin_cos();
        let ds = s.derivatives();
        let dc = c.derivatives();
        assert_relative_eq!(ds[1], t.cos(), epsilon = 1e-12);
        assert_relative_eq!(ds[2], -t.sin(), epsilon = 1e-12);
        assert_relative_eq!(ds[3], -t.cos(), epsilon = 1e-12);
        assert_relative_eq!(dc[4], t.cos(), epsilon = 1e-12);
    }

    #[test]
    fn acos_derivatives() {
        let x: f64 = 0.3;
        let y = ScalarSeries::variable(x, 2).acos().unwrap();
        let d = y.derivatives();
        let w = 1.0 - x * x;
        assert_relative_eq!(d[0], x.acos(), epsilon = 1e-12);
        assert_relative_eq!(d[1], -1.0 / w.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(d[2], -x / w.powf(1.5), epsilon = 1e-12);
    }

    #[test]
    fn cross_and_dot_of_rotating_vectors() {
        // a(t) = (cos t, sin t, 0), b = (0, 0, 1): a x b = (sin t, -cos t, 0)
        let t = 0.4_f64;
        let (s, c) = ScalarSeries::variable(t, 3).sin_cos();
        let a = VectorSeries::constant(Vector3::x(), 3).scaled(&c)
            + VectorSeries::constant(Vector3::y(), 3).scaled(&s);
        let b = VectorSeries::constant(Vector3::z(), 3);
        let cross = a.cross(&b);
        assert_relative_eq!(
            cross.derivative_value(1),
            Vector3::new(t.cos(), t.sin(), 0.0),
            epsilon = 1e-12
        );
        let len = a.norm_squared();
        assert_relative_eq!(len.derivative_value(0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(len.derivative_value(2), 0.0, epsilon = 1e-12);
    }
}
