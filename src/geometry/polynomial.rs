use crate::math::ScalarSeries;

/// A scalar cubic `P(t) = a t^3 + b t^2 + c t + d`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Polynomial {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Polynomial {
    /// Creates a cubic from its coefficients, highest degree first.
    #[must_use]
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// The constant polynomial `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, value)
    }

    /// Returns the coefficients `(a, b, c, d)`.
    #[must_use]
    pub fn coefficients(&self) -> (f64, f64, f64, f64) {
        (self.a, self.b, self.c, self.d)
    }

    /// Evaluates `P(t)`.
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        ((self.a * t + self.b) * t + self.c) * t + self.d
    }

    /// Evaluates `P'(t)`.
    #[must_use]
    pub fn derivative(&self, t: f64) -> f64 {
        (3.0 * self.a * t + 2.0 * self.b) * t + self.c
    }

    /// Evaluates `P''(t)`.
    #[must_use]
    pub fn derivative2(&self, t: f64) -> f64 {
        6.0 * self.a * t + 2.0 * self.b
    }

    /// Evaluates `P'''(t)`, which is constant for a cubic.
    #[must_use]
    pub fn derivative3(&self, _t: f64) -> f64 {
        6.0 * self.a
    }

    /// Returns the `k`-th derivative at `t`; zero for `k >= 4`.
    #[must_use]
    pub fn derivative_n(&self, t: f64, k: usize) -> f64 {
        match k {
            0 => self.evaluate(t),
            1 => self.derivative(t),
            2 => self.derivative2(t),
            3 => self.derivative3(t),
            _ => 0.0,
        }
    }

    /// Taylor expansion around `t` carrying derivatives up to `order`.
    #[must_use]
    pub fn series(&self, t: f64, order: usize) -> ScalarSeries {
        let derivatives: Vec<f64> = (0..=order).map(|k| self.derivative_n(t, k)).collect();
        ScalarSeries::from_derivatives(&derivatives)
    }
}
