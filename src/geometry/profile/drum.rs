use crate::error::{GeometryError, Result};
use crate::math::TOLERANCE;

use super::{Profile, ToolFrame};

/// A barrel-shaped drum tool.
///
/// The profile is an arc of curvature radius `r0` whose widest point has
/// radius `rm` at `a = 0`:
/// `radius(a) = r0 - sqrt((r0 - rm)^2 + a^2)`.
/// The axial range is symmetric, `a1 = -a0 = (r0 - rm) tan(asin(h / (2 r0)))`.
#[derive(Debug, Clone, PartialEq)]
pub struct Drum {
    curvature_radius: f64,
    mid_radius: f64,
    height: f64,
    a1: f64,
    frame: ToolFrame,
}

impl Drum {
    /// Creates a new drum profile.
    ///
    /// # Arguments
    ///
    /// * `curvature_radius` - Radius of the barrel arc, larger than `mid_radius`
    /// * `mid_radius` - Radius at the widest point (must be positive)
    /// * `height` - Chord height, below `2 * curvature_radius`
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters do not describe a drum with a
    /// positive radius over its whole axial range.
    pub fn new(curvature_radius: f64, mid_radius: f64, height: f64) -> Result<Self> {
        if [curvature_radius, mid_radius, height].iter().any(|v| !v.is_finite()) {
            return Err(
                GeometryError::InvalidProfile("drum parameters must be finite".into()).into(),
            );
        }
        if mid_radius < TOLERANCE {
            return Err(
                GeometryError::InvalidProfile("drum mid radius must be positive".into()).into(),
            );
        }
        if curvature_radius <= mid_radius + TOLERANCE {
            return Err(GeometryError::InvalidProfile(
                "drum curvature radius must exceed the mid radius".into(),
            )
            .into());
        }
        let max_height = 2.0 * curvature_radius;
        if height < TOLERANCE || height >= max_height - TOLERANCE {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "height",
                value: height,
                min: 0.0,
                max: max_height,
            }
            .into());
        }

        let a1 = (curvature_radius - mid_radius) * (height / max_height).asin().tan();
        let drum = Self {
            curvature_radius,
            mid_radius,
            height,
            a1,
            frame: ToolFrame::default(),
        };
        if drum.radius_at(a1) < TOLERANCE {
            return Err(GeometryError::InvalidProfile(
                "drum radius vanishes inside its axial range".into(),
            )
            .into());
        }
        Ok(drum)
    }

    /// Replaces the local frame.
    #[must_use]
    pub fn with_frame(mut self, frame: ToolFrame) -> Self {
        self.frame = frame;
        self
    }

    /// Radius of the barrel arc.
    #[must_use]
    pub fn curvature_radius(&self) -> f64 {
        self.curvature_radius
    }

    /// Radius at the widest point.
    #[must_use]
    pub fn mid_radius(&self) -> f64 {
        self.mid_radius
    }

    /// Configured chord height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    fn offset(&self) -> f64 {
        self.curvature_radius - self.mid_radius
    }
}

impl Profile for Drum {
    fn radius_at(&self, a: f64) -> f64 {
        self.curvature_radius - self.offset().hypot(a)
    }

    fn radius_derivative_at(&self, a: f64) -> f64 {
        -a / self.offset().hypot(a)
    }

    fn axial_bounds(&self) -> (f64, f64) {
        (-self.a1, self.a1)
    }

    fn frame(&self) -> &ToolFrame {
        &self.frame
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn drum() -> Drum {
        Drum::new(5.0, 1.0, 2.0).unwrap()
    }

    #[test]
    fn widest_at_middle() {
        let d = drum();
        assert_relative_eq!(d.radius_at(0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(d.radius_derivative_at(0.0), 0.0);
    }

    #[test]
    fn strictly_decreasing_in_abs_a() {
        let d = drum();
        let (_, a1) = d.axial_bounds();
        let mut previous = d.radius_at(0.0);
        for i in 1..=10 {
            let a = a1 * f64::from(i) / 10.0;
            let r = d.radius_at(a);
            assert!(r < previous);
            assert_relative_eq!(r, d.radius_at(-a), epsilon = 1e-12);
            previous = r;
        }
    }

    #[test]
    fn symmetric_bounds() {
        let d = drum();
        let (a0, a1) = d.axial_bounds();
        let expected = 4.0 * (0.2_f64).asin().tan();
        assert_relative_eq!(a1, expected, epsilon = 1e-12);
        assert_relative_eq!(a0, -a1);
    }

    #[test]
    fn derivative_matches_difference_quotient() {
        let d = drum();
        let h = 1e-6;
        let a = 0.4;
        let fd = (d.radius_at(a + h) - d.radius_at(a - h)) / (2.0 * h);
        assert_relative_eq!(fd, d.radius_derivative_at(a), epsilon = 1e-8);
        assert!(d.radius_derivative_at(a).abs() < 1.0);
    }

    #[test]
    fn invalid_parameters() {
        assert!(Drum::new(1.0, 2.0, 1.0).is_err());
        assert!(Drum::new(5.0, 0.0, 1.0).is_err());
        assert!(Drum::new(5.0, 1.0, 10.0).is_err());
        // Radius would go negative before the chord ends
        assert!(Drum::new(5.0, 0.1, 9.9).is_err());
    }

    #[test]
    fn non_finite_parameters() {
        for (curvature, mid, height) in [
            (f64::NAN, 1.0, 1.0),
            (5.0, f64::NAN, 1.0),
            (5.0, 1.0, f64::NAN),
            (f64::INFINITY, 1.0, 1.0),
        ] {
            assert!(matches!(
                Drum::new(curvature, mid, height),
                Err(crate::SweepError::Geometry(GeometryError::InvalidProfile(_)))
            ));
        }
    }
}
