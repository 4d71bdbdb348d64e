use std::f64::consts::FRAC_PI_2;

use crate::error::{GeometryError, Result};
use crate::math::TOLERANCE;

use super::{Profile, ToolFrame};

/// A cylindrical tool generalized to a conical frustum.
///
/// `radius(a) = r cos(theta) + a sin(theta)` for `a` in `[0, a1]`, where
/// `r` is the base radius and `theta` the half-angle. With `theta = 0` this
/// is a plain cylinder of radius `r`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    radius: f64,
    angle: f64,
    height: f64,
    a1: f64,
    frame: ToolFrame,
}

impl Cylinder {
    /// Creates a new cylinder profile.
    ///
    /// # Arguments
    ///
    /// * `radius` - Base radius (must be positive)
    /// * `angle` - Half-angle in radians, in `(-pi/2, pi/2)`
    /// * `height` - Axial extent (must be positive)
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of range.
    pub fn new(radius: f64, angle: f64, height: f64) -> Result<Self> {
        if [radius, angle, height].iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::InvalidProfile(
                "cylinder parameters must be finite".into(),
            )
            .into());
        }
        if radius < TOLERANCE {
            return Err(
                GeometryError::InvalidProfile("cylinder radius must be positive".into()).into(),
            );
        }
        if angle.abs() >= FRAC_PI_2 - TOLERANCE {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "angle",
                value: angle,
                min: -FRAC_PI_2,
                max: FRAC_PI_2,
            }
            .into());
        }
        if height < TOLERANCE {
            return Err(
                GeometryError::InvalidProfile("cylinder height must be positive".into()).into(),
            );
        }

        let (sin, cos) = angle.sin_cos();
        // A narrowing cone stops at its apex.
        let a1 = if sin < -TOLERANCE {
            height.min(-radius * cos / sin)
        } else {
            height
        };

        Ok(Self {
            radius,
            angle,
            height,
            a1,
            frame: ToolFrame::default(),
        })
    }

    /// Replaces the local frame.
    #[must_use]
    pub fn with_frame(mut self, frame: ToolFrame) -> Self {
        self.frame = frame;
        self
    }

    /// Base radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Half-angle in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Configured height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl Profile for Cylinder {
    fn radius_at(&self, a: f64) -> f64 {
        self.radius * self.angle.cos() + a * self.angle.sin()
    }

    fn radius_derivative_at(&self, _a: f64) -> f64 {
        self.angle.sin()
    }

    fn axial_bounds(&self) -> (f64, f64) {
        (0.0, self.a1)
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

    #[test]
    fn straight_cylinder_has_constant_radius() {
        let c = Cylinder::new(0.5, 0.0, 2.0).unwrap();
        assert_eq!(c.axial_bounds(), (0.0, 2.0));
        for i in 0..=20 {
            let a = f64::from(i) * 0.1;
            assert_relative_eq!(c.radius_at(a), 0.5);
            assert_relative_eq!(c.radius_derivative_at(a), 0.0);
        }
    }

    #[test]
    fn radius_is_affine() {
        let theta: f64 = 0.3;
        let c = Cylinder::new(1.0, theta, 3.0).unwrap();
        for &a in &[0.0, 0.5, 1.7, 3.0] {
            assert_relative_eq!(c.radius_at(a), theta.cos() + a * theta.sin(), epsilon = 1e-12);
        }
        let slope = (c.radius_at(2.0) - c.radius_at(1.0)) / 1.0;
        assert_relative_eq!(slope, c.radius_derivative_at(1.5), epsilon = 1e-12);
    }

    #[test]
    fn narrowing_cone_stops_at_apex() {
        let theta: f64 = -0.5;
        let c = Cylinder::new(1.0, theta, 10.0).unwrap();
        let (_, a1) = c.axial_bounds();
        assert_relative_eq!(c.radius_at(a1), 0.0, epsilon = 1e-12);
        assert!(a1 < 10.0);
    }

    #[test]
    fn short_narrowing_cone_keeps_height() {
        let c = Cylinder::new(1.0, -0.1, 0.5).unwrap();
        assert_relative_eq!(c.axial_bounds().1, 0.5);
    }

    #[test]
    fn invalid_parameters() {
        assert!(Cylinder::new(0.0, 0.0, 1.0).is_err());
        assert!(Cylinder::new(1.0, FRAC_PI_2, 1.0).is_err());
        assert!(Cylinder::new(1.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn non_finite_parameters() {
        for (radius, angle, height) in [
            (f64::NAN, 0.0, 1.0),
            (1.0, f64::NAN, 1.0),
            (1.0, 0.0, f64::INFINITY),
            (f64::INFINITY, 0.2, 1.0),
        ] {
            assert!(matches!(
                Cylinder::new(radius, angle, height),
                Err(crate::SweepError::Geometry(GeometryError::InvalidProfile(_)))
            ));
        }
    }
}
