use crate::error::{GeometryError, Result};
use crate::math::rotation::AxisAngle;
use crate::math::{Vector3, VectorSeries, TOLERANCE};

use super::{ToolProfile, VectorPath};

/// Tool motion along a path with a reorienting axis.
///
/// The axis is blended linearly between the two boundary directions as given
/// and then normalized: `axis(t) = normalize(d0 + (d1 - d0) t)`. Their
/// lengths weight the blend.
#[derive(Debug, Clone)]
pub struct ToolMovement {
    path: VectorPath,
    start_axis: Vector3,
    end_axis: Vector3,
}

impl ToolMovement {
    /// Creates a movement along `path` with axis directions at `t = 0` and `t = 1`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidOrientation`] if either direction is
    /// zero or not finite.
    pub fn new(path: VectorPath, start_axis: Vector3, end_axis: Vector3) -> Result<Self> {
        let (start_axis, end_axis) = checked_directions(&start_axis, &end_axis)?;
        Ok(Self {
            path,
            start_axis,
            end_axis,
        })
    }

    /// The governing path.
    #[must_use]
    pub fn path(&self) -> &VectorPath {
        &self.path
    }

    /// Mutable access to the governing path.
    pub fn path_mut(&mut self) -> &mut VectorPath {
        &mut self.path
    }

    /// Boundary directions `(d0, d1)` as given.
    #[must_use]
    pub fn axis_directions(&self) -> (Vector3, Vector3) {
        (self.start_axis, self.end_axis)
    }

    /// Replaces both boundary directions.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidOrientation`] if either direction is
    /// zero or not finite; the previous directions are kept.
    pub fn set_axis_directions(&mut self, start_axis: Vector3, end_axis: Vector3) -> Result<()> {
        let (start_axis, end_axis) = checked_directions(&start_axis, &end_axis)?;
        self.start_axis = start_axis;
        self.end_axis = end_axis;
        Ok(())
    }

    /// Unit tool axis at `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the linear blend vanishes at `t`, which only
    /// happens for opposite boundary directions at `t = 0.5`.
    pub fn axis_at(&self, t: f64) -> Result<Vector3> {
        Ok(self.axis_series(t, 0)?.value())
    }

    /// Taylor expansion of the unit axis around `t` up to `order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the linear blend vanishes at `t`.
    pub fn axis_series(&self, t: f64, order: usize) -> Result<VectorSeries> {
        let slope = self.end_axis - self.start_axis;
        let blend = VectorSeries::linear(self.start_axis + slope * t, slope, order);
        blend.normalize().map_err(|_| {
            GeometryError::NumericDegeneracy(format!("tool axis blend vanishes at t = {t}"))
                .into()
        })
    }

    /// Value and derivatives of the unit axis at `t` up to `order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the linear blend vanishes at `t`.
    pub fn axis_derivatives(&self, t: f64, order: usize) -> Result<Vec<Vector3>> {
        Ok(self.axis_series(t, order)?.derivatives())
    }

    /// Rotation carrying the profile's canonical axis onto `axis_at(t)`.
    ///
    /// For anti-parallel directions the rotation axis is the profile's
    /// perpendicular vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis cannot be evaluated at `t`.
    pub fn rotation_to_align(&self, t: f64, profile: &ToolProfile) -> Result<AxisAngle> {
        let target = self.axis_at(t)?;
        AxisAngle::between(
            profile.axis_vector(),
            &target,
            profile.perpendicular_vector(),
        )
    }
}

fn checked_directions(start: &Vector3, end: &Vector3) -> Result<(Vector3, Vector3)> {
    for direction in [start, end] {
        if direction.iter().any(|c| !c.is_finite()) || direction.norm() < TOLERANCE {
            return Err(GeometryError::InvalidOrientation.into());
        }
    }
    Ok((*start, *end))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{Cylinder, Polynomial};
    use crate::math::rotation::rotation_matrix;

    fn line_path() -> VectorPath {
        VectorPath::new(
            Polynomial::new(0.0, 0.0, 1.0, 0.0),
            Polynomial::constant(0.0),
            Polynomial::constant(0.0),
            10,
        )
        .unwrap()
    }

    fn movement(d0: Vector3, d1: Vector3) -> ToolMovement {
        ToolMovement::new(line_path(), d0, d1).unwrap()
    }

    fn profile() -> ToolProfile {
        Cylinder::new(0.5, 0.0, 1.0).unwrap().into()
    }

    #[test]
    fn axis_is_unit_everywhere() {
        let directions = [
            (Vector3::z(), Vector3::y()),
            (Vector3::new(1.0, 2.0, 3.0), Vector3::new(-3.0, 0.5, 0.1)),
            (Vector3::z() * 7.0, Vector3::z()),
        ];
        for (d0, d1) in directions {
            let m = movement(d0, d1);
            for i in 0..=20 {
                let t = f64::from(i) / 20.0;
                assert_relative_eq!(m.axis_at(t).unwrap().norm(), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn interpolates_in_vector_space_then_normalizes() {
        let m = movement(Vector3::z(), Vector3::x());
        let mid = m.axis_at(0.5).unwrap();
        assert_relative_eq!(mid, Vector3::new(1.0, 0.0, 1.0).normalize(), epsilon = 1e-12);
        assert_relative_eq!(m.axis_at(0.0).unwrap(), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(m.axis_at(1.0).unwrap(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn derivative_matches_difference_quotient() {
        let m = movement(Vector3::z(), Vector3::new(1.0, 1.0, 0.0));
        let h = 1e-5;
        let t = 0.3;
        let d = m.axis_derivatives(t, 2).unwrap();
        let fd = (m.axis_at(t + h).unwrap() - m.axis_at(t - h).unwrap()) / (2.0 * h);
        assert_relative_eq!(d[1], fd, epsilon = 1e-8);
    }

    #[test]
    fn zero_direction_is_rejected_and_state_kept() {
        let mut m = movement(Vector3::z(), Vector3::y());
        let r = m.set_axis_directions(Vector3::zeros(), Vector3::x());
        assert!(matches!(
            r,
            Err(crate::SweepError::Geometry(GeometryError::InvalidOrientation))
        ));
        assert_eq!(m.axis_directions(), (Vector3::z(), Vector3::y()));
        assert!(ToolMovement::new(line_path(), Vector3::x(), Vector3::zeros()).is_err());
    }

    #[test]
    fn non_finite_direction_is_rejected_and_state_kept() {
        let mut m = movement(Vector3::z(), Vector3::y());
        for bad in [
            Vector3::new(f64::NAN, 0.0, 1.0),
            Vector3::new(0.0, f64::INFINITY, 0.0),
        ] {
            let r = m.set_axis_directions(Vector3::x(), bad);
            assert!(matches!(
                r,
                Err(crate::SweepError::Geometry(GeometryError::InvalidOrientation))
            ));
            assert!(ToolMovement::new(line_path(), bad, Vector3::x()).is_err());
        }
        assert_eq!(m.axis_directions(), (Vector3::z(), Vector3::y()));
    }

    #[test]
    fn direction_lengths_weight_the_blend() {
        let m = movement(Vector3::z() * 3.0, Vector3::x());
        assert_eq!(m.axis_directions(), (Vector3::z() * 3.0, Vector3::x()));
        let expected = Vector3::new(0.5, 0.0, 1.5).normalize();
        assert_relative_eq!(m.axis_at(0.5).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn opposite_directions_vanish_at_midpoint() {
        let m = movement(Vector3::z(), -Vector3::z());
        assert!(m.axis_at(0.5).is_err());
        assert!(m.axis_at(0.2).is_ok());
    }

    #[test]
    fn alignment_rotation_maps_canonical_axis() {
        let m = movement(Vector3::y(), Vector3::x());
        let p = profile();
        let r = m.rotation_to_align(0.4, &p).unwrap();
        let mapped = r.matrix().transform_vector(p.axis_vector());
        assert_relative_eq!(mapped, m.axis_at(0.4).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn anti_parallel_alignment_uses_perpendicular() {
        let m = movement(-Vector3::z(), -Vector3::z());
        let p = profile();
        let r = m.rotation_to_align(0.0, &p).unwrap();
        assert!(r.fallback);
        assert_relative_eq!(r.axis, *p.perpendicular_vector());
        assert_relative_eq!(r.angle, PI, epsilon = 1e-12);
        let expected = rotation_matrix(&Vector3::x(), PI).transform_vector(&Vector3::z());
        assert_relative_eq!(expected, -Vector3::z(), epsilon = 1e-12);
    }
}
