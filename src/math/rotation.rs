use crate::error::{GeometryError, Result};

use super::{Matrix4, ScalarSeries, Vector3, VectorSeries, TOLERANCE};

/// A rotation given as a unit axis and an angle in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAngle {
    /// Unit rotation axis.
    pub axis: Vector3,
    /// Rotation angle in radians.
    pub angle: f64,
    /// `true` when the two directions were parallel or anti-parallel and the
    /// axis was taken from the fallback perpendicular instead of their cross
    /// product.
    pub fallback: bool,
}

impl AxisAngle {
    /// Computes the rotation carrying unit direction `from` onto unit
    /// direction `to`.
    ///
    /// When the cross product vanishes the axis is `fallback` made
    /// perpendicular to `from`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the fallback is parallel to `from`.
    pub fn between(from: &Vector3, to: &Vector3, fallback: &Vector3) -> Result<Self> {
        let angle = from.dot(to).clamp(-1.0, 1.0).acos();
        let cross = from.cross(to);
        let len = cross.norm();
        if len > TOLERANCE {
            return Ok(Self {
                axis: cross / len,
                angle,
                fallback: false,
            });
        }
        tracing::trace!(angle, "rotation axis is degenerate, using the fallback perpendicular");
        let axis = reject(fallback, from)?;
        Ok(Self {
            axis,
            angle,
            fallback: true,
        })
    }

    /// The homogeneous rotation matrix of this axis-angle pair.
    #[must_use]
    pub fn matrix(&self) -> Matrix4 {
        rotation_matrix(&self.axis, self.angle)
    }
}

/// Unit component of `v` perpendicular to the unit vector `onto`.
fn reject(v: &Vector3, onto: &Vector3) -> Result<Vector3> {
    let perp = v - onto * v.dot(onto);
    let len = perp.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(perp / len)
}

/// Builds a 4x4 rotation matrix around a unit axis by an angle (Rodrigues).
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn rotation_matrix(axis: &Vector3, angle: f64) -> Matrix4 {
    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    #[allow(clippy::suspicious_operation_groupings)]
    Matrix4::new(
        t * x * x + c,     t * x * y - s * z, t * x * z + s * y, 0.0,
        t * x * y + s * z, t * y * y + c,     t * y * z - s * x, 0.0,
        t * x * z - s * y, t * y * z + s * x, t * z * z + c,     0.0,
        0.0,               0.0,               0.0,               1.0,
    )
}

/// Rotates `v` around the unit axis `k` by `angle`, all as time series.
///
/// `v cos(angle) + (k x v) sin(angle) + k (k . v) (1 - cos(angle))`
#[must_use]
pub fn rotate_series(v: &VectorSeries, k: &VectorSeries, angle: &ScalarSeries) -> VectorSeries {
    let (sin, cos) = angle.sin_cos();
    let one_minus_cos = (-&cos).offset(1.0);
    let along = k.scaled(&k.dot(v).product(&one_minus_cos));
    &(&v.scaled(&cos) + &k.cross(v).scaled(&sin)) + &along
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;

    use super::*;

    fn apply(m: &Matrix4, v: &Vector3) -> Vector3 {
        m.transform_vector(v)
    }

    #[test]
    fn rotate_90_around_z() {
        let m = rotation_matrix(&Vector3::z(), FRAC_PI_2);
        assert_relative_eq!(apply(&m, &Vector3::x()), Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn between_maps_from_onto_to() {
        let from = Vector3::z();
        let to = Vector3::new(1.0, 1.0, 1.0).normalize();
        let r = AxisAngle::between(&from, &to, &Vector3::x()).unwrap();
        assert!(!r.fallback);
        assert_relative_eq!(apply(&r.matrix(), &from), to, epsilon = 1e-12);
    }

    #[test]
    fn anti_parallel_uses_fallback() {
        let r = AxisAngle::between(&Vector3::z(), &-Vector3::z(), &Vector3::x()).unwrap();
        assert!(r.fallback);
        assert_relative_eq!(r.axis, Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(r.angle, PI, epsilon = 1e-12);
        assert_relative_eq!(apply(&r.matrix(), &Vector3::z()), -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn parallel_is_identity() {
        let r = AxisAngle::between(&Vector3::z(), &Vector3::z(), &Vector3::x()).unwrap();
        assert_relative_eq!(r.angle, 0.0);
        assert_relative_eq!(apply(&r.matrix(), &Vector3::y()), Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn series_rotation_matches_matrix() {
        let t = 0.6;
        let angle = ScalarSeries::linear(t, 1.0, 2);
        let v = VectorSeries::constant(Vector3::x(), 2);
        let k = VectorSeries::constant(Vector3::z(), 2);
        let rotated = rotate_series(&v, &k, &angle);
        let expected = apply(&rotation_matrix(&Vector3::z(), t), &Vector3::x());
        assert_relative_eq!(rotated.value(), expected, epsilon = 1e-12);
        // d/dt rotating x about z: (-sin t, cos t, 0)
        assert_relative_eq!(
            rotated.derivative_value(1),
            Vector3::new(-t.sin(), t.cos(), 0.0),
            epsilon = 1e-12
        );
    }
}
