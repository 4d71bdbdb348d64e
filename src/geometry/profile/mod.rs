mod cylinder;
mod drum;

pub use cylinder::Cylinder;
pub use drum::Drum;

use crate::error::{GeometryError, Result};
use crate::math::{Vector3, TOLERANCE};
use crate::tessellation::{TessellateProfile, TriangleMesh};

/// Canonical orientation of a tool in its local frame.
///
/// `perpendicular` is orthogonal to `axis` and breaks the rotation-axis
/// degeneracy when two directions are parallel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolFrame {
    axis: Vector3,
    perpendicular: Vector3,
}

impl ToolFrame {
    /// Creates a frame from an axis and a reference vector not parallel to it.
    ///
    /// Both are normalized and the reference is made orthogonal to the axis.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidOrientation`] if the axis is zero, or
    /// [`GeometryError::ZeroVector`] if the reference is parallel to it.
    pub fn new(axis: Vector3, reference: Vector3) -> Result<Self> {
        let axis_len = axis.norm();
        if axis_len < TOLERANCE {
            return Err(GeometryError::InvalidOrientation.into());
        }
        let axis = axis / axis_len;
        let perp = reference - axis * reference.dot(&axis);
        let perp_len = perp.norm();
        if perp_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            axis,
            perpendicular: perp / perp_len,
        })
    }

    /// Unit tool axis.
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Unit vector perpendicular to the axis.
    #[must_use]
    pub fn perpendicular(&self) -> &Vector3 {
        &self.perpendicular
    }
}

impl Default for ToolFrame {
    fn default() -> Self {
        Self {
            axis: Vector3::z(),
            perpendicular: Vector3::x(),
        }
    }
}

/// Capability set shared by every rotational tool profile.
///
/// The profile is the family of spheres centered on the tool axis at axial
/// coordinate `a` with radius `radius_at(a)`; the tool surface is their
/// envelope.
pub trait Profile {
    /// Sphere radius at axial coordinate `a`.
    fn radius_at(&self, a: f64) -> f64;

    /// Derivative of the radius with respect to `a`.
    fn radius_derivative_at(&self, a: f64) -> f64;

    /// Axial range `(a0, a1)`.
    fn axial_bounds(&self) -> (f64, f64);

    /// Local frame of the tool.
    fn frame(&self) -> &ToolFrame;
}

/// The closed set of supported tool shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolProfile {
    /// Cylinder generalized to a conical frustum.
    Cylinder(Cylinder),
    /// Barrel-shaped drum.
    Drum(Drum),
}

impl ToolProfile {
    fn inner(&self) -> &dyn Profile {
        match self {
            Self::Cylinder(c) => c,
            Self::Drum(d) => d,
        }
    }

    /// Sphere radius at axial coordinate `a`.
    #[must_use]
    pub fn radius_at(&self, a: f64) -> f64 {
        self.inner().radius_at(a)
    }

    /// Derivative of the radius with respect to `a`.
    #[must_use]
    pub fn radius_derivative_at(&self, a: f64) -> f64 {
        self.inner().radius_derivative_at(a)
    }

    /// Axial range `(a0, a1)`.
    #[must_use]
    pub fn axial_bounds(&self) -> (f64, f64) {
        self.inner().axial_bounds()
    }

    /// Unit tool axis in the local frame.
    #[must_use]
    pub fn axis_vector(&self) -> &Vector3 {
        self.inner().frame().axis()
    }

    /// Unit vector perpendicular to the tool axis.
    #[must_use]
    pub fn perpendicular_vector(&self) -> &Vector3 {
        self.inner().frame().perpendicular()
    }

    /// Axial coordinate at normalized position `s in [0, 1]`.
    #[must_use]
    pub fn axial_at(&self, s: f64) -> f64 {
        let (a0, a1) = self.axial_bounds();
        a0 + (a1 - a0) * s
    }

    /// Tessellates the tool surface with `sectors` steps along the axis and
    /// around it, base anchored at the local origin.
    ///
    /// # Errors
    ///
    /// Returns an error if `sectors` is zero.
    pub fn tessellate(&self, sectors: usize) -> Result<TriangleMesh> {
        TessellateProfile::new(self, sectors).execute()
    }
}

impl From<Cylinder> for ToolProfile {
    fn from(c: Cylinder) -> Self {
        Self::Cylinder(c)
    }
}

impl From<Drum> for ToolProfile {
    fn from(d: Drum) -> Self {
        Self::Drum(d)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn frame_orthogonalizes_reference() {
        let f = ToolFrame::new(Vector3::z() * 3.0, Vector3::new(1.0, 0.0, 1.0)).unwrap();
        assert_relative_eq!(*f.axis(), Vector3::z());
        assert_relative_eq!(*f.perpendicular(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn frame_rejects_zero_axis() {
        let r = ToolFrame::new(Vector3::zeros(), Vector3::x());
        assert!(matches!(
            r,
            Err(crate::SweepError::Geometry(GeometryError::InvalidOrientation))
        ));
    }

    #[test]
    fn frame_rejects_parallel_reference() {
        assert!(ToolFrame::new(Vector3::z(), Vector3::z() * 2.0).is_err());
    }

    #[test]
    fn dispatch_reaches_variants() {
        let cyl: ToolProfile = Cylinder::new(0.5, 0.0, 2.0).unwrap().into();
        let drum: ToolProfile = Drum::new(5.0, 1.0, 2.0).unwrap().into();
        assert_relative_eq!(cyl.radius_at(1.0), 0.5);
        assert_relative_eq!(drum.radius_at(0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(*cyl.axis_vector(), Vector3::z());
        assert_relative_eq!(*drum.perpendicular_vector(), Vector3::x());
        let (a0, a1) = drum.axial_bounds();
        assert_relative_eq!(drum.axial_at(0.5), 0.5 * (a0 + a1), epsilon = 1e-12);
    }
}
