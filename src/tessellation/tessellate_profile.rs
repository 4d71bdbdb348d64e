use std::f64::consts::TAU;

use crate::error::{Result, TessellationError};
use crate::geometry::ToolProfile;
use crate::math::Point2;

use super::{push_grid_triangles, TriangleMesh};

/// Tessellates a tool profile into a triangle mesh in its local frame.
///
/// Each axial step contributes the characteristic circle of the sphere at
/// that step: centered `a + r r'` along the axis with radius
/// `r sqrt(1 - r'^2)`. The base of the tool (`a = a0`) sits at the local
/// origin.
pub struct TessellateProfile<'a> {
    profile: &'a ToolProfile,
    sectors: usize,
}

impl<'a> TessellateProfile<'a> {
    /// Creates a new `TessellateProfile` operation.
    #[must_use]
    pub fn new(profile: &'a ToolProfile, sectors: usize) -> Self {
        Self { profile, sectors }
    }

    /// Executes the tessellation with `sectors` axial steps and `sectors`
    /// angular steps.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 3 sectors are requested.
    #[allow(clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let n = self.sectors;
        if n < 3 {
            return Err(TessellationError::InvalidParameters(
                "tool tessellation needs at least 3 sectors".into(),
            )
            .into());
        }

        let axis = *self.profile.axis_vector();
        let perp = *self.profile.perpendicular_vector();
        let binormal = axis.cross(&perp);
        let (a0, _) = self.profile.axial_bounds();

        let rows = n + 1;
        let cols = n + 1;
        let mut mesh = TriangleMesh::default();
        mesh.vertices.reserve(rows * cols);
        mesh.normals.reserve(rows * cols);
        mesh.uvs.reserve(rows * cols);

        for row in 0..rows {
            let s = row as f64 / n as f64;
            let a = self.profile.axial_at(s);
            let r = self.profile.radius_at(a);
            let slope = self.profile.radius_derivative_at(a).clamp(-1.0, 1.0);
            let cos_contact = (1.0 - slope * slope).sqrt();
            let center = axis * (a + r * slope - a0);
            for col in 0..cols {
                let u = col as f64 / n as f64;
                let (sin, cos) = (TAU * u).sin_cos();
                let radial = perp * cos + binormal * sin;
                mesh.vertices.push((center + radial * (r * cos_contact)).into());
                mesh.normals.push(axis * slope + radial * cos_contact);
                mesh.uvs.push(Point2::new(u, s));
            }
        }

        push_grid_triangles(&mut mesh.indices, rows, cols);
        Ok(mesh)
    }
}
