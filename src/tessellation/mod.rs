mod tessellate_envelope;
mod tessellate_profile;

pub use tessellate_envelope::{EnvelopeBuffers, TessellateEnvelope};
pub use tessellate_profile::TessellateProfile;

use crate::math::{Point2, Point3, Vector3};

/// A polyline approximation of a curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    /// The ordered vertices of the polyline.
    pub points: Vec<Point3>,
}

/// A line segment from a spine point to the matching envelope point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point on the spine.
    pub start: Point3,
    /// End point on the envelope surface.
    pub end: Point3,
}

/// A triangle mesh approximation of a surface.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// UV coordinates.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
}

/// Appends two triangles per cell of a `rows x cols` vertex grid stored
/// row-major.
///
/// With `v1 = (r, c)`, `v2 = (r + 1, c)`, `v3 = (r, c + 1)` and
/// `v4 = (r + 1, c + 1)` each cell yields `(v1, v4, v2)` and `(v1, v3, v4)`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn push_grid_triangles(indices: &mut Vec<[u32; 3]>, rows: usize, cols: usize) {
    indices.reserve(rows.saturating_sub(1) * cols.saturating_sub(1) * 2);
    for r in 0..rows.saturating_sub(1) {
        for c in 0..cols.saturating_sub(1) {
            let v1 = (r * cols + c) as u32;
            let v2 = ((r + 1) * cols + c) as u32;
            let v3 = (r * cols + c + 1) as u32;
            let v4 = ((r + 1) * cols + c + 1) as u32;
            indices.push([v1, v4, v2]);
            indices.push([v1, v3, v4]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_winding() {
        let mut indices = Vec::new();
        push_grid_triangles(&mut indices, 2, 2);
        assert_eq!(indices, vec![[0, 3, 2], [0, 1, 3]]);
    }

    #[test]
    fn grid_triangle_count() {
        let mut indices = Vec::new();
        push_grid_triangles(&mut indices, 4, 6);
        assert_eq!(indices.len(), 3 * 5 * 2);
    }
}
