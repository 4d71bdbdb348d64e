use crate::config::EnvelopeSettings;
use crate::envelope::{EnvelopeId, EnvelopeStore};
use crate::error::Result;
use crate::geometry::{PathSample, PATH_COLOR};
use crate::math::Point2;

use super::{push_grid_triangles, Polyline, Segment, TriangleMesh};

/// Display buffers cached on an envelope after an update.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeBuffers {
    /// Envelope surface, one grid row per time step.
    pub surface: TriangleMesh,
    /// Spine over time at the near and far axial bounds.
    pub tool_center: Vec<Polyline>,
    /// Contact curves across the axial range, one per time step.
    pub grazing: Vec<Polyline>,
    /// Spine-to-surface segments at every surface vertex.
    pub normals: Vec<Segment>,
    /// Tool mesh placed at the selected time.
    pub tool: TriangleMesh,
    /// Governing path samples.
    pub path: Vec<PathSample>,
}

impl EnvelopeBuffers {
    /// Whether no buffer holds any geometry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surface.vertices.is_empty()
            && self.tool_center.is_empty()
            && self.grazing.is_empty()
            && self.normals.is_empty()
            && self.tool.vertices.is_empty()
            && self.path.is_empty()
    }
}

/// Builds the display buffers of one envelope.
///
/// Inactive envelopes yield empty buffers. Only the buffers enabled in the
/// settings' visibility toggles are computed.
pub struct TessellateEnvelope<'a> {
    id: EnvelopeId,
    settings: &'a EnvelopeSettings,
}

impl<'a> TessellateEnvelope<'a> {
    /// Creates a new `TessellateEnvelope` operation.
    #[must_use]
    pub fn new(id: EnvelopeId, settings: &'a EnvelopeSettings) -> Self {
        Self { id, settings }
    }

    /// Executes the tessellation against the envelopes in `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings or sector counts are invalid, the
    /// envelope is missing, or the geometry degenerates at a sample.
    #[allow(clippy::cast_precision_loss)]
    pub fn execute(&self, store: &EnvelopeStore) -> Result<EnvelopeBuffers> {
        self.settings.validate()?;
        let envelope = store.envelope(self.id)?;
        if !envelope.is_active() {
            return Ok(EnvelopeBuffers::default());
        }
        let sectors = envelope.sectors();
        sectors.validate()?;
        let profile = envelope.profile();
        let visibility = self.settings.visibility;
        let (near, far) = profile.axial_bounds();
        let cols = sectors.axial + 1;
        let mut buffers = EnvelopeBuffers::default();
        let mut near_center = Polyline::default();
        let mut far_center = Polyline::default();

        let grid = visibility.surface || visibility.normals || visibility.grazing;
        if grid || visibility.tool_center || visibility.path {
            for row in 0..=sectors.time {
                let t = row as f64 / sectors.time as f64;
                let frame = store.frame(self.id, t, 1)?;
                if visibility.path {
                    buffers.path.push(PathSample {
                        t,
                        position: frame.path().value().into(),
                        color: PATH_COLOR,
                    });
                }
                if visibility.tool_center {
                    near_center.points.push(frame.spine_series(near).value().into());
                    far_center.points.push(frame.spine_series(far).value().into());
                }
                if !grid {
                    continue;
                }
                let mut grazing = Polyline::default();
                for col in 0..cols {
                    let s = col as f64 / sectors.axial as f64;
                    let contact = frame.contact(profile, profile.axial_at(s))?;
                    if visibility.surface {
                        buffers.surface.vertices.push(contact.point);
                        buffers.surface.normals.push(contact.normal);
                        buffers.surface.uvs.push(Point2::new(s, t));
                    }
                    if visibility.normals {
                        buffers.normals.push(Segment {
                            start: contact.spine,
                            end: contact.point,
                        });
                    }
                    if visibility.grazing {
                        grazing.points.push(contact.point);
                    }
                }
                if visibility.grazing {
                    buffers.grazing.push(grazing);
                }
            }
            if visibility.surface {
                push_grid_triangles(&mut buffers.surface.indices, sectors.time + 1, cols);
            }
            if visibility.tool_center {
                buffers.tool_center = vec![near_center, far_center];
            }
        }

        if visibility.tool {
            let transform = store.tool_transform(self.id, self.settings.time)?;
            let mut mesh = profile.tessellate(sectors.axial)?;
            for vertex in &mut mesh.vertices {
                *vertex = transform.transform_point(vertex);
            }
            for normal in &mut mesh.normals {
                *normal = transform.transform_vector(normal);
            }
            buffers.tool = mesh;
        }

        tracing::trace!(
            id = ?self.id,
            triangles = buffers.surface.triangle_count(),
            "tessellated envelope"
        );
        Ok(buffers)
    }
}
