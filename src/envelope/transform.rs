use crate::error::{GeometryError, GraphError, Result};
use crate::math::rotation::{rotation_matrix, AxisAngle};
use crate::math::{Matrix4, TOLERANCE};

use super::{Continuity, EnvelopeId, EnvelopeStore};

impl EnvelopeStore {
    /// Rotation carrying the tool's canonical axis onto `axis(id, t)`.
    ///
    /// Envelopes with their own axis align it directly. A tangentially
    /// continuous envelope composes its parent's rotation with the tilt off
    /// the parent normal and the free rotation around it.
    ///
    /// # Errors
    ///
    /// Returns an error if an envelope is missing or the geometry degenerates.
    pub fn tool_rotation(&self, id: EnvelopeId, t: f64) -> Result<Matrix4> {
        let mut chain = Vec::new();
        let mut current = id;
        while let Some((parent, Continuity::Tangential { .. })) = self.envelope(current)?.link() {
            if chain.len() >= self.len() {
                return Err(GraphError::DependencyCycle.into());
            }
            chain.push((current, parent));
            current = parent;
        }

        let root = self.envelope(current)?;
        let mut rotation = root
            .movement
            .rotation_to_align(t, &root.profile)?
            .matrix();
        for &(child, parent) in chain.iter().rev() {
            let child = self.envelope(child)?;
            let parent_envelope = self.envelope(parent)?;
            let frame = self.frame(parent, t, 1)?;
            let (_, far) = parent_envelope.profile.axial_bounds();
            let (near, _) = child.profile.axial_bounds();
            let normal = frame.normal_series(&parent_envelope.profile, far)?.value();
            let axis = frame.axis().value();

            let hinge = normal.cross(&axis);
            let len = hinge.norm();
            if len < TOLERANCE {
                return Err(GeometryError::NumericDegeneracy(
                    "upstream normal is parallel to its axis".into(),
                )
                .into());
            }
            let tilt = (-child.profile.radius_derivative_at(near)).clamp(-1.0, 1.0).acos()
                - normal.dot(&axis).clamp(-1.0, 1.0).acos();
            // Canonical axes may differ between the two profiles
            let canonical = AxisAngle::between(
                child.profile.axis_vector(),
                parent_envelope.profile.axis_vector(),
                child.profile.perpendicular_vector(),
            )?;

            rotation = rotation_matrix(&normal, child.continuity.free_angle(t))
                * rotation_matrix(&(hinge / len), tilt)
                * rotation
                * canonical.matrix();
        }
        Ok(rotation)
    }

    /// Rigid placement of the base-anchored tool mesh at time `t`.
    ///
    /// Shifts the mesh by `a0` along the canonical axis, rotates it onto
    /// `axis(id, t)` and moves it to `P(t)`, so that the mesh layer at axial
    /// coordinate `a` lands on the spine point `P(t) + a Axis(t)`.
    ///
    /// # Errors
    ///
    /// Returns an error if an envelope is missing or the geometry degenerates.
    pub fn tool_transform(&self, id: EnvelopeId, t: f64) -> Result<Matrix4> {
        let profile = &self.envelope(id)?.profile;
        let (a0, _) = profile.axial_bounds();
        let base = Matrix4::new_translation(&(profile.axis_vector() * a0));
        let rotation = self.tool_rotation(id, t)?;
        let position = self.frame(id, t, 0)?.path().value();
        Ok(Matrix4::new_translation(&position) * rotation * base)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::config::EnvelopeSettings;
    use crate::geometry::{Cylinder, Drum, Polynomial, ToolFrame, ToolMovement, VectorPath};
    use crate::math::{Point3, Vector3};

    fn movement(d0: Vector3, d1: Vector3) -> ToolMovement {
        let path = VectorPath::new(
            Polynomial::new(0.0, 0.0, 2.0, 0.0),
            Polynomial::new(0.0, -0.4, 0.5, 0.0),
            Polynomial::constant(0.0),
            10,
        )
        .unwrap();
        ToolMovement::new(path, d0, d1).unwrap()
    }

    fn chained() -> (EnvelopeStore, EnvelopeId, EnvelopeId) {
        let settings = EnvelopeSettings::default();
        let mut store = EnvelopeStore::new();
        let parent = store.create(
            0,
            movement(Vector3::z(), Vector3::new(0.2, 0.1, 1.0)),
            Cylinder::new(0.4, -0.05, 1.0).unwrap().into(),
            &settings,
        );
        // Child tool modelled along its local x axis
        let frame = ToolFrame::new(Vector3::x(), Vector3::y()).unwrap();
        let child = store.create(
            1,
            movement(Vector3::x(), Vector3::x()),
            Drum::new(3.0, 0.6, 0.8).unwrap().with_frame(frame).into(),
            &settings,
        );
        store.set_upstream(child, Some(parent), &settings).unwrap();
        store
            .set_continuity(
                child,
                Continuity::Tangential {
                    start_angle: 0.3,
                    end_angle: 0.9,
                },
                &settings,
            )
            .unwrap();
        (store, parent, child)
    }

    #[test]
    fn rotation_aligns_canonical_axis() {
        let (store, parent, child) = chained();
        for t in [0.0, 0.35, 0.8, 1.0] {
            for id in [parent, child] {
                let canonical = *store.envelope(id).unwrap().profile().axis_vector();
                let mapped = store.tool_rotation(id, t).unwrap().transform_vector(&canonical);
                assert_relative_eq!(mapped, store.axis(id, t).unwrap(), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn transform_places_layers_on_spine() {
        let (store, _, child) = chained();
        let profile = store.envelope(child).unwrap().profile().clone();
        let (a0, a1) = profile.axial_bounds();
        let t = 0.6;
        let transform = store.tool_transform(child, t).unwrap();
        for a in [a0, 0.0, a1] {
            let local = Point3::from(profile.axis_vector() * (a - a0));
            assert_relative_eq!(
                transform.transform_point(&local),
                store.spine_point(child, t, a).unwrap(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn independent_rotation_is_direct_alignment() {
        let (store, parent, _) = chained();
        let envelope = store.envelope(parent).unwrap();
        let expected = envelope
            .movement()
            .rotation_to_align(0.5, envelope.profile())
            .unwrap()
            .matrix();
        assert_relative_eq!(store.tool_rotation(parent, 0.5).unwrap(), expected, epsilon = 1e-12);
    }
}
