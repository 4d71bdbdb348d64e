use crate::config::EnvelopeSettings;
use crate::error::{GraphError, Result};
use crate::geometry::ToolProfile;
use crate::math::rotation::rotate_series;
use crate::math::{Point3, ScalarSeries, Vector3, VectorSeries, TOLERANCE};

use super::normal::solve_normal;
use super::{Continuity, Envelope, EnvelopeId, EnvelopeStore};

/// Governing path and axis of one envelope at a fixed time, as time series.
///
/// For envelopes continuous with an upstream neighbor, `anchor` holds the
/// normal the surface must reproduce along its near axial boundary.
#[derive(Debug, Clone)]
pub struct Frame {
    t: f64,
    path: VectorSeries,
    axis: VectorSeries,
    anchor: Option<VectorSeries>,
}

/// Spine point, envelope point and normal at one `(t, a)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Time parameter.
    pub t: f64,
    /// Axial coordinate.
    pub a: f64,
    /// `P(t) + a Axis(t)`.
    pub spine: Point3,
    /// Point on the envelope surface.
    pub point: Point3,
    /// Unit envelope normal.
    pub normal: Vector3,
}

impl Frame {
    /// Frame of an envelope driven by its own movement.
    fn independent(envelope: &Envelope, t: f64, order: usize) -> Result<Self> {
        Ok(Self {
            t,
            path: envelope.movement.path().series(t, order),
            axis: envelope.movement.axis_series(t, order)?,
            anchor: None,
        })
    }

    /// Frame of `envelope` derived from the frame of its upstream `parent`.
    ///
    /// The parent frame must carry `order + continuity.order_cost()`.
    fn linked(
        envelope: &Envelope,
        parent: &Envelope,
        parent_frame: &Self,
        order: usize,
    ) -> Result<Self> {
        let t = parent_frame.t;
        if !envelope.continuity.is_positional() {
            return Self::independent(envelope, t, order);
        }
        let (_, far) = parent.profile.axial_bounds();
        let (near, _) = envelope.profile.axial_bounds();
        let boundary = parent_frame.point_series(&parent.profile, far)?;
        let radius = envelope.profile.radius_at(near);
        let slope = envelope.profile.radius_derivative_at(near);

        let (axis, anchor) = match envelope.continuity {
            Continuity::Tangential { .. } => {
                let normal = parent_frame
                    .normal_series(&parent.profile, far)?
                    .truncate(order);
                let parent_axis = parent_frame.axis.truncate(order);
                let free = envelope.continuity.free_angle_series(t, order);
                let axis = tangent_axis(&normal, &parent_axis, slope, &free)?;
                (axis, normal)
            }
            Continuity::Positional | Continuity::Independent => {
                let axis = envelope.movement.axis_series(t, order)?;
                let tangent = boundary.derivative().truncate(order);
                let normal = solve_normal(&axis, &tangent, slope, 1.0)?;
                (axis, normal)
            }
        };
        // The spine at the near bound sits one radius off the boundary curve
        let path = &(&boundary.truncate(order) + &(&anchor * radius)) - &(&axis * near);
        Ok(Self {
            t,
            path,
            axis,
            anchor: Some(anchor),
        })
    }

    /// Time parameter of the frame.
    #[must_use]
    pub fn t(&self) -> f64 {
        self.t
    }

    /// Highest time derivative carried by the frame.
    #[must_use]
    pub fn order(&self) -> usize {
        self.path.order().min(self.axis.order())
    }

    /// Governing path position series.
    #[must_use]
    pub fn path(&self) -> &VectorSeries {
        &self.path
    }

    /// Governing axis series.
    #[must_use]
    pub fn axis(&self) -> &VectorSeries {
        &self.axis
    }

    /// Spine `P + a Axis`.
    #[must_use]
    pub fn spine_series(&self, a: f64) -> VectorSeries {
        &self.path + &(&self.axis * a)
    }

    /// Time derivative of the spine, `P' + a Axis'`.
    fn spine_velocity(&self, a: f64) -> VectorSeries {
        &self.path.derivative() + &(&self.axis.derivative() * a)
    }

    /// Sign of the normal branch reproducing the anchor at the near boundary.
    fn branch(&self, profile: &ToolProfile) -> f64 {
        let Some(anchor) = &self.anchor else {
            return 1.0;
        };
        let (near, _) = profile.axial_bounds();
        let side = self
            .axis
            .value()
            .cross(&self.spine_velocity(near).value())
            .dot(&anchor.value());
        if side < -TOLERANCE {
            -1.0
        } else {
            1.0
        }
    }

    /// Unit envelope normal at axial coordinate `a`, one order below the frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the spine parameterization degenerates.
    pub fn normal_series(&self, profile: &ToolProfile, a: f64) -> Result<VectorSeries> {
        let order = self.order().saturating_sub(1);
        let sa = self.axis.truncate(order);
        let st = self.spine_velocity(a).truncate(order);
        solve_normal(&sa, &st, profile.radius_derivative_at(a), self.branch(profile))
    }

    /// Envelope point `P + a Axis - r(a) N`, one order below the frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the spine parameterization degenerates.
    pub fn point_series(&self, profile: &ToolProfile, a: f64) -> Result<VectorSeries> {
        let normal = self.normal_series(profile, a)?;
        let spine = self.spine_series(a).truncate(normal.order());
        Ok(&spine - &(&normal * profile.radius_at(a)))
    }

    /// Spine point, envelope point and normal at `a`.
    ///
    /// # Errors
    ///
    /// Returns an error if the spine parameterization degenerates.
    pub fn contact(&self, profile: &ToolProfile, a: f64) -> Result<ContactPoint> {
        let normal = self.normal_series(profile, a)?.value();
        let spine = self.spine_series(a).value();
        Ok(ContactPoint {
            t: self.t,
            a,
            spine: spine.into(),
            point: (spine - normal * profile.radius_at(a)).into(),
            normal,
        })
    }
}

/// Axis of a tangentially continuous envelope.
///
/// The upstream normal `normal` is turned by `acos(-r')` toward the
/// upstream axis, around their common perpendicular, then rotated around
/// `normal` by the free angle.
fn tangent_axis(
    normal: &VectorSeries,
    parent_axis: &VectorSeries,
    radius_derivative: f64,
    free_angle: &ScalarSeries,
) -> Result<VectorSeries> {
    let order = normal.order();
    let hinge = normal.cross(parent_axis).normalize()?;
    let tilt = ScalarSeries::constant((-radius_derivative).clamp(-1.0, 1.0).acos(), order);
    let tilted = rotate_series(normal, &hinge, &tilt);
    rotate_series(&tilted, normal, free_angle).normalize()
}

impl EnvelopeStore {
    /// Resolves the frame of `id` at time `t` carrying `order` derivatives.
    ///
    /// The upstream chain is collected bottom-up with the order each level
    /// must supply, then evaluated top-down from the first geometrically
    /// independent ancestor.
    ///
    /// # Errors
    ///
    /// Returns an error if an envelope is missing or the geometry degenerates.
    pub fn frame(&self, id: EnvelopeId, t: f64, order: usize) -> Result<Frame> {
        let mut chain = vec![(id, order)];
        let mut current = self.envelope(id)?;
        while let Some((parent, continuity)) = current.link() {
            if chain.len() > self.len() {
                return Err(GraphError::DependencyCycle.into());
            }
            let child_order = chain[chain.len() - 1].1;
            chain.push((parent, child_order + continuity.order_cost()));
            current = self.envelope(parent)?;
        }

        let (root, root_order) = chain[chain.len() - 1];
        let mut frame = Frame::independent(self.envelope(root)?, t, root_order)?;
        for pair in chain.windows(2).rev() {
            let (child, child_order) = pair[0];
            let (parent, _) = pair[1];
            frame = Frame::linked(
                self.envelope(child)?,
                self.envelope(parent)?,
                &frame,
                child_order,
            )?;
        }
        Ok(frame)
    }

    /// Governing path position `P(t)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is missing or the geometry degenerates.
    pub fn path_position(&self, id: EnvelopeId, t: f64) -> Result<Point3> {
        Ok(self.frame(id, t, 0)?.path.value().into())
    }

    /// Governing unit axis `Axis(t)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is missing or the geometry degenerates.
    pub fn axis(&self, id: EnvelopeId, t: f64) -> Result<Vector3> {
        Ok(self.frame(id, t, 0)?.axis.value())
    }

    /// Spine point `P(t) + a Axis(t)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is missing or the geometry degenerates.
    pub fn spine_point(&self, id: EnvelopeId, t: f64, a: f64) -> Result<Point3> {
        Ok(self.frame(id, t, 0)?.spine_series(a).value().into())
    }

    /// Unit envelope normal `N(t, a)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is missing or the geometry degenerates.
    pub fn normal(&self, id: EnvelopeId, t: f64, a: f64) -> Result<Vector3> {
        let profile = &self.envelope(id)?.profile;
        Ok(self.frame(id, t, 1)?.normal_series(profile, a)?.value())
    }

    /// `N(t, a)` followed by its first `order` time derivatives.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is missing or the geometry degenerates.
    pub fn normal_derivatives(
        &self,
        id: EnvelopeId,
        t: f64,
        a: f64,
        order: usize,
    ) -> Result<Vec<Vector3>> {
        let profile = &self.envelope(id)?.profile;
        Ok(self
            .frame(id, t, order + 1)?
            .normal_series(profile, a)?
            .derivatives())
    }

    /// Envelope surface point `E(t, a)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is missing or the geometry degenerates.
    pub fn point(&self, id: EnvelopeId, t: f64, a: f64) -> Result<Point3> {
        let profile = &self.envelope(id)?.profile;
        Ok(self.frame(id, t, 1)?.point_series(profile, a)?.value().into())
    }

    /// Contact data at the selected time and axial position of `settings`.
    ///
    /// The selected axial value is normalized over the tool's axial range.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid, the envelope is missing
    /// or the geometry degenerates.
    pub fn contact_at(&self, id: EnvelopeId, settings: &EnvelopeSettings) -> Result<ContactPoint> {
        settings.validate()?;
        let profile = &self.envelope(id)?.profile;
        let a = profile.axial_at(settings.axial);
        self.frame(id, settings.time, 1)?.contact(profile, a)
    }
}
