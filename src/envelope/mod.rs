mod frame;
mod normal;
mod store;
mod transform;

pub use frame::{ContactPoint, Frame};
pub use normal::solve_normal;
pub use store::EnvelopeStore;

use crate::error::{GraphError, Result, TessellationError};
use crate::geometry::{ToolMovement, ToolProfile};
use crate::math::ScalarSeries;
use crate::tessellation::EnvelopeBuffers;

slotmap::new_key_type! {
    /// Stable identifier for an envelope in the envelope store.
    pub struct EnvelopeId;
}

/// How an envelope is tied to its upstream neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Continuity {
    /// Path and axis come from the envelope's own movement.
    #[default]
    Independent,
    /// The envelope starts on the upstream envelope's far boundary curve.
    Positional,
    /// Positional, and the axis departs tangent to the upstream normal
    /// field, rotated freely around it by an angle blended linearly from
    /// `start_angle` at `t = 0` to `end_angle` at `t = 1`.
    Tangential { start_angle: f64, end_angle: f64 },
}

impl Continuity {
    /// Builds a continuity from the two configuration flags.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidContinuity`] if `tangential` is set
    /// without `positional`.
    pub fn from_flags(
        positional: bool,
        tangential: bool,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        match (positional, tangential) {
            (false, false) => Ok(Self::Independent),
            (true, false) => Ok(Self::Positional),
            (true, true) => Ok(Self::Tangential {
                start_angle,
                end_angle,
            }),
            (false, true) => Err(GraphError::InvalidContinuity(
                "tangential continuity requires positional continuity".into(),
            )
            .into()),
        }
    }

    /// Whether the envelope's path is pinned to its upstream neighbor.
    #[must_use]
    pub fn is_positional(&self) -> bool {
        !matches!(self, Self::Independent)
    }

    /// Whether the envelope's axis is derived from its upstream neighbor.
    #[must_use]
    pub fn is_tangential(&self) -> bool {
        matches!(self, Self::Tangential { .. })
    }

    /// Extra derivative orders the upstream frame must carry.
    pub(crate) fn order_cost(self) -> usize {
        match self {
            Self::Independent => 0,
            Self::Tangential { .. } => 1,
            Self::Positional => 2,
        }
    }

    /// Free rotation angle around the upstream normal at `t`.
    #[must_use]
    pub fn free_angle(&self, t: f64) -> f64 {
        match *self {
            Self::Tangential {
                start_angle,
                end_angle,
            } => start_angle + (end_angle - start_angle) * t,
            _ => 0.0,
        }
    }

    pub(crate) fn free_angle_series(self, t: f64, order: usize) -> ScalarSeries {
        let slope = match self {
            Self::Tangential {
                start_angle,
                end_angle,
            } => end_angle - start_angle,
            _ => 0.0,
        };
        ScalarSeries::linear(self.free_angle(t), slope, order)
    }
}

/// Grid resolution of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sectors {
    /// Steps across the tool's axial range.
    pub axial: usize,
    /// Steps along the path parameter.
    pub time: usize,
}

impl Sectors {
    /// Checks that the tool mesh and the surface grid can be built.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 3 axial or 1 time sector is requested.
    pub fn validate(&self) -> Result<()> {
        if self.axial < 3 || self.time < 1 {
            return Err(TessellationError::InvalidParameters(format!(
                "need at least 3 axial and 1 time sector, got {} x {}",
                self.axial, self.time
            ))
            .into());
        }
        Ok(())
    }
}

impl Default for Sectors {
    fn default() -> Self {
        Self {
            axial: 16,
            time: 50,
        }
    }
}

/// One swept tool: its motion, its profile, its place in the continuity
/// graph and its cached display buffers.
#[derive(Debug, Clone)]
pub struct Envelope {
    index: usize,
    active: bool,
    movement: ToolMovement,
    profile: ToolProfile,
    upstream: Option<EnvelopeId>,
    continuity: Continuity,
    dependents: Vec<EnvelopeId>,
    sectors: Sectors,
    buffers: EnvelopeBuffers,
    initialized: bool,
}

impl Envelope {
    /// Creates an independent, active envelope.
    #[must_use]
    pub fn new(index: usize, movement: ToolMovement, profile: ToolProfile) -> Self {
        Self {
            index,
            active: true,
            movement,
            profile,
            upstream: None,
            continuity: Continuity::Independent,
            dependents: Vec::new(),
            sectors: Sectors::default(),
            buffers: EnvelopeBuffers::default(),
            initialized: false,
        }
    }

    /// Replaces the grid resolution.
    #[must_use]
    pub fn with_sectors(mut self, sectors: Sectors) -> Self {
        self.sectors = sectors;
        self
    }

    /// Display index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether buffers are built for this envelope.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the first full build has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The envelope's own movement.
    #[must_use]
    pub fn movement(&self) -> &ToolMovement {
        &self.movement
    }

    /// The tool profile.
    #[must_use]
    pub fn profile(&self) -> &ToolProfile {
        &self.profile
    }

    /// The upstream neighbor, if any.
    #[must_use]
    pub fn upstream(&self) -> Option<EnvelopeId> {
        self.upstream
    }

    /// Configured continuity with the upstream neighbor.
    #[must_use]
    pub fn continuity(&self) -> Continuity {
        self.continuity
    }

    /// Envelopes whose upstream neighbor is this one, in registration order.
    #[must_use]
    pub fn dependents(&self) -> &[EnvelopeId] {
        &self.dependents
    }

    /// Grid resolution.
    #[must_use]
    pub fn sectors(&self) -> Sectors {
        self.sectors
    }

    /// Cached display buffers from the last successful update.
    #[must_use]
    pub fn buffers(&self) -> &EnvelopeBuffers {
        &self.buffers
    }

    /// The upstream neighbor together with the continuity that ties the
    /// geometry to it. Envelopes without continuity are geometrically
    /// independent even when an upstream neighbor is assigned.
    pub(crate) fn link(&self) -> Option<(EnvelopeId, Continuity)> {
        match (self.upstream, self.continuity) {
            (Some(_), Continuity::Independent) | (None, _) => None,
            (Some(parent), continuity) => Some((parent, continuity)),
        }
    }

    pub(crate) fn register_dependent(&mut self, id: EnvelopeId) {
        if !self.dependents.contains(&id) {
            self.dependents.push(id);
        }
    }

    pub(crate) fn deregister_dependent(&mut self, id: EnvelopeId) -> bool {
        let before = self.dependents.len();
        self.dependents.retain(|&d| d != id);
        before != self.dependents.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_continuity() {
        assert_eq!(
            Continuity::from_flags(false, false, 0.0, 0.0).unwrap(),
            Continuity::Independent
        );
        assert_eq!(
            Continuity::from_flags(true, false, 0.0, 0.0).unwrap(),
            Continuity::Positional
        );
        let c = Continuity::from_flags(true, true, 0.2, 0.6).unwrap();
        assert!(c.is_positional() && c.is_tangential());
        assert!((c.free_angle(0.5) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn tangential_requires_positional() {
        assert!(Continuity::from_flags(false, true, 0.0, 0.0).is_err());
    }

    #[test]
    fn order_cost_per_link() {
        assert_eq!(Continuity::Independent.order_cost(), 0);
        assert_eq!(Continuity::Positional.order_cost(), 2);
        let tangential = Continuity::Tangential {
            start_angle: 0.0,
            end_angle: 1.0,
        };
        assert_eq!(tangential.order_cost(), 1);
        let s = tangential.free_angle_series(0.25, 2);
        assert!((s.derivative_value(1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sector_validation() {
        assert!(Sectors::default().validate().is_ok());
        assert!(Sectors { axial: 2, time: 5 }.validate().is_err());
        assert!(Sectors { axial: 4, time: 0 }.validate().is_err());
    }
}
