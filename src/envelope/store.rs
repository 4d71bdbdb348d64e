use slotmap::SlotMap;

use crate::config::EnvelopeSettings;
use crate::error::{GraphError, Result};
use crate::geometry::{Coordinate, Polynomial, ToolMovement, ToolProfile};
use crate::math::Vector3;
use crate::tessellation::TessellateEnvelope;

use super::{Continuity, Envelope, EnvelopeId, Sectors};

/// Central arena that owns every envelope and the adjacency between them.
///
/// Each envelope has at most one upstream neighbor, so the adjacency is a
/// forest. Every assignment is checked against cycles before anything is
/// mutated, and every mutation rebuilds the affected envelope and its
/// downstream dependents.
#[derive(Debug, Default)]
pub struct EnvelopeStore {
    envelopes: SlotMap<EnvelopeId, Envelope>,
}

impl EnvelopeStore {
    /// Creates a new, empty envelope store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an envelope and returns its ID.
    pub fn insert(&mut self, envelope: Envelope) -> EnvelopeId {
        self.envelopes.insert(envelope)
    }

    /// Inserts an independent envelope with the sector counts of `settings`.
    pub fn create(
        &mut self,
        index: usize,
        movement: ToolMovement,
        profile: ToolProfile,
        settings: &EnvelopeSettings,
    ) -> EnvelopeId {
        self.insert(Envelope::new(index, movement, profile).with_sectors(settings.sectors))
    }

    /// Returns a reference to the envelope, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is not in the store.
    pub fn envelope(&self, id: EnvelopeId) -> Result<&Envelope> {
        self.envelopes
            .get(id)
            .ok_or_else(|| GraphError::EnvelopeNotFound.into())
    }

    fn envelope_mut(&mut self, id: EnvelopeId) -> Result<&mut Envelope> {
        self.envelopes
            .get_mut(id)
            .ok_or_else(|| GraphError::EnvelopeNotFound.into())
    }

    /// Number of envelopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    /// Whether the store holds no envelope.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    /// IDs of every envelope.
    pub fn ids(&self) -> impl Iterator<Item = EnvelopeId> + '_ {
        self.envelopes.keys()
    }

    /// Performs the first full build of an envelope and its dependents.
    ///
    /// # Errors
    ///
    /// Returns an error if the build fails; the envelope stays uninitialized.
    pub fn initialize(&mut self, id: EnvelopeId, settings: &EnvelopeSettings) -> Result<()> {
        self.update(id, settings)?;
        self.envelope_mut(id)?.initialized = true;
        Ok(())
    }

    /// Upstream neighbors of `id`, nearest first.
    ///
    /// # Errors
    ///
    /// Returns an error if an envelope on the chain is missing or the chain
    /// loops.
    pub fn ancestors(&self, id: EnvelopeId) -> Result<Vec<EnvelopeId>> {
        let mut chain = Vec::new();
        let mut current = self.envelope(id)?.upstream;
        while let Some(parent) = current {
            if chain.len() >= self.len() {
                return Err(GraphError::DependencyCycle.into());
            }
            chain.push(parent);
            current = self.envelope(parent)?.upstream;
        }
        Ok(chain)
    }

    /// Assigns or clears the upstream neighbor of `id`.
    ///
    /// The envelope is deregistered from its previous parent before it is
    /// registered with the new one.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DependencyCycle`] if `id` is `upstream` or one of
    /// its ancestors; the adjacency is left untouched. Also fails if either
    /// envelope is missing or the rebuild fails.
    pub fn set_upstream(
        &mut self,
        id: EnvelopeId,
        upstream: Option<EnvelopeId>,
        settings: &EnvelopeSettings,
    ) -> Result<()> {
        let previous = self.envelope(id)?.upstream;
        if let Some(parent) = upstream {
            if parent == id || self.ancestors(parent)?.contains(&id) {
                return Err(GraphError::DependencyCycle.into());
            }
        }

        if let Some(old) = previous {
            if let Some(old_parent) = self.envelopes.get_mut(old) {
                old_parent.deregister_dependent(id);
            }
        }
        if let Some(parent) = upstream {
            self.envelope_mut(parent)?.register_dependent(id);
        }
        self.envelope_mut(id)?.upstream = upstream;
        tracing::debug!(?id, ?previous, ?upstream, "reassigned upstream envelope");
        self.update(id, settings)
    }

    /// Replaces the continuity with the upstream neighbor.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is missing or the rebuild fails.
    pub fn set_continuity(
        &mut self,
        id: EnvelopeId,
        continuity: Continuity,
        settings: &EnvelopeSettings,
    ) -> Result<()> {
        self.envelope_mut(id)?.continuity = continuity;
        tracing::debug!(?id, ?continuity, "changed continuity");
        self.update(id, settings)
    }

    /// Replaces the continuity from the two configuration flags and the free
    /// rotation boundary angles.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidContinuity`] if `tangential` is set
    /// without `positional`; the continuity is left unchanged.
    pub fn set_continuity_flags(
        &mut self,
        id: EnvelopeId,
        positional: bool,
        tangential: bool,
        angles: (f64, f64),
        settings: &EnvelopeSettings,
    ) -> Result<()> {
        let continuity = Continuity::from_flags(positional, tangential, angles.0, angles.1)?;
        self.set_continuity(id, continuity, settings)
    }

    /// Replaces the tool profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is missing or the rebuild fails.
    pub fn set_profile(
        &mut self,
        id: EnvelopeId,
        profile: ToolProfile,
        settings: &EnvelopeSettings,
    ) -> Result<()> {
        self.envelope_mut(id)?.profile = profile;
        tracing::debug!(?id, "changed tool profile");
        self.update(id, settings)
    }

    /// Replaces the boundary axis directions of the envelope's movement.
    ///
    /// # Errors
    ///
    /// Returns an error if a direction is zero, the envelope is missing, or
    /// the rebuild fails.
    pub fn set_axis_directions(
        &mut self,
        id: EnvelopeId,
        start_axis: Vector3,
        end_axis: Vector3,
        settings: &EnvelopeSettings,
    ) -> Result<()> {
        self.envelope_mut(id)?
            .movement
            .set_axis_directions(start_axis, end_axis)?;
        self.update(id, settings)
    }

    /// Replaces one coordinate polynomial of the envelope's own path.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is missing or the rebuild fails.
    pub fn set_path_polynomial(
        &mut self,
        id: EnvelopeId,
        coordinate: Coordinate,
        polynomial: Polynomial,
        settings: &EnvelopeSettings,
    ) -> Result<()> {
        self.envelope_mut(id)?
            .movement
            .path_mut()
            .set_polynomial(coordinate, polynomial);
        self.update(id, settings)
    }

    /// Replaces the grid resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the sector counts are invalid; nothing changes.
    pub fn set_sectors(
        &mut self,
        id: EnvelopeId,
        sectors: Sectors,
        settings: &EnvelopeSettings,
    ) -> Result<()> {
        sectors.validate()?;
        let envelope = self.envelope_mut(id)?;
        envelope.movement.path_mut().set_sectors(sectors.time)?;
        envelope.sectors = sectors;
        self.update(id, settings)
    }

    /// Activates or deactivates an envelope. Inactive envelopes keep their
    /// place in the graph but hold empty buffers.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is missing or the rebuild fails.
    pub fn set_active(
        &mut self,
        id: EnvelopeId,
        active: bool,
        settings: &EnvelopeSettings,
    ) -> Result<()> {
        self.envelope_mut(id)?.active = active;
        self.update(id, settings)
    }

    /// Removes an envelope that has no dependents, deregistering it from its
    /// upstream neighbor.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::HasDependents`] while other envelopes still
    /// depend on it.
    pub fn remove(&mut self, id: EnvelopeId) -> Result<Envelope> {
        let envelope = self.envelope(id)?;
        if !envelope.dependents.is_empty() {
            return Err(GraphError::HasDependents(envelope.dependents.len()).into());
        }
        if let Some(parent) = envelope.upstream {
            if let Some(parent) = self.envelopes.get_mut(parent) {
                parent.deregister_dependent(id);
            }
        }
        tracing::debug!(?id, "removed envelope");
        self.envelopes
            .remove(id)
            .ok_or_else(|| GraphError::EnvelopeNotFound.into())
    }

    /// `id` followed by every downstream dependent, each before its own
    /// dependents, siblings in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if an envelope is missing or the graph loops.
    pub fn update_order(&self, id: EnvelopeId) -> Result<Vec<EnvelopeId>> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if order.len() >= self.len() {
                return Err(GraphError::DependencyCycle.into());
            }
            order.push(current);
            stack.extend(self.envelope(current)?.dependents.iter().rev());
        }
        Ok(order)
    }

    /// Rebuilds the buffers of `id` and then of every downstream dependent.
    ///
    /// An envelope that fails to build keeps its previous buffers and its
    /// own subtree is skipped; the rest of the pass still runs. The first
    /// failure is returned once the pass ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid, an envelope is missing,
    /// or a build fails.
    pub fn update(&mut self, id: EnvelopeId, settings: &EnvelopeSettings) -> Result<()> {
        settings.validate()?;
        let order = self.update_order(id)?;
        tracing::debug!(?id, count = order.len(), "updating envelopes");
        let mut skipped: Vec<EnvelopeId> = Vec::new();
        let mut first_error = None;
        for current in order {
            let upstream = self.envelope(current)?.upstream;
            if upstream.is_some_and(|parent| skipped.contains(&parent)) {
                skipped.push(current);
                continue;
            }
            match TessellateEnvelope::new(current, settings).execute(self) {
                Ok(buffers) => self.envelope_mut(current)?.buffers = buffers,
                Err(err) => {
                    tracing::warn!(
                        id = ?current,
                        %err,
                        "envelope update failed, keeping previous buffers"
                    );
                    skipped.push(current);
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
