use crate::envelope::Sectors;
use crate::error::{GeometryError, Result, TessellationError};

/// Which cached buffers an update builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Visibility {
    /// Envelope surface mesh.
    pub surface: bool,
    /// Spine polylines over time at the near and far axial bounds.
    pub tool_center: bool,
    /// Contact curves across the axial range, one per time step.
    pub grazing: bool,
    /// Spine-to-surface normal segments.
    pub normals: bool,
    /// Tool mesh placed at the selected time.
    pub tool: bool,
    /// Governing path samples.
    pub path: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            surface: true,
            tool_center: true,
            grazing: true,
            normals: false,
            tool: true,
            path: true,
        }
    }
}

/// Reflection-line shading parameters. They never affect geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionLines {
    /// Stripes per unit of the reflection parameter.
    pub frequency: f64,
    /// Share of each stripe period drawn black.
    pub black_fraction: f64,
}

impl Default for ReflectionLines {
    fn default() -> Self {
        Self {
            frequency: 10.0,
            black_fraction: 0.5,
        }
    }
}

/// Snapshot of the externally edited settings, passed by reference into
/// builds and queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSettings {
    /// Selected global time in `[0, 1]`.
    pub time: f64,
    /// Selected axial position, normalized over the tool's range, in `[0, 1]`.
    pub axial: f64,
    /// Grid resolution given to newly created envelopes.
    pub sectors: Sectors,
    /// Buffer toggles.
    pub visibility: Visibility,
    /// Shading parameters.
    pub reflection: ReflectionLines,
}

impl Default for EnvelopeSettings {
    fn default() -> Self {
        Self {
            time: 0.0,
            axial: 0.0,
            sectors: Sectors::default(),
            visibility: Visibility::default(),
            reflection: ReflectionLines::default(),
        }
    }
}

impl EnvelopeSettings {
    /// Checks every value against its admissible range.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] for a time, axial value
    /// or black fraction outside `[0, 1]`, and an invalid-parameter error for
    /// bad sector counts or a non-positive reflection frequency.
    pub fn validate(&self) -> Result<()> {
        unit_range("time", self.time)?;
        unit_range("axial", self.axial)?;
        unit_range("black_fraction", self.reflection.black_fraction)?;
        let frequency = self.reflection.frequency;
        if frequency.is_nan() || frequency <= 0.0 {
            return Err(TessellationError::InvalidParameters(format!(
                "reflection line frequency must be positive, got {frequency}"
            ))
            .into());
        }
        self.sectors.validate()
    }
}

fn unit_range(parameter: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GeometryError::ParameterOutOfRange {
            parameter,
            value,
            min: 0.0,
            max: 1.0,
        }
        .into())
    }
}
