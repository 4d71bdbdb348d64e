use thiserror::Error;

/// Top-level error type for the envelope engine.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("zero-length vector")]
    ZeroVector,

    #[error("tool axis direction must be non-zero")]
    InvalidOrientation,

    #[error("invalid tool profile: {0}")]
    InvalidProfile(String),

    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),
}

/// Errors related to the envelope adjacency graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("envelope not found")]
    EnvelopeNotFound,

    #[error("adjacency assignment would create a dependency cycle")]
    DependencyCycle,

    #[error("envelope still has {0} dependent envelope(s)")]
    HasDependents(usize),

    #[error("invalid continuity: {0}")]
    InvalidContinuity(String),
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("invalid tessellation parameters: {0}")]
    InvalidParameters(String),
}

/// Convenience type alias for results using [`SweepError`].
pub type Result<T> = std::result::Result<T, SweepError>;
