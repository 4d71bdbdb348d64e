pub mod config;
pub mod envelope;
pub mod error;
pub mod geometry;
pub mod math;
pub mod tessellation;

pub use config::EnvelopeSettings;
pub use envelope::{Continuity, Envelope, EnvelopeId, EnvelopeStore, Sectors};
pub use error::{Result, SweepError};
