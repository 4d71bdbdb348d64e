pub mod movement;
pub mod path;
pub mod polynomial;
pub mod profile;

pub use movement::ToolMovement;
pub use path::{Coordinate, PathSample, VectorPath, PATH_COLOR};
pub use polynomial::Polynomial;
pub use profile::{Cylinder, Drum, Profile, ToolFrame, ToolProfile};
