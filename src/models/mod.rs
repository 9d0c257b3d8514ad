pub mod artifact;

pub use artifact::{ArtifactDirs, ArtifactKind, ArtifactNamer};
