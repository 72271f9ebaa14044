pub mod artifacts;
pub mod mapper;
pub mod recommender;
pub mod scoring;
pub mod selector;
pub mod tokenizer;

#[doc(hidden)]
pub mod fixtures;

pub use artifacts::{ArtifactBundle, ArtifactError, ArtifactPaths, SharedArtifacts};
pub use mapper::MappingPolicy;
pub use recommender::{RankedMatch, Recommender, DEFAULT_K};
