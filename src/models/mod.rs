pub mod movie;
pub mod query;

pub use movie::{Movie, MovieMeta, MovieValidationError, MAX_CAST};
pub use query::{RecommendationQuery, RecommendationResponse};
