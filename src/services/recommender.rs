use std::sync::Arc;

use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Movie, RecommendationQuery},
    services::{
        artifacts::ArtifactBundle,
        mapper::{self, MappingPolicy},
        scoring,
        selector::{self, ScoredRow},
        tokenizer,
    },
};

/// Number of recommendations returned when the caller does not ask otherwise
pub const DEFAULT_K: usize = 5;

/// A selected catalog row with the score that ranked it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMatch {
    pub row: usize,
    pub id: i64,
    pub score: f64,
}

/// Content-based matcher over the loaded catalog
///
/// Stateless per call; every query reads the same shared bundle.
pub struct Recommender {
    artifacts: Arc<ArtifactBundle>,
    policy: MappingPolicy,
}

impl Recommender {
    pub fn new(artifacts: Arc<ArtifactBundle>, policy: MappingPolicy) -> Self {
        Self { artifacts, policy }
    }

    /// Tokenize, score and select; shared by [`Self::rank`] and
    /// [`Self::get_recommendations`]
    fn matches(&self, query: &RecommendationQuery, k: usize) -> Vec<ScoredRow<'_>> {
        let tokens = tokenizer::tokenize(&query.genres, &query.actors, &query.keywords);
        if tokens.is_empty() {
            return Vec::new();
        }

        let scores = scoring::score(&tokens, &self.artifacts);
        let selected = selector::select(&scores, self.artifacts.metadata(), k);

        tracing::debug!(
            tokens = tokens.len(),
            k,
            selected = selected.len(),
            "Scored catalog"
        );

        selected
    }

    /// Selected rows with their scores, best first
    pub fn rank(&self, query: &RecommendationQuery, k: usize) -> Vec<RankedMatch> {
        self.matches(query, k)
            .into_iter()
            .map(|s| RankedMatch {
                row: s.row,
                id: s.meta.id,
                score: s.score,
            })
            .collect()
    }

    /// Returns up to `k` movies matching the filters, best first
    pub fn get_recommendations(
        &self,
        query: &RecommendationQuery,
        k: usize,
    ) -> AppResult<Vec<Movie>> {
        let selected = self.matches(query, k);
        let records = mapper::to_records(selected.iter().map(|s| s.meta), self.policy)?;

        tracing::info!(
            genres = query.genres.len(),
            actors = query.actors.len(),
            keywords = query.keywords.len(),
            k,
            returned = records.len(),
            "Recommendations computed"
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures;

    fn recommender(policy: MappingPolicy) -> Recommender {
        Recommender::new(
            Arc::new(fixtures::bundle(fixtures::small_catalog()).unwrap()),
            policy,
        )
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let recommender = recommender(MappingPolicy::Skip);
        let movies = recommender
            .get_recommendations(&RecommendationQuery::default(), DEFAULT_K)
            .unwrap();
        assert!(movies.is_empty());
    }

    #[test]
    fn test_genre_query_returns_only_matching_movies() {
        let recommender = recommender(MappingPolicy::Skip);
        let movies = recommender
            .get_recommendations(&RecommendationQuery::genres(["comedy"]), 3)
            .unwrap();

        assert_eq!(movies.len(), 2);
        assert!(movies.iter().all(|m| m.genres.iter().any(|g| g == "comedy")));
    }

    #[test]
    fn test_actor_filter_boosts_shared_movie() {
        let recommender = recommender(MappingPolicy::Skip);
        let query = RecommendationQuery::new(
            vec!["Comedy".to_string()],
            vec!["Meg Ryan".to_string()],
            vec![],
        );

        let ranked = recommender.rank(&query, DEFAULT_K);
        // "Office Party" is both comedy and stars meg-ryan
        assert_eq!(ranked[0].id, 4);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rank_and_recommendations_agree() {
        let recommender = recommender(MappingPolicy::Skip);
        let query = RecommendationQuery::new(vec![], vec!["keanu-reeves".to_string()], vec![]);

        let ids: Vec<i64> = recommender.rank(&query, 5).iter().map(|r| r.id).collect();
        let movies: Vec<i64> = recommender
            .get_recommendations(&query, 5)
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, movies);
    }

    #[test]
    fn test_abort_policy_surfaces_invalid_row() {
        let mut movies = fixtures::small_catalog();
        movies[1].poster_url = None;
        let recommender =
            Recommender::new(Arc::new(fixtures::bundle(movies).unwrap()), MappingPolicy::Abort);

        let err = recommender
            .get_recommendations(&RecommendationQuery::genres(["comedy"]), 5)
            .unwrap_err();
        assert!(err.to_string().contains("poster url"));
    }

    #[test]
    fn test_skip_policy_drops_invalid_row() {
        let mut movies = fixtures::small_catalog();
        movies[1].poster_url = None;
        let recommender =
            Recommender::new(Arc::new(fixtures::bundle(movies).unwrap()), MappingPolicy::Skip);

        let movies = recommender
            .get_recommendations(&RecommendationQuery::genres(["comedy"]), 5)
            .unwrap();
        assert_eq!(movies.iter().map(|m| m.id).collect::<Vec<_>>(), vec![4]);
    }
}
