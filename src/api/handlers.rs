use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{RecommendationQuery, RecommendationResponse},
};

use super::AppState;

/// Query string of the recommendations endpoint
///
/// Filters are comma-separated lists, e.g. `?genres=comedy,romance&k=3`.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationParams {
    pub genres: Option<String>,
    pub actors: Option<String>,
    pub keywords: Option<String>,
    pub k: Option<usize>,
}

impl RecommendationParams {
    pub fn to_query(&self) -> RecommendationQuery {
        RecommendationQuery::new(
            split_list(self.genres.as_deref()),
            split_list(self.actors.as_deref()),
            split_list(self.keywords.as_deref()),
        )
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Handler for recommendations endpoint
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    params: Result<Query<RecommendationParams>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Query(params) = params?;
    let k = params.k.unwrap_or(state.default_k);
    if k > state.max_k {
        return Err(AppError::InvalidInput(format!(
            "k must be at most {}",
            state.max_k
        )));
    }

    let query = params.to_query();
    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Please provide at least one filter: genres, actors, or keywords".to_string(),
        ));
    }

    tracing::info!(
        request_id = %request_id,
        genres = ?query.genres,
        actors = ?query.actors,
        keywords = ?query.keywords,
        k,
        "Processing recommendation request"
    );

    // Scoring is CPU-bound over the whole catalog
    let recommender = state.recommender.clone();
    let recommendations =
        tokio::task::spawn_blocking(move || recommender.get_recommendations(&query, k))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

    tracing::info!(
        request_id = %request_id,
        returned = recommendations.len(),
        "Recommendations completed"
    );

    Ok(Json(RecommendationResponse { recommendations }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_drops_empty_items() {
        assert_eq!(
            split_list(Some(" comedy, ,romance ,")),
            vec!["comedy".to_string(), "romance".to_string()]
        );
        assert!(split_list(None).is_empty());
        assert!(split_list(Some("")).is_empty());
    }

    #[test]
    fn test_params_to_query() {
        let params = RecommendationParams {
            genres: Some("comedy".to_string()),
            actors: Some("Tom Hanks,Meg Ryan".to_string()),
            keywords: None,
            k: Some(3),
        };

        let query = params.to_query();
        assert_eq!(query.genres, vec!["comedy".to_string()]);
        assert_eq!(query.actors.len(), 2);
        assert!(query.keywords.is_empty());
    }

    #[test]
    fn test_blank_params_are_an_empty_query() {
        let params = RecommendationParams {
            genres: Some(" , ".to_string()),
            ..RecommendationParams::default()
        };
        assert!(params.to_query().is_empty());
    }
}
