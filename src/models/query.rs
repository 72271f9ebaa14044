use serde::{Deserialize, Serialize};

use super::Movie;

/// Filters supplied by the caller
///
/// Absent lists are treated as empty. The HTTP layer requires at least one
/// non-empty list; the engine itself just returns no matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl RecommendationQuery {
    pub fn new(genres: Vec<String>, actors: Vec<String>, keywords: Vec<String>) -> Self {
        Self {
            genres,
            actors,
            keywords,
        }
    }

    /// Query with genre filters only
    pub fn genres<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            genres: genres.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// True when no filter was supplied at all
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.actors.is_empty() && self.keywords.is_empty()
    }
}

/// Response body for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Movie>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_is_empty() {
        assert!(RecommendationQuery::default().is_empty());
    }

    #[test]
    fn test_any_filter_makes_query_non_empty() {
        assert!(!RecommendationQuery::genres(["comedy"]).is_empty());

        let query = RecommendationQuery::new(vec![], vec![], vec!["heist".to_string()]);
        assert!(!query.is_empty());
    }

    #[test]
    fn test_missing_lists_deserialize_as_empty() {
        let query: RecommendationQuery = serde_json::from_str(r#"{"actors":["Tom Hanks"]}"#).unwrap();
        assert!(query.genres.is_empty());
        assert_eq!(query.actors, vec!["Tom Hanks".to_string()]);
        assert!(query.keywords.is_empty());
    }
}
