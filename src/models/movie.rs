use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of cast members carried by an output record
pub const MAX_CAST: usize = 5;

/// A catalog row as produced by the offline ingest
///
/// Row order in the metadata table is aligned 1:1 with the item matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieMeta {
    /// TMDB movie ID
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub director: Vec<String>,
}

/// Movie record returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub overview: String,
    pub poster_url: String,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
}

/// Reasons a catalog row cannot be turned into a [`Movie`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MovieValidationError {
    #[error("Movie {id}: title is empty")]
    EmptyTitle { id: i64 },

    #[error("Movie {id}: release date is missing")]
    MissingReleaseDate { id: i64 },

    #[error("Movie {id}: poster url {url:?} is not an absolute http(s) URL")]
    InvalidPosterUrl { id: i64, url: String },

    #[error("Movie {id}: at least one genre is required")]
    NoGenres { id: i64 },

    #[error("Movie {id}: {count} cast entries exceed the limit of {max}", max = MAX_CAST)]
    TooManyCast { id: i64, count: usize },
}

impl MovieValidationError {
    /// ID of the catalog row that failed validation
    pub fn movie_id(&self) -> i64 {
        match self {
            Self::EmptyTitle { id }
            | Self::MissingReleaseDate { id }
            | Self::InvalidPosterUrl { id, .. }
            | Self::NoGenres { id }
            | Self::TooManyCast { id, .. } => *id,
        }
    }
}

impl TryFrom<&MovieMeta> for Movie {
    type Error = MovieValidationError;

    fn try_from(meta: &MovieMeta) -> Result<Self, Self::Error> {
        let id = meta.id;

        if meta.title.trim().is_empty() {
            return Err(MovieValidationError::EmptyTitle { id });
        }

        let release_date = meta
            .release_date
            .ok_or(MovieValidationError::MissingReleaseDate { id })?;

        let poster_url = meta.poster_url.clone().unwrap_or_default();
        if !is_absolute_http_url(&poster_url) {
            return Err(MovieValidationError::InvalidPosterUrl {
                id,
                url: poster_url,
            });
        }

        if meta.genres.is_empty() {
            return Err(MovieValidationError::NoGenres { id });
        }

        if meta.cast.len() > MAX_CAST {
            return Err(MovieValidationError::TooManyCast {
                id,
                count: meta.cast.len(),
            });
        }

        Ok(Movie {
            id,
            title: meta.title.clone(),
            release_date,
            overview: meta.overview.clone().unwrap_or_default(),
            poster_url,
            genres: meta.genres.clone(),
            cast: meta.cast.clone(),
        })
    }
}

/// Accepts `http://host/...` and `https://host/...` with a non-empty host
/// and no embedded whitespace
fn is_absolute_http_url(url: &str) -> bool {
    let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    else {
        return false;
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    !host.is_empty() && !rest.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_meta() -> MovieMeta {
        MovieMeta {
            id: 603,
            title: "The Matrix".to_string(),
            overview: None,
            release_date: NaiveDate::from_ymd_opt(1999, 3, 30),
            poster_url: Some("https://image.tmdb.org/t/p/w500/matrix.jpg".to_string()),
            genres: vec!["action".to_string(), "science-fiction".to_string()],
            cast: vec!["keanu-reeves".to_string()],
            director: vec!["lana-wachowski".to_string()],
        }
    }

    #[test]
    fn test_valid_meta_converts() {
        let movie = Movie::try_from(&valid_meta()).unwrap();
        assert_eq!(movie.id, 603);
        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.overview, "");
        assert_eq!(movie.genres.len(), 2);
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut meta = valid_meta();
        meta.title = "   ".to_string();
        assert_eq!(
            Movie::try_from(&meta),
            Err(MovieValidationError::EmptyTitle { id: 603 })
        );
    }

    #[test]
    fn test_missing_release_date_rejected() {
        let mut meta = valid_meta();
        meta.release_date = None;
        assert_eq!(
            Movie::try_from(&meta),
            Err(MovieValidationError::MissingReleaseDate { id: 603 })
        );
    }

    #[test]
    fn test_poster_url_must_be_absolute() {
        for url in ["/t/p/w500/matrix.jpg", "ftp://host/x.jpg", "https://", "https://host/a b.jpg"] {
            let mut meta = valid_meta();
            meta.poster_url = Some(url.to_string());
            let err = Movie::try_from(&meta).unwrap_err();
            assert!(matches!(err, MovieValidationError::InvalidPosterUrl { .. }), "{url}");
        }

        let mut meta = valid_meta();
        meta.poster_url = None;
        assert!(Movie::try_from(&meta).is_err());
    }

    #[test]
    fn test_genres_required() {
        let mut meta = valid_meta();
        meta.genres.clear();
        assert_eq!(
            Movie::try_from(&meta),
            Err(MovieValidationError::NoGenres { id: 603 })
        );
    }

    #[test]
    fn test_cast_limit() {
        let mut meta = valid_meta();
        meta.cast = (0..MAX_CAST).map(|i| format!("actor-{i}")).collect();
        assert!(Movie::try_from(&meta).is_ok());

        meta.cast.push("one-too-many".to_string());
        let err = Movie::try_from(&meta).unwrap_err();
        assert_eq!(err, MovieValidationError::TooManyCast { id: 603, count: 6 });
        assert_eq!(err.movie_id(), 603);
        assert_eq!(
            err.to_string(),
            "Movie 603: 6 cast entries exceed the limit of 5"
        );
    }

    #[test]
    fn test_movie_serialization_shape() {
        let movie = Movie::try_from(&valid_meta()).unwrap();
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["release_date"], "1999-03-30");
        assert_eq!(json["overview"], "");
        assert!(json.get("director").is_none());
    }
}
