use serde::Deserialize;

use crate::models::{Movie, MovieMeta, MovieValidationError};

/// What to do with a selected row that fails validation
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MappingPolicy {
    /// Drop the row, log it, keep the rest of the batch
    #[default]
    Skip,
    /// Fail the whole batch on the first invalid row
    Abort,
}

/// Converts selected catalog rows into output records, preserving order
pub fn to_records<'a, I>(rows: I, policy: MappingPolicy) -> Result<Vec<Movie>, MovieValidationError>
where
    I: IntoIterator<Item = &'a MovieMeta>,
{
    let mut records = Vec::new();

    for meta in rows {
        match Movie::try_from(meta) {
            Ok(movie) => records.push(movie),
            Err(e) if policy == MappingPolicy::Skip => {
                tracing::warn!(movie_id = e.movie_id(), error = %e, "Skipping invalid catalog row");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::movie;

    fn rows() -> Vec<MovieMeta> {
        let mut broken = movie(2, "Broken", &["comedy"], &[]);
        broken.genres.clear();
        vec![
            movie(1, "First", &["comedy"], &["tom-hanks"]),
            broken,
            movie(3, "Third", &["drama"], &[]),
        ]
    }

    #[test]
    fn test_skip_policy_keeps_valid_rows_in_order() {
        let records = to_records(&rows(), MappingPolicy::Skip).unwrap();
        let ids: Vec<i64> = records.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_abort_policy_fails_on_first_invalid_row() {
        let err = to_records(&rows(), MappingPolicy::Abort).unwrap_err();
        assert_eq!(err, MovieValidationError::NoGenres { id: 2 });
    }

    #[test]
    fn test_empty_input() {
        let records = to_records(std::iter::empty(), MappingPolicy::Abort).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        let policy: MappingPolicy = serde_json::from_str("\"abort\"").unwrap();
        assert_eq!(policy, MappingPolicy::Abort);
    }
}
