//! Catalog fixtures shared by unit and integration tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use sprs::TriMat;

use crate::models::MovieMeta;
use crate::services::artifacts::{
    ArtifactBundle, ArtifactError, ArtifactPaths, TermEntry, Vocabulary,
};
use crate::services::mapper::MappingPolicy;
use crate::services::recommender::Recommender;

const FILLER_GENRES: [&str; 5] = ["drama", "thriller", "horror", "documentary", "animation"];

pub fn movie(id: i64, title: &str, genres: &[&str], cast: &[&str]) -> MovieMeta {
    MovieMeta {
        id,
        title: title.to_string(),
        overview: Some(format!("{title} overview")),
        release_date: NaiveDate::from_ymd_opt(2000, 1, 1),
        poster_url: Some(format!("https://image.tmdb.org/t/p/w500/{id}.jpg")),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        cast: cast.iter().map(|c| c.to_string()).collect(),
        director: Vec::new(),
    }
}

pub fn small_catalog() -> Vec<MovieMeta> {
    vec![
        movie(1, "Heist Night", &["action", "crime"], &["keanu-reeves"]),
        movie(2, "Laugh Track", &["comedy"], &["tom-hanks"]),
        movie(3, "Space Drift", &["science-fiction"], &["sandra-bullock"]),
        movie(4, "Office Party", &["comedy", "romance"], &["tom-hanks", "meg-ryan"]),
        movie(5, "Action Hero", &["action"], &["keanu-reeves", "carrie-anne-moss"]),
        movie(6, "Quiet Drama", &["drama"], &["meg-ryan"]),
    ]
}

/// 300 rows titled "Movie <id>" with ids 1000.., one filler genre and one
/// unique actor each
pub fn catalog_300() -> Vec<MovieMeta> {
    (0..300)
        .map(|i| {
            let id = 1000 + i as i64;
            let actor = format!("actor-{i}");
            movie(
                id,
                &format!("Movie {id}"),
                &[FILLER_GENRES[i % FILLER_GENRES.len()]],
                &[&actor],
            )
        })
        .collect()
}

/// Terms a catalog row contributes to its own weight vector
fn row_terms(movie: &MovieMeta) -> Vec<String> {
    movie
        .genres
        .iter()
        .map(|g| format!("genre={g}"))
        .chain(movie.cast.iter().map(|a| format!("actor={a}")))
        .chain(movie.director.iter().map(|d| format!("director={d}")))
        .chain(movie.title.split_whitespace().map(str::to_lowercase))
        .collect()
}

/// Builds a smoothed tf-idf bundle over `movies`, the way the offline build
/// weights its catalog
pub fn bundle(movies: Vec<MovieMeta>) -> Result<ArtifactBundle, ArtifactError> {
    let rows: Vec<Vec<String>> = movies.iter().map(row_terms).collect();

    let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for terms in &rows {
        let unique: BTreeSet<&str> = terms.iter().map(String::as_str).collect();
        for term in unique {
            *document_frequency.entry(term).or_insert(0) += 1;
        }
    }

    let n = movies.len() as f64;
    let terms: HashMap<String, TermEntry> = document_frequency
        .iter()
        .enumerate()
        .map(|(index, (term, df))| {
            let idf = ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0;
            (term.to_string(), TermEntry { index, idf })
        })
        .collect();

    let mut triplets = TriMat::new((movies.len(), terms.len()));
    for (row, row_terms) in rows.iter().enumerate() {
        for entry in row_terms.iter().filter_map(|term| terms.get(term)) {
            triplets.add_triplet(row, entry.index, entry.idf);
        }
    }

    ArtifactBundle::from_parts(Vocabulary::new(terms), triplets.to_csr(), movies)
}

pub fn recommender(movies: Vec<MovieMeta>) -> Result<Recommender, ArtifactError> {
    Ok(Recommender::new(
        Arc::new(bundle(movies)?),
        MappingPolicy::Skip,
    ))
}

/// Writes the three artifact files for `movies` into `dir`
pub fn write_artifacts(dir: &Path, movies: &[MovieMeta]) -> Result<(), ArtifactError> {
    bundle(movies.to_vec())?.save(&ArtifactPaths::in_dir(dir))
}
