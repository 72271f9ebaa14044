use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use sprs::{CsMat, TriMat};
use thiserror::Error;

use crate::models::MovieMeta;

pub const VOCABULARY_FILE: &str = "vocabulary.json";
pub const MATRIX_FILE: &str = "item_matrix.mtx";
pub const METADATA_FILE: &str = "movies_meta.json";

/// Errors raised while loading or writing the artifact bundle
///
/// At load time every variant is fatal: the process cannot serve without a
/// bundle.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read sparse matrix {path}: {message}")]
    Matrix { path: PathBuf, message: String },

    #[error("Invalid vocabulary: {0}")]
    Vocabulary(String),

    #[error("Dimension mismatch: {0}")]
    Dimension(String),

    #[error("Invalid item weight: {0}")]
    Weight(String),
}

/// Normalization the weighting model applies to a projected query
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryNorm {
    #[default]
    None,
    L2,
}

/// Column index and global (inverse document frequency) weight of a term
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TermEntry {
    pub index: usize,
    pub idf: f64,
}

/// Term-weighting model: vocabulary plus the analyzer options it was built with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vocabulary {
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default)]
    pub norm: QueryNorm,
    pub terms: HashMap<String, TermEntry>,
}

fn default_lowercase() -> bool {
    true
}

impl Vocabulary {
    pub fn new(terms: HashMap<String, TermEntry>) -> Self {
        Self {
            lowercase: default_lowercase(),
            norm: QueryNorm::default(),
            terms,
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<&TermEntry> {
        self.terms.get(term)
    }

    /// Column indices must be exactly `0..len` and weights finite
    fn validate(&self) -> Result<(), ArtifactError> {
        let mut seen = vec![false; self.terms.len()];

        for (term, entry) in &self.terms {
            if !entry.idf.is_finite() || entry.idf < 0.0 {
                return Err(ArtifactError::Vocabulary(format!(
                    "term {term:?} has weight {}, expected a finite non-negative value",
                    entry.idf
                )));
            }

            match seen.get_mut(entry.index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(ArtifactError::Vocabulary(format!(
                        "column {} is assigned to more than one term",
                        entry.index
                    )))
                }
                None => {
                    return Err(ArtifactError::Vocabulary(format!(
                        "term {term:?} has column {} outside 0..{}",
                        entry.index,
                        self.terms.len()
                    )))
                }
            }
        }

        Ok(())
    }
}

/// Locations of the three artifacts produced by the offline build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vocabulary: PathBuf,
    pub item_matrix: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    /// Resolves the fixed artifact file names under `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            vocabulary: dir.join(VOCABULARY_FILE),
            item_matrix: dir.join(MATRIX_FILE),
            metadata: dir.join(METADATA_FILE),
        }
    }
}

/// Immutable precomputed data needed to score queries
///
/// Row `i` of `item_matrix` describes `metadata[i]`; columns are vocabulary
/// terms. All weights are finite and non-negative, so a row scores above
/// zero exactly when it shares a term with the query.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    vocabulary: Vocabulary,
    item_matrix: CsMat<f64>,
    metadata: Vec<MovieMeta>,
}

impl ArtifactBundle {
    /// Assembles a bundle, checking the dimensional invariants
    pub fn from_parts(
        vocabulary: Vocabulary,
        item_matrix: CsMat<f64>,
        metadata: Vec<MovieMeta>,
    ) -> Result<Self, ArtifactError> {
        vocabulary.validate()?;

        if item_matrix.rows() != metadata.len() {
            return Err(ArtifactError::Dimension(format!(
                "item matrix has {} rows but metadata has {} movies",
                item_matrix.rows(),
                metadata.len()
            )));
        }

        if item_matrix.cols() != vocabulary.len() {
            return Err(ArtifactError::Dimension(format!(
                "item matrix has {} columns but vocabulary has {} terms",
                item_matrix.cols(),
                vocabulary.len()
            )));
        }

        if let Some(bad) = item_matrix
            .data()
            .iter()
            .find(|w| !w.is_finite() || **w < 0.0)
        {
            return Err(ArtifactError::Weight(format!(
                "item matrix contains {bad}, expected a finite non-negative value"
            )));
        }

        let duplicates = count_duplicate_ids(&metadata);
        if duplicates > 0 {
            tracing::warn!(
                duplicate_rows = duplicates,
                "Catalog contains duplicate movie ids; results are deduplicated after selection"
            );
        }

        Ok(Self {
            vocabulary,
            item_matrix,
            metadata,
        })
    }

    /// Reads and validates all three artifacts
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let start = Instant::now();

        let vocabulary: Vocabulary = read_json(&paths.vocabulary)?;
        let item_matrix = read_matrix(&paths.item_matrix)?;
        let metadata: Vec<MovieMeta> = read_json(&paths.metadata)?;

        let bundle = Self::from_parts(vocabulary, item_matrix, metadata)?;

        tracing::info!(
            movies = bundle.len(),
            terms = bundle.vocabulary.len(),
            non_zeros = bundle.item_matrix.nnz(),
            load_time_ms = start.elapsed().as_millis(),
            "Artifacts loaded"
        );

        Ok(bundle)
    }

    /// Writes the bundle in the layout [`ArtifactBundle::load`] reads
    pub fn save(&self, paths: &ArtifactPaths) -> Result<(), ArtifactError> {
        write_json(&paths.vocabulary, &self.vocabulary)?;
        write_json(&paths.metadata, &self.metadata)?;

        sprs::io::write_matrix_market(&paths.item_matrix, self.item_matrix.view()).map_err(
            |source| ArtifactError::Io {
                path: paths.item_matrix.clone(),
                source,
            },
        )
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn item_matrix(&self) -> &CsMat<f64> {
        &self.item_matrix
    }

    pub fn metadata(&self) -> &[MovieMeta] {
        &self.metadata
    }

    /// Catalog size
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}

fn count_duplicate_ids(metadata: &[MovieMeta]) -> usize {
    let mut seen = HashSet::with_capacity(metadata.len());
    metadata.iter().filter(|m| !seen.insert(m.id)).count()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let io_error = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    serde_json::to_writer(&mut writer, value).map_err(|e| io_error(e.into()))?;
    writer.flush().map_err(io_error)
}

fn read_matrix(path: &Path) -> Result<CsMat<f64>, ArtifactError> {
    if !path.is_file() {
        return Err(ArtifactError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        });
    }

    let triplets: TriMat<f64> =
        sprs::io::read_matrix_market(path).map_err(|e| ArtifactError::Matrix {
            path: path.to_path_buf(),
            message: format!("{e:?}"),
        })?;

    Ok(triplets.to_csr())
}

/// Process-wide holder for the artifact bundle
///
/// The first call to [`SharedArtifacts::get`] loads the bundle; concurrent
/// first callers block until that single load finishes. Afterwards every
/// call is a lock-free read. A failed load is kept and returned to every
/// caller, it is never retried.
pub struct SharedArtifacts {
    paths: ArtifactPaths,
    cell: OnceLock<Result<Arc<ArtifactBundle>, Arc<ArtifactError>>>,
}

impl SharedArtifacts {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            cell: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Result<Arc<ArtifactBundle>, Arc<ArtifactError>> {
        self.cell
            .get_or_init(|| {
                tracing::info!(
                    vocabulary = %self.paths.vocabulary.display(),
                    item_matrix = %self.paths.item_matrix.display(),
                    metadata = %self.paths.metadata.display(),
                    "Loading artifacts"
                );
                ArtifactBundle::load(&self.paths).map(Arc::new).map_err(|e| {
                    tracing::error!(error = %e, "Artifact load failed");
                    Arc::new(e)
                })
            })
            .clone()
    }

    /// True once a load has completed successfully
    pub fn is_loaded(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }
}
