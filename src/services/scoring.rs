use std::borrow::Cow;
use std::collections::BTreeMap;

use sprs::CsVec;

use crate::services::artifacts::{ArtifactBundle, QueryNorm, Vocabulary};

/// Projects a token list into the vocabulary's vector space
///
/// The tokens are joined into one synthetic document and analyzed the way
/// the weighting model was built: whitespace split, optional lowercasing.
/// Each known term is weighted `tf * idf`; unknown terms are dropped.
pub fn project(tokens: &[String], vocabulary: &Vocabulary) -> CsVec<f64> {
    let document = tokens.join(" ");

    // column -> (term frequency, idf)
    let mut counts: BTreeMap<usize, (f64, f64)> = BTreeMap::new();
    for raw in document.split_whitespace() {
        let term: Cow<'_, str> = if vocabulary.lowercase {
            Cow::Owned(raw.to_lowercase())
        } else {
            Cow::Borrowed(raw)
        };

        if let Some(entry) = vocabulary.get(&term) {
            counts.entry(entry.index).or_insert((0.0, entry.idf)).0 += 1.0;
        }
    }

    let (indices, mut data): (Vec<usize>, Vec<f64>) = counts
        .into_iter()
        .map(|(index, (tf, idf))| (index, tf * idf))
        .unzip();

    if vocabulary.norm == QueryNorm::L2 {
        let norm = data.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            data.iter_mut().for_each(|w| *w /= norm);
        }
    }

    // BTreeMap iteration keeps indices sorted and unique
    CsVec::new(vocabulary.len(), indices, data)
}

/// Raw inner product of every catalog row with the projected query
///
/// Returns an empty vector for an empty token list, otherwise one score per
/// catalog row in metadata order.
pub fn score(tokens: &[String], bundle: &ArtifactBundle) -> Vec<f64> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let query = project(tokens, bundle.vocabulary());
    let mut scores = vec![0.0; bundle.len()];

    if query.nnz() == 0 {
        tracing::debug!(tokens = tokens.len(), "No query token is in the vocabulary");
        return scores;
    }

    let product = bundle.item_matrix() * &query;
    for (row, &value) in product.iter() {
        scores[row] = value;
    }

    scores
}
