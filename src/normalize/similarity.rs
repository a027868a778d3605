//! Fuzzy name similarity.
//!
//! Advisory only: a fuzzy match surfaces likely naming drift in reports but
//! never counts as holding a certification.

use super::names::normalize;
use serde::Serialize;

/// Default ratio at which two names are reported as likely the same.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.90;

/// Edit distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Similarity of two names in `[0, 1]`, compared after normalization.
///
/// `1 - distance / max(len)`; two empty names are identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let longest = a.as_str().chars().count().max(b.as_str().chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a.as_str(), b.as_str()) as f64 / longest as f64
}

/// A candidate close enough to a name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyMatch {
    pub candidate: String,
    pub ratio: f64,
}

/// The candidate most similar to `name` with a ratio of at least
/// `threshold`. Ties go to the lexicographically smaller candidate.
pub fn best_match<'a, I>(name: &str, candidates: I, threshold: f64) -> Option<FuzzyMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|candidate| (candidate, similarity_ratio(name, candidate)))
        .filter(|(_, ratio)| *ratio >= threshold)
        .max_by(|(ca, ra), (cb, rb)| ra.total_cmp(rb).then_with(|| cb.cmp(ca)))
        .map(|(candidate, ratio)| FuzzyMatch {
            candidate: candidate.to_string(),
            ratio,
        })
}
