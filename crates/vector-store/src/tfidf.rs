use crate::error::{Result, VectorStoreError};
use ndarray::{Array1, Array2};
use std::collections::{BTreeSet, HashMap};
use unicode_segmentation::UnicodeSegmentation;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "if", "in", "into", "is", "it", "its", "itself",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Lowercased word tokens of at least two characters, stop words removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() >= 2 && !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

/// Dense TF-IDF matrix over a fixed set of documents.
///
/// Uses smoothed idf, `ln((1 + n) / (1 + df)) + 1`, and L2-normalized rows so that a dot
/// product with a transformed query is the cosine similarity.
#[derive(Debug, Clone)]
pub struct TfIdfIndex {
    vocabulary: HashMap<String, usize>,
    idf: Array1<f32>,
    matrix: Array2<f32>,
}

impl TfIdfIndex {
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();

        let terms: BTreeSet<&str> = tokenized
            .iter()
            .flat_map(|tokens| tokens.iter().map(String::as_str))
            .collect();
        let vocabulary: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();

        let n_docs = tokenized.len();
        let mut df = vec![0usize; vocabulary.len()];
        for tokens in &tokenized {
            let unique: BTreeSet<usize> = tokens.iter().filter_map(|t| vocabulary.get(t).copied()).collect();
            for idx in unique {
                df[idx] += 1;
            }
        }
        let idf = Array1::from_iter(df.iter().map(|&count| {
            ((1.0 + n_docs as f32) / (1.0 + count as f32)).ln() + 1.0
        }));

        let mut matrix = Array2::<f32>::zeros((n_docs, vocabulary.len()));
        for (row, tokens) in tokenized.iter().enumerate() {
            for token in tokens {
                if let Some(&col) = vocabulary.get(token) {
                    matrix[[row, col]] += 1.0;
                }
            }
            let mut weighted = matrix.row_mut(row);
            weighted *= &idf;
            let norm = weighted.dot(&weighted).sqrt();
            if norm > 0.0 {
                weighted /= norm;
            }
        }

        Self {
            vocabulary,
            idf,
            matrix,
        }
    }

    /// Transforms `text` into the index's normalized term space.
    #[must_use]
    pub fn transform(&self, text: &str) -> Array1<f32> {
        let mut vector = Array1::<f32>::zeros(self.vocabulary.len());
        for token in tokenize(text) {
            if let Some(&col) = self.vocabulary.get(&token) {
                vector[col] += 1.0;
            }
        }
        vector *= &self.idf;
        let norm = vector.dot(&vector).sqrt();
        if norm > 0.0 {
            vector /= norm;
        }
        vector
    }

    /// Cosine similarity of `query` against every indexed document, in document order.
    pub fn similarities(&self, query: &Array1<f32>) -> Result<Array1<f32>> {
        if query.len() != self.matrix.ncols() {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.matrix.ncols(),
                actual: query.len(),
            });
        }
        Ok(self.matrix.dot(query))
    }

    #[must_use]
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.matrix.nrows()
    }
}
