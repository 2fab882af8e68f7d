use crate::corpus::DocCorpus;
use crate::tfidf::TfIdfIndex;
use analyst_protocol::DocChunk;

/// Ranked document lookup.
///
/// Implementations return at most `k` chunks ordered by descending score, and an empty list
/// when nothing is indexed. Retrieval never fails once the retriever is constructed.
pub trait DocumentRetriever: Send + Sync {
    fn retrieve(&self, query: &str, k: usize) -> Vec<DocChunk>;
}

/// Cosine similarity over a TF-IDF matrix of the corpus paragraphs.
pub struct TfIdfRetriever {
    corpus: DocCorpus,
    index: TfIdfIndex,
}

impl TfIdfRetriever {
    #[must_use]
    pub fn new(corpus: DocCorpus) -> Self {
        let texts: Vec<&str> = corpus.chunks().iter().map(|c| c.content.as_str()).collect();
        let index = TfIdfIndex::fit(&texts);
        log::debug!(
            "TF-IDF index built: {} chunks, {} terms",
            index.document_count(),
            index.vocabulary_len()
        );
        Self { corpus, index }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

impl DocumentRetriever for TfIdfRetriever {
    fn retrieve(&self, query: &str, k: usize) -> Vec<DocChunk> {
        if k == 0 || self.corpus.is_empty() {
            return Vec::new();
        }

        let sims = match self.index.similarities(&self.index.transform(query)) {
            Ok(sims) => sims,
            Err(err) => {
                log::warn!("Retrieval skipped: {err}");
                return Vec::new();
            }
        };

        let mut ranked: Vec<(usize, f32)> = sims.iter().copied().enumerate().collect();
        // Stable sort keeps corpus order among equal scores
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(k);

        let chunks = self.corpus.chunks();
        let results: Vec<DocChunk> = ranked
            .into_iter()
            .filter_map(|(idx, score)| {
                chunks.get(idx).map(|chunk| DocChunk {
                    chunk_id: chunk.chunk_id.clone(),
                    source: chunk.source.clone(),
                    content: chunk.content.clone(),
                    score: score.clamp(0.0, 1.0),
                })
            })
            .collect();

        log::debug!("Retrieved {} chunks for '{}'", results.len(), query);
        results
    }
}
