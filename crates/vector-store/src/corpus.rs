use crate::error::{Result, VectorStoreError};
use std::path::Path;
use walkdir::WalkDir;

const DOC_EXTENSION: &str = "md";

/// A paragraph of a markdown document, before scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusChunk {
    pub chunk_id: String,
    pub source: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct DocCorpus {
    chunks: Vec<CorpusChunk>,
}

impl DocCorpus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.md` file directly under `dir`, in file-name order.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut corpus = Self::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|source| VectorStoreError::DocsDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(DOC_EXTENSION)
            {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                log::warn!("Skipping document with non UTF-8 name: {}", path.display());
                continue;
            };
            let text = std::fs::read_to_string(path)?;
            corpus.add_document(stem, &text);
        }

        log::info!(
            "Loaded {} chunks from {}",
            corpus.chunks.len(),
            dir.display()
        );
        Ok(corpus)
    }

    /// Splits `text` into blank-line separated paragraphs and appends them.
    pub fn add_document(&mut self, source: &str, text: &str) {
        for (idx, paragraph) in split_paragraphs(text).into_iter().enumerate() {
            self.chunks.push(CorpusChunk {
                chunk_id: format!("{source}::chunk{idx}"),
                source: source.to_string(),
                content: paragraph,
            });
        }
    }

    #[must_use]
    pub fn chunks(&self) -> &[CorpusChunk] {
        &self.chunks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn split_paragraphs(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    normalized
        .trim()
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
