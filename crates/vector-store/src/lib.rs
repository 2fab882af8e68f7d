//! # Analyst Vector Store
//!
//! Document retrieval for the hybrid analyst: a markdown corpus split into paragraphs and
//! ranked by TF-IDF cosine similarity.
//!
//! ```text
//! docs/*.md
//!     │
//!     ├──> DocCorpus (paragraph chunks, `<stem>::chunk<i>`)
//!     │
//!     └──> TfIdfIndex (smoothed idf, L2 rows)
//!            └─> DocumentRetriever::retrieve(query, k)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use analyst_vector_store::{DocCorpus, DocumentRetriever, TfIdfRetriever};
//!
//! let corpus = DocCorpus::load("docs").expect("docs dir");
//! let retriever = TfIdfRetriever::new(corpus);
//! for chunk in retriever.retrieve("return window for beverages", 3) {
//!     println!("{}: {:.3}", chunk.chunk_id, chunk.score);
//! }
//! ```

mod corpus;
mod error;
mod store;
mod tfidf;

pub use corpus::{CorpusChunk, DocCorpus};
pub use error::{Result, VectorStoreError};
pub use store::{DocumentRetriever, TfIdfRetriever};
pub use tfidf::{tokenize, TfIdfIndex};

pub use analyst_protocol::DocChunk;
