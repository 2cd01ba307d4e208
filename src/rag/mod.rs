//! Lore 检索的索引层：分块、持久化相似度索引、文档入库

pub mod chunker;
pub mod indexer;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use chunker::{Chunk, Chunker, ChunkingConfig};
pub use indexer::{collect_documents, index_name_for, load_document, BuildReport, IndexBuilder};
pub use store::{cosine_similarity, index_dir, IndexManifest, LoreIndex, SearchHit};

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No indexable text in {}", .0.display())]
    EmptyDocument(PathBuf),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}
