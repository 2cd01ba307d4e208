//! 持久化的相似度索引（每个领域一个目录，内含 index.json）

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::rag::{Chunk, IndexError};

pub const INDEX_FILE: &str = "index.json";
/// 索引目录名前缀：<index_root>/lore_index_<name>
pub const INDEX_DIR_PREFIX: &str = "lore_index_";

/// 领域名 → 索引目录（领域名转小写）
pub fn index_dir(index_root: &Path, name: &str) -> PathBuf {
    index_root.join(format!("{}{}", INDEX_DIR_PREFIX, name.to_lowercase()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    pub name: String,
    pub embedding_model: String,
    pub dimensions: usize,
    /// RFC 3339 时间戳
    pub created_at: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexedChunk {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// 检索命中
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreIndex {
    manifest: IndexManifest,
    entries: Vec<IndexedChunk>,
}

impl LoreIndex {
    pub fn new(name: impl Into<String>, embedding_model: impl Into<String>) -> Self {
        Self {
            manifest: IndexManifest {
                name: name.into(),
                embedding_model: embedding_model.into(),
                dimensions: 0,
                created_at: chrono::Utc::now().to_rfc3339(),
                sources: Vec::new(),
            },
            entries: Vec::new(),
        }
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    /// 添加块；所有向量维度必须一致
    pub fn add(&mut self, chunk: Chunk, embedding: Vec<f32>) -> Result<(), IndexError> {
        if embedding.is_empty() {
            return Err(IndexError::Embedding(format!("empty embedding for chunk {}", chunk.id)));
        }
        if self.manifest.dimensions == 0 {
            self.manifest.dimensions = embedding.len();
        } else if embedding.len() != self.manifest.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.manifest.dimensions,
                got: embedding.len(),
            });
        }
        if !self.manifest.sources.contains(&chunk.source) {
            self.manifest.sources.push(chunk.source.clone());
        }
        self.entries.push(IndexedChunk { chunk, embedding });
        Ok(())
    }

    pub fn save(&self, dir: &Path) -> Result<PathBuf, IndexError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(INDEX_FILE);
        let json = serde_json::to_vec(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }

    /// 异步读取 index.json（查询路径上调用，不阻塞运行时）
    pub async fn load(dir: &Path) -> Result<Self, IndexError> {
        let path = dir.join(INDEX_FILE);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::NotFound(path))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// 按余弦相似度返回最相关的 k 个块
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Vec<SearchHit> {
        let mut scored: Vec<(f32, &Chunk)> = self
            .entries
            .iter()
            .map(|e| (cosine_similarity(query_embedding, &e.embedding), &e.chunk))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(score, chunk)| SearchHit {
                chunk: chunk.clone(),
                score,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 余弦相似度
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn chunk(id: &str, text: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: text.to_string(),
            source: "doc".to_string(),
            offset: 0,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[1.0]), 0.0);
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let mut index = LoreIndex::new("t20", "test");
        index.add(chunk("a", "alpha"), vec![1.0, 0.0]).unwrap();
        index.add(chunk("b", "beta"), vec![0.0, 1.0]).unwrap();
        index.add(chunk("c", "gamma"), vec![0.7, 0.7]).unwrap();

        let hits = index.search(&[1.0, 0.1], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.id, "a");
        assert_eq!(hits[1].chunk.id, "c");
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let mut index = LoreIndex::new("t20", "test");
        index.add(chunk("a", "alpha"), vec![1.0, 0.0]).unwrap();
        let err = index.add(chunk("b", "beta"), vec![1.0]).unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { expected: 2, got: 1 }));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let index_path = index_dir(dir.path(), "Tormenta20");
        assert!(index_path.ends_with("lore_index_tormenta20"));

        let mut index = LoreIndex::new("tormenta20", "test");
        index.add(chunk("a", "alpha"), vec![1.0, 0.0]).unwrap();
        index.save(&index_path).unwrap();

        let loaded = LoreIndex::load(&index_path).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.manifest().dimensions, 2);
        assert_eq!(loaded.manifest().sources, vec!["doc".to_string()]);
    }

    #[tokio::test]
    async fn test_load_missing_index() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            LoreIndex::load(&dir.path().join("nope")).await.unwrap_err(),
            IndexError::NotFound(_)
        ));
    }
}
