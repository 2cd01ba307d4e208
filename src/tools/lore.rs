//! LoreSearch：在领域索引中做相似度检索
//!
//! 索引目录为 <index_root>/lore_index_<领域小写>；不存在时返回带领域名与路径的诊断文本。
//! 加载或嵌入失败同样折叠为诊断文本，不向上传播。

use std::path::PathBuf;

use async_trait::async_trait;

use crate::llm::SharedEmbedder;
use crate::pipeline::ToolKind;
use crate::rag::{index_dir, LoreIndex};
use crate::tools::RetrievalTool;

pub const DEFAULT_TOP_K: usize = 5;

pub struct LoreSearchTool {
    index_root: PathBuf,
    top_k: usize,
    embedder: SharedEmbedder,
}

impl LoreSearchTool {
    pub fn new(index_root: impl Into<PathBuf>, embedder: SharedEmbedder) -> Self {
        Self {
            index_root: index_root.into(),
            top_k: DEFAULT_TOP_K,
            embedder,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    async fn search(&self, query: &str, domain: &str) -> Result<String, String> {
        let dir = index_dir(&self.index_root, domain);
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Err(format!(
                "Erro: Índice para o sistema '{}' não encontrado em '{}'.",
                domain,
                dir.display()
            ));
        }

        let index = LoreIndex::load(&dir)
            .await
            .map_err(|e| format!("Erro ao carregar o índice '{}': {}", dir.display(), e))?;
        if index.manifest().embedding_model != self.embedder.model() {
            tracing::warn!(
                index_model = %index.manifest().embedding_model,
                query_model = %self.embedder.model(),
                "lore index was built with a different embedding model"
            );
        }

        tracing::info!(domain = %domain, query = %query, "lore search");
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| format!("Erro ao gerar embedding da consulta: {}", e))?;

        let passages: Vec<String> = index
            .search(&query_embedding, self.top_k)
            .into_iter()
            .map(|hit| hit.chunk.text)
            .collect();
        Ok(passages.join("\n"))
    }
}

#[async_trait]
impl RetrievalTool for LoreSearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::LoreSearch
    }

    fn description(&self) -> &str {
        "Busca informações do universo do jogo (personagens, lugares, regras, história) no índice do sistema."
    }

    async fn retrieve(&self, query: &str, domain: &str) -> String {
        match self.search(query, domain).await {
            Ok(text) => text,
            Err(diagnostic) => {
                tracing::warn!(domain = %domain, diagnostic = %diagnostic, "lore search failed");
                diagnostic
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::HashingEmbedder;
    use crate::rag::IndexBuilder;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_index_names_domain_and_path() {
        let dir = TempDir::new().unwrap();
        let tool = LoreSearchTool::new(dir.path(), Arc::new(HashingEmbedder::default()));

        let out = tool.retrieve("Vectora", "SystemA").await;
        assert!(out.starts_with("Erro:"));
        assert!(out.contains("SystemA"));
        assert!(out.contains(&dir.path().join("lore_index_systema").display().to_string()));
    }

    #[tokio::test]
    async fn test_corrupt_index_is_diagnostic() {
        let dir = TempDir::new().unwrap();
        let index_path = dir.path().join("lore_index_t20");
        std::fs::create_dir_all(&index_path).unwrap();
        std::fs::write(index_path.join("index.json"), "not json").unwrap();

        let tool = LoreSearchTool::new(dir.path(), Arc::new(HashingEmbedder::default()));
        let out = tool.retrieve("Vectora", "T20").await;
        assert!(out.starts_with("Erro ao carregar o índice"));
    }

    #[tokio::test]
    async fn test_search_returns_most_relevant_passage_first() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("t20.txt");
        std::fs::write(
            &doc,
            "Vectora cidade voadora mercado magia.\n\nDoherimm reino anões forja montanha.",
        )
        .unwrap();
        let embedder: SharedEmbedder = Arc::new(HashingEmbedder::default());
        IndexBuilder::new(embedder.clone(), dir.path())
            .with_chunker(crate::rag::Chunker::new(crate::rag::ChunkingConfig {
                chunk_size: 40,
                chunk_overlap: 0,
                ..Default::default()
            }))
            .build(&doc, Some("T20"))
            .await
            .unwrap();

        let tool = LoreSearchTool::new(dir.path(), embedder).with_top_k(1);
        let out = tool.retrieve("anões forja Doherimm", "T20").await;
        assert!(out.contains("Doherimm"));
        assert!(!out.contains("Vectora"));
    }
}
