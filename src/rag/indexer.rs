//! 文档入库：读取 .txt / .md / .html / .pdf 文件（或目录），分块、嵌入并保存为领域索引
//!
//! 索引名取文件名（目录则取目录名）去扩展名、转小写、空格换成下划线。

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::llm::SharedEmbedder;
use crate::rag::{index_dir, Chunker, IndexError, LoreIndex};

/// 支持的文档扩展名
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "html", "htm", "pdf"];

/// 每批嵌入的块数
const EMBED_BATCH: usize = 32;

/// 由输入路径推导索引名
pub fn index_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_lowercase().replace(' ', "_"))
        .unwrap_or_else(|| "default".to_string())
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase())
}

/// 列出待入库的文件：单个文件直接返回；目录则递归查找支持的扩展名（按路径排序）
pub fn collect_documents(path: &Path) -> Result<Vec<PathBuf>, IndexError> {
    if !path.exists() {
        return Err(IndexError::NotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_supported(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    Ok(files)
}

fn document_error(path: &Path, e: impl std::fmt::Display) -> IndexError {
    IndexError::Document(format!("{}: {}", path.display(), e))
}

/// 读取文档文本；HTML 用 html2text 提取可读文本，PDF 用 pdf-extract 提取各页文本
pub fn load_document(path: &Path) -> Result<String, IndexError> {
    match extension(path).as_deref() {
        Some("pdf") => {
            let bytes = std::fs::read(path)?;
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| document_error(path, e))
        }
        Some("html") | Some("htm") => {
            let raw = std::fs::read(path)?;
            html2text::from_read(raw.as_slice(), 120).map_err(|e| document_error(path, e))
        }
        _ => Ok(std::fs::read_to_string(path)?),
    }
}

/// 入库结果
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub name: String,
    pub index_path: PathBuf,
    pub documents: usize,
    pub chunks: usize,
}

pub struct IndexBuilder {
    chunker: Chunker,
    embedder: SharedEmbedder,
    index_root: PathBuf,
}

impl IndexBuilder {
    pub fn new(embedder: SharedEmbedder, index_root: impl Into<PathBuf>) -> Self {
        Self {
            chunker: Chunker::default(),
            embedder,
            index_root: index_root.into(),
        }
    }

    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// 构建并保存索引；name 为 None 时由输入路径推导
    pub async fn build(&self, input: &Path, name: Option<&str>) -> Result<BuildReport, IndexError> {
        let name = name
            .map(|n| n.to_lowercase().replace(' ', "_"))
            .unwrap_or_else(|| index_name_for(input));
        let files = collect_documents(input)?;
        tracing::info!(name = %name, files = files.len(), "building lore index");

        let mut index = LoreIndex::new(&name, self.embedder.model());
        let mut documents = 0;
        for file in &files {
            let text = load_document(file)?;
            let source = file
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let chunks = self.chunker.chunk(&source, &text);
            if chunks.is_empty() {
                tracing::warn!(file = %file.display(), "document has no text, skipped");
                continue;
            }
            tracing::info!(file = %file.display(), chunks = chunks.len(), "document chunked");

            for batch in chunks.chunks(EMBED_BATCH) {
                let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
                let vectors = self
                    .embedder
                    .embed_batch(&texts)
                    .await
                    .map_err(|e| IndexError::Embedding(e.to_string()))?;
                for (chunk, vector) in batch.iter().cloned().zip(vectors) {
                    index.add(chunk, vector)?;
                }
            }
            documents += 1;
        }

        if index.is_empty() {
            return Err(IndexError::EmptyDocument(input.to_path_buf()));
        }

        let dir = index_dir(&self.index_root, &name);
        index.save(&dir)?;
        tracing::info!(path = %dir.display(), chunks = index.len(), "lore index saved");

        Ok(BuildReport {
            name,
            index_path: dir,
            documents,
            chunks: index.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::HashingEmbedder;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_index_name_for() {
        assert_eq!(index_name_for(Path::new("data/Tormenta 20 Lore.txt")), "tormenta_20_lore");
        assert_eq!(index_name_for(Path::new("books/cthulhu")), "cthulhu");
    }

    #[test]
    fn test_load_html_document_strips_tags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body><h1>Vectora</h1><p>Cidade voadora.</p></body></html>").unwrap();
        let text = load_document(&path).unwrap();
        assert!(text.contains("Vectora"));
        assert!(text.contains("Cidade voadora."));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_collect_documents_filters_extensions() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.md"), "b").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("c.pdf"), "c").unwrap();
        std::fs::write(dir.path().join("d.docx"), "d").unwrap();
        let files = collect_documents(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.md", "c.pdf"]);
    }

    /// 单页 PDF：Helvetica 写一行文本，xref 偏移按实际字节计算
    fn single_page_pdf(line: &str) -> Vec<u8> {
        let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", line);
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>".to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
            format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn test_load_pdf_document_extracts_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Tormenta20.pdf");
        std::fs::write(&path, single_page_pdf("Vectora cidade voadora")).unwrap();
        let text = load_document(&path).unwrap();
        assert!(text.contains("Vectora"), "extracted: {:?}", text);
    }

    #[test]
    fn test_load_corrupt_pdf_is_document_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, "not a pdf").unwrap();
        assert!(matches!(load_document(&path).unwrap_err(), IndexError::Document(_)));
    }

    #[tokio::test]
    async fn test_build_from_pdf() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("Cthulhu.pdf");
        std::fs::write(&doc, single_page_pdf("Arkham fica em Massachusetts")).unwrap();

        let builder = IndexBuilder::new(Arc::new(HashingEmbedder::default()), dir.path().join("vs"));
        let report = builder.build(&doc, None).await.unwrap();
        assert_eq!(report.name, "cthulhu");
        assert_eq!(report.documents, 1);
    }

    #[tokio::test]
    async fn test_build_saves_searchable_index() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("Tormenta20.txt");
        std::fs::write(
            &doc,
            "Vectora é uma cidade voadora governada por Vectorius.\n\nOs anões de Doherimm forjam armas.",
        )
        .unwrap();

        let root = dir.path().join("vector_stores");
        let builder = IndexBuilder::new(Arc::new(HashingEmbedder::default()), &root);
        let report = builder.build(&doc, None).await.unwrap();

        assert_eq!(report.name, "tormenta20");
        assert_eq!(report.documents, 1);
        assert!(report.chunks >= 1);
        assert!(report.index_path.join("index.json").exists());
    }

    #[tokio::test]
    async fn test_build_missing_input() {
        let dir = TempDir::new().unwrap();
        let builder = IndexBuilder::new(Arc::new(HashingEmbedder::default()), dir.path());
        let err = builder.build(&dir.path().join("nope.txt"), None).await.unwrap_err();
        assert!(matches!(err, IndexError::NotFound(_)));
    }
}
