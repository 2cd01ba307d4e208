//! 文档分块：递归按分隔符切片，再装箱成带重叠的块；偏移为原文字节位置

use std::collections::VecDeque;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// 文档块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// 块 ID：<source>_<序号>
    pub id: String,
    /// 原始文本
    pub text: String,
    /// 来源文档
    pub source: String,
    /// 在原文档中的字节偏移
    pub offset: usize,
}

/// 分块策略
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// 目标块大小（字符数）
    pub chunk_size: usize,
    /// 块之间的重叠（字符数）
    pub chunk_overlap: usize,
    /// 分隔符优先级（从高到低）
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                ". ".to_string(),
                "! ".to_string(),
                "? ".to_string(),
                " ".to_string(),
            ],
        }
    }
}

pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// 先按分隔符把文本切成不超过 chunk_size 的片段，再把相邻片段装箱成块；
    /// 新块开头带上前一块末尾不超过 chunk_overlap 的片段
    pub fn chunk(&self, source: &str, text: &str) -> Vec<Chunk> {
        let size = self.config.chunk_size.max(1);
        let overlap = self.config.chunk_overlap.min(size - 1);

        let mut pieces = Vec::new();
        split_pieces(text, 0, &self.config.separators, size, &mut pieces);

        let mut chunks = Vec::new();
        let mut window: VecDeque<(Range<usize>, usize)> = VecDeque::new();
        let mut window_chars = 0;
        for piece in pieces {
            let piece_chars = text[piece.clone()].chars().count();
            if window_chars + piece_chars > size && !window.is_empty() {
                push_window(&mut chunks, source, text, &window);
                while window_chars > overlap || window_chars + piece_chars > size {
                    match window.pop_front() {
                        Some((_, chars)) => window_chars -= chars,
                        None => break,
                    }
                }
            }
            window.push_back((piece, piece_chars));
            window_chars += piece_chars;
        }
        push_window(&mut chunks, source, text, &window);

        chunks
    }
}

/// 递归切分：取文本中出现的最高优先级分隔符切开（分隔符留在前一段末尾），
/// 过长的段落用剩余分隔符继续切；没有分隔符可用时按字符数硬切
fn split_pieces(
    text: &str,
    base: usize,
    separators: &[String],
    size: usize,
    out: &mut Vec<Range<usize>>,
) {
    if text.is_empty() {
        return;
    }
    if text.chars().count() <= size {
        out.push(base..base + text.len());
        return;
    }

    let found = separators
        .iter()
        .position(|sep| !sep.is_empty() && text.contains(sep.as_str()));
    match found {
        Some(i) => {
            let mut start = base;
            for part in text.split_inclusive(separators[i].as_str()) {
                split_pieces(part, start, &separators[i + 1..], size, out);
                start += part.len();
            }
        }
        None => {
            let mut start = 0;
            for (n, (idx, _)) in text.char_indices().enumerate() {
                if n > 0 && n % size == 0 {
                    out.push(base + start..base + idx);
                    start = idx;
                }
            }
            out.push(base + start..base + text.len());
        }
    }
}

/// 窗口内的片段在原文中连续，取首尾范围、去掉两端空白后成块
fn push_window(
    chunks: &mut Vec<Chunk>,
    source: &str,
    text: &str,
    window: &VecDeque<(Range<usize>, usize)>,
) {
    let (Some((first, _)), Some((last, _))) = (window.front(), window.back()) else {
        return;
    };
    let raw = &text[first.start..last.end];
    let body = raw.trim_start();
    let offset = first.start + (raw.len() - body.len());
    let body = body.trim_end();
    if body.is_empty() {
        return;
    }
    chunks.push(Chunk {
        id: format!("{}_{}", source, chunks.len()),
        text: body.to_string(),
        source: source.to_string(),
        offset,
    });
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Chunker {
        Chunker::new(ChunkingConfig {
            chunk_size: 40,
            chunk_overlap: 10,
            ..Default::default()
        })
    }

    #[test]
    fn test_chunking_splits_and_tags_source() {
        let text = "Vectora é uma cidade voadora. Os anões vivem em Doherimm.\n\nKhalmyr é o deus da justiça.";
        let chunks = small().chunk("tormenta", text);

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(!chunk.text.is_empty());
            assert!(chunk.text.chars().count() <= 40);
            assert_eq!(chunk.source, "tormenta");
            assert_eq!(chunk.id, format!("tormenta_{}", i));
        }
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = Chunker::default().chunk("doc", "  Um parágrafo curto.  ");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Um parágrafo curto.");
        assert_eq!(chunks[0].offset, 2);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(Chunker::default().chunk("doc", "").is_empty());
        assert!(Chunker::default().chunk("doc", "   \n ").is_empty());
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let text = "ação ".repeat(50);
        let chunks = small().chunk("pt", &text);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_chunks_break_at_highest_priority_separator() {
        let text = "Vectora é uma cidade voadora. Os anões vivem em Doherimm.\n\nKhalmyr é o deus da justiça.";
        let texts: Vec<_> = small().chunk("t", text).into_iter().map(|c| c.text).collect();
        assert_eq!(
            texts,
            vec![
                "Vectora é uma cidade voadora.",
                "Os anões vivem em Doherimm.",
                "Khalmyr é o deus da justiça.",
            ]
        );
    }

    #[test]
    fn test_neighbouring_chunks_overlap() {
        let text = "alfa beta gama delta epsilon zeta eta teta iota kapa lambda mi";
        let chunks = Chunker::new(ChunkingConfig {
            chunk_size: 20,
            chunk_overlap: 10,
            ..Default::default()
        })
        .chunk("g", text);

        assert!(chunks.len() > 2);
        for pair in chunks.windows(2) {
            let last_word = pair[0].text.split(' ').last().unwrap();
            assert!(pair[1].text.split(' ').any(|w| w == last_word), "{:?}", pair);
        }
    }

    #[test]
    fn test_offsets_point_into_source_text() {
        let text = "  primeiro bloco de texto\n\nsegundo bloco de texto aqui\n\nterceiro";
        for chunk in small().chunk("o", text) {
            assert_eq!(&text[chunk.offset..chunk.offset + chunk.text.len()], chunk.text);
        }
    }

    #[test]
    fn test_text_without_separators_is_hard_cut() {
        let text = "x".repeat(95);
        let chunks = Chunker::new(ChunkingConfig {
            chunk_size: 40,
            chunk_overlap: 0,
            separators: vec![" ".to_string()],
        })
        .chunk("h", &text);
        let lens: Vec<_> = chunks.iter().map(|c| c.text.len()).collect();
        assert_eq!(lens, vec![40, 40, 15]);
    }

    #[test]
    fn test_chunking_config_default() {
        let config = ChunkingConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 150);
    }
}
