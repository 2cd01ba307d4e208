//! grimoire-index：把文档构建为领域 lore 索引
//!
//! 例：grimoire-index --file-path "data/Tormenta20.txt"
//! 生成 vector_stores/lore_index_tormenta20/index.json

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use grimoire::config::{load_config_or_default, Credentials};
use grimoire::core::create_embedder;
use grimoire::rag::IndexBuilder;

#[derive(Parser, Debug)]
#[command(name = "grimoire-index", about = "Build a lore index from text, markdown or HTML documents")]
struct Args {
    /// 文档文件或目录
    #[arg(long)]
    file_path: PathBuf,

    /// 索引名（默认取文件名）；查询时与 RPG 系统名（小写）对应
    #[arg(long)]
    name: Option<String>,

    /// 索引根目录（默认取配置 tools.lore.index_root）
    #[arg(long)]
    index_root: Option<PathBuf>,

    /// 额外的配置文件
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    grimoire::observability::init();
    let args = Args::parse();

    let cfg = load_config_or_default(args.config.clone());
    let embedder = create_embedder(&cfg, &Credentials::from_env())
        .context("Failed to create embedding provider")?;
    let index_root = args
        .index_root
        .unwrap_or_else(|| cfg.tools.lore.index_root.clone());

    println!("Carregando documentos de: {}", args.file_path.display());
    let report = IndexBuilder::new(embedder, index_root)
        .build(&args.file_path, args.name.as_deref())
        .await
        .with_context(|| format!("Failed to index {}", args.file_path.display()))?;

    println!(
        "Índice '{}' criado em {} ({} documento(s), {} chunks).",
        report.name,
        report.index_path.display(),
        report.documents,
        report.chunks
    );
    Ok(())
}
