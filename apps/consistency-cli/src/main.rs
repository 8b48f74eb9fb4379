//! Consistency CLI
//!
//! Compares plain-text documents and prints the JSON report to stdout.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use consistency_engine::{
    document_groups, CancellationToken, ConsistencyEngine, EngineConfig, InMemoryChunkStore,
    SelfConsistencyAnalyzer, SingleDocumentAnalyzer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "consistency-cli")]
#[command(
    version,
    about = "Cross-document terminology and formatting consistency analysis"
)]
struct Args {
    /// Plain-text documents to compare (at least two)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// TOML configuration extending the built-in glossary and grammar
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Blend each document's self-consistency score into the overall score
    #[arg(long)]
    self_consistency: bool,

    /// Print only the comparison findings
    #[arg(long)]
    findings_only: bool,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the report, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &args.config {
        Some(path) => EngineConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::builtin(),
    };
    let engine = ConsistencyEngine::new(config);

    let mut store = InMemoryChunkStore::new();
    let mut sources = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            bail!("Unsupported file name: {}", path.display());
        };
        let chunks = store.ingest(name, &text);
        tracing::debug!("{}: {} chunks", name, chunks);
        sources.push(name.to_string());
    }

    let source_refs: Vec<&str> = sources.iter().map(String::as_str).collect();
    let groups = document_groups(&store, &source_refs)?;

    let output = if args.findings_only {
        serde_json::to_value(engine.compare(&groups)?)?
    } else {
        let cancel = CancellationToken::new();
        let analyzer = SelfConsistencyAnalyzer::new(engine.config(), &groups).with_cancel(&cancel);
        let analyzer: Option<&dyn SingleDocumentAnalyzer> = if args.self_consistency {
            Some(&analyzer)
        } else {
            None
        };
        serde_json::to_value(engine.analyze_with(&groups, analyzer, &cancel)?)?
    };

    let rendered = if args.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{}", rendered);

    Ok(())
}
