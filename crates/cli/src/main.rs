use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sopindex::logging::log_filter;
use sopindex::openai::{OpenAiClient, OpenAiEmbedder, OpenAiGenerator};
use sopindex::render::{render_answer, render_evidence};
use sopindex_core::config;
use sopindex_core::ingest::build_index;
use sopindex_core::{QueryPipeline, RetrievalService, VectorIndex};

#[derive(Parser)]
#[command(
    name = "sopindex",
    about = "Find the current revision of SOP documents and answer from them"
)]
struct Args {
    /// Directory holding the index artifacts
    #[arg(long, global = true, env = "SOPINDEX_INDEX_DIR", default_value = config::DEFAULT_INDEX_DIR)]
    index_dir: PathBuf,

    /// Provider API key
    #[arg(long, global = true, env = config::API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, global = true, env = "OPENAI_BASE_URL", default_value = config::DEFAULT_PROVIDER_BASE_URL)]
    base_url: String,

    /// Embedding model (must match the model the index was built with)
    #[arg(long, global = true, default_value = config::DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Chat model used to write answers
    #[arg(long, global = true, default_value = config::DEFAULT_CHAT_MODEL)]
    chat_model: String,

    /// Provider request timeout in seconds
    #[arg(long, global = true, default_value_t = config::PROVIDER_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the index from a directory of SOP .md files
    Build {
        #[arg(long, default_value = config::DEFAULT_SOURCE_DIR)]
        source_dir: PathBuf,
    },
    /// Show the most similar SOP records, without version resolution
    Search {
        query: String,
        #[arg(long, default_value_t = config::DEFAULT_SEARCH_K)]
        top_k: usize,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Retrieve, keep the latest revision of each SOP, and generate an answer
    Ask {
        query: String,
        /// Candidates retrieved before version resolution
        #[arg(long, default_value_t = config::DEFAULT_CANDIDATE_K)]
        top_k: usize,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref())?)
        .init();

    let args = Args::parse();

    let client = Arc::new(OpenAiClient::new(
        args.api_key.as_deref(),
        &args.base_url,
        Duration::from_secs(args.timeout_secs),
    )?);
    let embedder = Arc::new(OpenAiEmbedder::new(client.clone(), &args.embedding_model));

    match args.command {
        Command::Build { source_dir } => {
            tracing::info!("Building index from {:?} into {:?}", source_dir, args.index_dir);
            let report = build_index(&source_dir, &args.index_dir, embedder.as_ref())?;
            println!(
                "Indexed {} SOP documents (dimension {}) into {}",
                report.documents,
                report.dimension,
                args.index_dir.display()
            );
        }
        Command::Search { query, top_k, json } => {
            let index = Arc::new(VectorIndex::load(&args.index_dir)?);
            let retrieval = RetrievalService::new(index, embedder);
            let results = retrieval.retrieve(&query, top_k)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!("Top {} results:", results.len());
                print!("{}", render_evidence(&results));
            }
        }
        Command::Ask { query, top_k, json } => {
            let index = Arc::new(VectorIndex::load(&args.index_dir)?);
            let generator = Arc::new(OpenAiGenerator::new(client, &args.chat_model));
            let pipeline = QueryPipeline::new(RetrievalService::new(index, embedder), generator)
                .with_candidate_k(top_k);
            let answer = pipeline.answer(&query)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                print!("{}", render_answer(&answer));
            }
        }
    }

    Ok(())
}
