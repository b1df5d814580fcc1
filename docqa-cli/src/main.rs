use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;

use docqa_core::{Answer, EmbeddingProvider, HashEmbedder, QaPipeline, VectorIndex};
use docqa_server::{AppState, NO_RESULTS_MESSAGE, ServerConfig, run_server};

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about a directory of documents", version)]
struct Cli {
    /// Directory of PDF, text, and Markdown files to index
    #[arg(long, global = true, default_value = "./docs")]
    corpus: PathBuf,

    /// Directory the vector index is stored in
    #[arg(long, global = true, default_value = "./index")]
    index: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the index if it does not already exist
    Index {
        /// Delete any existing index and build from scratch
        #[arg(long)]
        rebuild: bool,
    },
    /// Answer a single question and exit
    Ask {
        /// The question to answer
        question: String,
    },
    /// Interactive question loop
    Query,
    /// Serve the chat UI and JSON API over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 7878)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let pipeline = QaPipeline::builder().embedding_provider(select_provider()?).build()?;

    match cli.command {
        Command::Index { rebuild } => {
            if rebuild && cli.index.exists() {
                std::fs::remove_dir_all(&cli.index)
                    .with_context(|| format!("failed to remove {}", cli.index.display()))?;
            }
            let index = pipeline.ensure_index(&cli.corpus, &cli.index).await?;
            println!("Indexed {} chunks at {}", index.len(), cli.index.display());
        }
        Command::Ask { question } => {
            let index = pipeline.ensure_index(&cli.corpus, &cli.index).await?;
            let answer = pipeline.answer(&question, &index).await?;
            print_answer(&answer);
        }
        Command::Query => {
            let index = pipeline.ensure_index(&cli.corpus, &cli.index).await?;
            run_repl(&pipeline, &index).await?;
        }
        Command::Serve { host, port } => {
            let index = pipeline.ensure_index(&cli.corpus, &cli.index).await?;
            let state = AppState { pipeline: Arc::new(pipeline), index: Arc::new(index) };
            run_server(ServerConfig { host, port }, state).await?;
        }
    }
    Ok(())
}

/// Use the OpenAI provider when compiled in and configured, otherwise the
/// offline hash embedder.
fn select_provider() -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    #[cfg(feature = "openai")]
    if std::env::var("OPENAI_API_KEY").is_ok() {
        let provider = docqa_core::OpenAIEmbeddingProvider::from_env()?;
        return Ok(Arc::new(provider));
    }
    Ok(Arc::new(HashEmbedder::default()))
}

async fn run_repl(pipeline: &QaPipeline, index: &VectorIndex) -> anyhow::Result<()> {
    let mut editor = rustyline::DefaultEditor::new()?;
    println!("Ask about the indexed documents. Type 'exit' to quit.");
    loop {
        match editor.readline("question> ") {
            Ok(line) => {
                let question = line.trim();
                if question.is_empty() {
                    continue;
                }
                if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
                    break;
                }
                let _ = editor.add_history_entry(question);
                match pipeline.answer(question, index).await {
                    Ok(answer) => print_answer(&answer),
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn print_answer(answer: &Answer) {
    if answer.is_empty() {
        println!("{NO_RESULTS_MESSAGE}");
        return;
    }
    for point in &answer.points {
        println!("{}. {}", point.ordinal, point.text);
        println!("   Source: {}, page {}", point.source, point.page);
    }
}
