use std::sync::Arc;

use docqa_core::{HashEmbedder, QaPipeline};
use docqa_server::{AppState, ServerConfig, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let host = std::env::var("DOCQA_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("DOCQA_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(7878);
    let corpus = std::env::var("DOCQA_CORPUS").unwrap_or_else(|_| "./docs".to_string());
    let index_path = std::env::var("DOCQA_INDEX").unwrap_or_else(|_| "./index".to_string());

    let pipeline = QaPipeline::builder()
        .embedding_provider(Arc::new(HashEmbedder::default()))
        .build()?;
    let index = pipeline.ensure_index(&corpus, &index_path).await?;

    let state = AppState {
        pipeline: Arc::new(pipeline),
        index: Arc::new(index),
    };
    run_server(ServerConfig { host, port }, state).await
}
