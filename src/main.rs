//! Recommender HTTP server entrypoint.
//!
//! Flags:
//! - `--health-check`: check a running server and exit 0/1
//! - `--rebuild`: rebuild the index from the catalog before serving
//! - `--evaluate <labelled.csv> [--k N]`: print recall@k / MAP@k as JSON and exit
//! - `--predict <queries.csv> [--output <file>] [--k N]`: write a predictions CSV and exit

use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use recommender::config::Config;
use recommender::embedding::{Embedder, EmbedderBackend, HttpEmbedder, StubEmbedder};
use recommender::evaluation::{
    evaluate, load_labelled_queries, load_queries, predict, write_predictions,
};
use recommender::gateway::{AppState, create_router_with_state};
use recommender::index::IndexHandle;
use recommender::indexer::Indexer;
use recommender::pipeline::{QueryLimits, RecommendationPipeline};
use recommender::rerank::{GenaiReasoner, LlmReranker, PassthroughReranker, RerankerBackend};
use recommender::retriever::Retriever;
use recommender::vectordb::QdrantClient;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_PREDICTIONS_PATH: &str = "predictions.csv";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if has_flag(&args, "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        collection = %config.collection,
        "Recommender starting"
    );

    let db = Arc::new(QdrantClient::new(&config.qdrant_url)?);
    db.health_check()
        .await
        .with_context(|| format!("Qdrant is not reachable at {}", config.qdrant_url))?;

    let embedder = Arc::new(build_embedder(&config)?);

    let opened = IndexHandle::open(db.clone(), &config.collection, embedder.identity()).await;
    let index = match opened {
        Ok(index) => index,
        Err(e) => {
            tracing::error!(error = %e, "Cannot open the published index generation");
            IndexHandle::new(db.clone(), &config.collection)
        }
    };
    let index = Arc::new(index);

    let indexer = Arc::new(
        Indexer::new(index.clone(), embedder.clone()).with_batch_size(config.embed_batch_size),
    );

    if has_flag(&args, "--rebuild") || (!index.is_ready() && config.catalog_path.exists()) {
        let report = indexer.rebuild(&config.catalog_path).await?;
        tracing::info!(
            collection = %report.collection,
            documents = report.documents,
            rejected = report.rejected.len(),
            "Index ready"
        );
    } else if !index.is_ready() {
        tracing::warn!(
            catalog = %config.catalog_path.display(),
            "No index generation and no catalog; serving 503 until POST /admin/rebuild"
        );
    }

    let retriever =
        Retriever::new(index, embedder).with_cache_capacity(config.query_cache_capacity);
    let pipeline = Arc::new(
        RecommendationPipeline::new(retriever, build_reranker(&config)?)
            .with_limits(QueryLimits::from(&config)),
    );

    let k = flag_value(&args, "--k")
        .map(|v| v.parse::<usize>())
        .transpose()
        .context("--k must be a positive integer")?
        .unwrap_or(config.top_k);

    if let Some(path) = flag_value(&args, "--evaluate") {
        let labelled = load_labelled_queries(File::open(&path)?)?;
        let report = evaluate(&pipeline, &labelled, k).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(path) = flag_value(&args, "--predict") {
        let output = flag_value(&args, "--output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PREDICTIONS_PATH));
        let queries = load_queries(File::open(&path)?)?;
        let rows = predict(&pipeline, &queries, k).await?;
        write_predictions(&rows, File::create(&output)?)?;
        tracing::info!(rows = rows.len(), output = %output.display(), "Predictions written");
        return Ok(());
    }

    let state = AppState::new(pipeline, indexer, config.catalog_path.clone());
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Recommender shutdown complete");
    Ok(())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn build_embedder(config: &Config) -> anyhow::Result<EmbedderBackend> {
    let identity = config.embedding_identity();
    match &config.embedding_url {
        Some(url) => Ok(EmbedderBackend::Http(HttpEmbedder::new(
            url.clone(),
            identity,
            config.embedding_api_key.clone(),
            config.retry_policy(),
        )?)),
        None => {
            tracing::warn!(
                "No RECOMMENDER_EMBEDDING_URL configured, running embedder in stub mode"
            );
            Ok(EmbedderBackend::Stub(StubEmbedder::new(identity)))
        }
    }
}

fn build_reranker(config: &Config) -> anyhow::Result<RerankerBackend> {
    match &config.rerank_model {
        Some(model) => {
            let reasoner = GenaiReasoner::new(model.clone(), config.retry_policy())?;
            tracing::info!(
                model = %reasoner.model(),
                fallback = %config.rerank_fallback,
                "LLM reranking enabled"
            );
            Ok(RerankerBackend::Llm(
                LlmReranker::new(reasoner).with_fallback(config.rerank_fallback),
            ))
        }
        None => {
            tracing::warn!("No RECOMMENDER_RERANK_MODEL configured, keeping retrieval order");
            Ok(RerankerBackend::Passthrough(PassthroughReranker))
        }
    }
}

async fn run_health_check() -> i32 {
    let port = std::env::var("RECOMMENDER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8001);

    let url = format!("http://127.0.0.1:{}/health", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
