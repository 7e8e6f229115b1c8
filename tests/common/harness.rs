//! Test server harness.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use recommender::gateway::{AppState, create_router_with_state};
use recommender::{
    IndexHandle, Indexer, LlmReranker, MockEmbedder, MockReasoner, MockVectorDbClient,
    RecommendationPipeline, RerankFallback, Retriever,
};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::fixtures::{KEYWORDS, XYZ_CSV, write_catalog};

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;
const TEST_ALIAS: &str = "assessments_test";

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    /// Catalog written for the server; `None` leaves the catalog path missing.
    pub catalog_csv: Option<String>,
    /// Build a generation before serving.
    pub prebuild: bool,
    pub fallback: RerankFallback,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            catalog_csv: Some(XYZ_CSV.to_string()),
            prebuild: true,
            fallback: RerankFallback::RetrievalOrder,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub db: Arc<MockVectorDbClient>,
    pub catalog_path: PathBuf,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: TempDir,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => tokio::time::sleep(interval).await,
        }
    }
}

/// Spawns a server with every external dependency mocked: in-memory vector store,
/// keyword embedder and an echo reasoning service.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let temp_dir = TempDir::new()?;
    let catalog_path = match &config.catalog_csv {
        Some(csv) => write_catalog(temp_dir.path(), "assessments.csv", csv),
        None => temp_dir.path().join("missing.csv"),
    };

    let db = Arc::new(MockVectorDbClient::new());
    let embedder = Arc::new(MockEmbedder::with_keywords(&KEYWORDS));
    let index = Arc::new(IndexHandle::new(db.clone(), TEST_ALIAS));
    let indexer = Arc::new(Indexer::new(index.clone(), embedder.clone()));

    if config.prebuild {
        indexer
            .rebuild(&catalog_path)
            .await
            .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    }

    let reranker = LlmReranker::new(MockReasoner::echo()).with_fallback(config.fallback);
    let pipeline = Arc::new(RecommendationPipeline::new(
        Retriever::new(index, embedder),
        reranker,
    ));

    let app = create_router_with_state(AppState::new(pipeline, indexer, catalog_path.clone()));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        db,
        catalog_path,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir: temp_dir,
    })
}
