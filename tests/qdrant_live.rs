//! Tests against a running Qdrant (`RECOMMENDER_QDRANT_URL`, default `http://localhost:6334`).
//!
//! Run with `cargo test --test qdrant_live -- --ignored`.

mod common;

use std::sync::Arc;

use common::fixtures::{KEYWORDS, generated, xyz};
use recommender::config::DEFAULT_QDRANT_URL;
use recommender::{
    Embedder, IndexHandle, Indexer, LlmReranker, MockEmbedder, MockReasoner, QdrantClient,
    QueryOptions, RecommendationPipeline, Retriever,
};
use serial_test::serial;

fn qdrant_url() -> String {
    std::env::var("RECOMMENDER_QDRANT_URL").unwrap_or_else(|_| DEFAULT_QDRANT_URL.to_string())
}

fn unique_alias() -> String {
    format!("live_test_{}", uuid::Uuid::new_v4().simple())
}

async fn connect() -> Arc<QdrantClient> {
    let client = QdrantClient::new(&qdrant_url()).expect("Failed to build Qdrant client");
    client.health_check().await.expect("Qdrant is not reachable");
    Arc::new(client)
}

async fn cleanup(db: &QdrantClient, alias: &str) {
    for name in db.list_collections().await.unwrap_or_default() {
        if name.starts_with(alias) {
            let _ = db.delete_collection(&name).await;
        }
    }
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_live_rebuild_and_query() {
    let db = connect().await;
    let alias = unique_alias();
    let embedder = Arc::new(MockEmbedder::with_keywords(&KEYWORDS));
    let index = Arc::new(IndexHandle::new(db.clone(), alias.clone()));
    let indexer = Indexer::new(index.clone(), embedder.clone());

    let report = indexer.rebuild_from(&xyz()).await.expect("Rebuild failed");
    assert_eq!(report.documents, 3);
    assert_eq!(db.count_points(&report.collection).await.unwrap(), 3);
    assert_eq!(
        db.resolve_alias(&alias).await.unwrap().as_deref(),
        Some(report.collection.as_str())
    );

    let pipeline = RecommendationPipeline::new(
        Retriever::new(index, embedder),
        LlmReranker::new(MockReasoner::echo()),
    );
    let results = pipeline
        .recommend(
            "java teamwork",
            QueryOptions {
                candidates: Some(2),
                top_k: Some(2),
            },
        )
        .await
        .expect("Query failed");

    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["https://example.com/x-java", "https://example.com/y-team"]
    );

    cleanup(&db, &alias).await;
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_live_rebuild_retires_previous_generation() {
    let db = connect().await;
    let alias = unique_alias();
    let embedder = Arc::new(MockEmbedder::with_keywords(&KEYWORDS));
    let index = Arc::new(IndexHandle::new(db.clone(), alias.clone()));
    let indexer = Indexer::new(index.clone(), embedder.clone());

    let first = indexer.rebuild_from(&generated("alpha", 4)).await.unwrap();
    let second = indexer.rebuild_from(&generated("beta", 5)).await.unwrap();

    assert_eq!(second.retired.as_deref(), Some(first.collection.as_str()));
    assert!(!db.collection_exists(&first.collection).await.unwrap());
    assert_eq!(db.count_points(&second.collection).await.unwrap(), 5);

    let reopened = IndexHandle::open(db.clone(), &alias, embedder.identity())
        .await
        .expect("Reopen failed");
    assert_eq!(
        reopened.current().map(|g| g.collection.clone()),
        Some(second.collection.clone())
    );

    cleanup(&db, &alias).await;
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_live_alias_swaps_between_collections() {
    let db = connect().await;
    let alias = unique_alias();
    let first = format!("{alias}__first");
    let second = format!("{alias}__second");
    db.create_collection(&first, 4).await.unwrap();
    db.create_collection(&second, 4).await.unwrap();

    db.swap_alias(&alias, &first).await.expect("First swap failed");
    assert_eq!(
        db.resolve_alias(&alias).await.unwrap().as_deref(),
        Some(first.as_str())
    );

    db.swap_alias(&alias, &second).await.expect("Second swap failed");
    assert_eq!(
        db.resolve_alias(&alias).await.unwrap().as_deref(),
        Some(second.as_str())
    );

    db.swap_alias(&alias, &first).await.expect("Swap back failed");
    assert_eq!(
        db.resolve_alias(&alias).await.unwrap().as_deref(),
        Some(first.as_str())
    );

    cleanup(&db, &alias).await;
}
