//! Offline evaluation against labelled queries.
//!
//! Labelled and prediction files share one CSV layout: a `Query` column and an
//! `Assessment_url` column, one row per (query, assessment) pair. URLs are compared
//! case-insensitively and without trailing slashes.


use std::collections::HashSet;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::embedding::Embedder;
use crate::error::RecommenderError;
use crate::pipeline::{QueryOptions, RecommendationPipeline};
use crate::rerank::Reranker;
use crate::vectordb::VectorDbClient;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("invalid evaluation CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write predictions: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Recommender(#[from] RecommenderError),
}

/// One row of a labelled or prediction file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRow {
    #[serde(rename = "Query")]
    pub query: String,
    #[serde(rename = "Assessment_url")]
    pub assessment_url: String,
}

/// A query with its relevant assessment URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledQuery {
    pub query: String,
    pub relevant: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryEvaluation {
    pub query: String,
    pub predicted: Vec<String>,
    pub recall: f64,
    pub average_precision: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub k: usize,
    pub queries: Vec<QueryEvaluation>,
    pub mean_recall: f64,
    pub map: f64,
}

/// Comparison key for an assessment URL.
pub fn url_key(url: &str) -> String {
    url.trim().trim_end_matches('/').to_lowercase()
}

fn relevant_set(relevant: &[String]) -> HashSet<String> {
    relevant.iter().map(|u| url_key(u)).collect()
}

/// Share of the relevant URLs found in the first `k` predictions.
pub fn recall_at_k(predicted: &[String], relevant: &[String], k: usize) -> f64 {
    let relevant = relevant_set(relevant);
    if relevant.is_empty() || k == 0 {
        return 0.0;
    }

    let hits: HashSet<String> = predicted
        .iter()
        .take(k)
        .map(|u| url_key(u))
        .filter(|u| relevant.contains(u))
        .collect();
    hits.len() as f64 / relevant.len() as f64
}

/// Average of precision@i over the ranks `i <= k` holding a relevant URL, divided by
/// `min(k, |relevant|)`. Repeated predictions count once.
pub fn average_precision_at_k(predicted: &[String], relevant: &[String], k: usize) -> f64 {
    let relevant = relevant_set(relevant);
    if relevant.is_empty() || k == 0 {
        return 0.0;
    }

    let mut seen = HashSet::new();
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (i, url) in predicted.iter().take(k).enumerate() {
        let key = url_key(url);
        if relevant.contains(&key) && seen.insert(key) {
            hits += 1;
            sum += hits as f64 / (i + 1) as f64;
        }
    }
    sum / k.min(relevant.len()) as f64
}

/// Groups labelled rows by query, keeping first-seen query order.
pub fn load_labelled_queries<R: Read>(reader: R) -> Result<Vec<LabelledQuery>, EvaluationError> {
    let mut queries: Vec<LabelledQuery> = Vec::new();
    for row in csv::Reader::from_reader(reader).deserialize::<PredictionRow>() {
        let row = row?;
        match queries.iter_mut().find(|q| q.query == row.query) {
            Some(existing) => existing.relevant.push(row.assessment_url),
            None => queries.push(LabelledQuery {
                query: row.query,
                relevant: vec![row.assessment_url],
            }),
        }
    }
    Ok(queries)
}

/// Reads the `Query` column of an unlabelled query file, dropping blanks and repeats.
pub fn load_queries<R: Read>(reader: R) -> Result<Vec<String>, EvaluationError> {
    #[derive(Deserialize)]
    struct QueryRow {
        #[serde(rename = "Query")]
        query: String,
    }

    let mut seen = HashSet::new();
    let mut queries = Vec::new();
    for row in csv::Reader::from_reader(reader).deserialize::<QueryRow>() {
        let query = row?.query;
        if !query.trim().is_empty() && seen.insert(query.clone()) {
            queries.push(query);
        }
    }
    Ok(queries)
}

/// Writes prediction rows as `Query,Assessment_url` CSV.
pub fn write_predictions<W: Write>(
    rows: &[PredictionRow],
    writer: W,
) -> Result<(), EvaluationError> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

async fn predicted_urls<V, E, R>(
    pipeline: &RecommendationPipeline<V, E, R>,
    query: &str,
    k: usize,
) -> Result<Vec<String>, RecommenderError>
where
    V: VectorDbClient,
    E: Embedder,
    R: Reranker,
{
    let limits = pipeline.limits();
    let candidates = limits.candidates.max(k).min(limits.max_candidates);
    // A cutoff past the candidate ceiling scores the whole pool.
    let options = QueryOptions {
        candidates: Some(candidates),
        top_k: Some(k.min(candidates)),
    };
    let records = pipeline.recommend(query, options).await?;
    Ok(records.into_iter().map(|r| r.url).collect())
}

/// Runs every query through `pipeline` and collects the top `k` URLs.
pub async fn predict<V, E, R>(
    pipeline: &RecommendationPipeline<V, E, R>,
    queries: &[String],
    k: usize,
) -> Result<Vec<PredictionRow>, EvaluationError>
where
    V: VectorDbClient,
    E: Embedder,
    R: Reranker,
{
    let mut rows = Vec::new();
    for query in queries {
        for url in predicted_urls(pipeline, query, k).await? {
            rows.push(PredictionRow {
                query: query.clone(),
                assessment_url: url,
            });
        }
    }
    Ok(rows)
}

/// Scores `pipeline` on labelled queries with recall@k and MAP@k.
pub async fn evaluate<V, E, R>(
    pipeline: &RecommendationPipeline<V, E, R>,
    labelled: &[LabelledQuery],
    k: usize,
) -> Result<EvaluationReport, EvaluationError>
where
    V: VectorDbClient,
    E: Embedder,
    R: Reranker,
{
    let mut queries = Vec::with_capacity(labelled.len());
    for item in labelled {
        let predicted = predicted_urls(pipeline, &item.query, k).await?;
        queries.push(QueryEvaluation {
            recall: recall_at_k(&predicted, &item.relevant, k),
            average_precision: average_precision_at_k(&predicted, &item.relevant, k),
            query: item.query.clone(),
            predicted,
        });
    }

    let mean = |f: fn(&QueryEvaluation) -> f64| {
        if queries.is_empty() {
            0.0
        } else {
            queries.iter().map(f).sum::<f64>() / queries.len() as f64
        }
    };
    let mean_recall = mean(|q| q.recall);
    let map = mean(|q| q.average_precision);

    info!(queries = queries.len(), k, mean_recall, map, "Evaluation complete");
    Ok(EvaluationReport {
        k,
        queries,
        mean_recall,
        map,
    })
}
