//! Second-stage ranking of retrieved candidates.
//!
//! [`LlmReranker`] asks a [`ReasoningService`] to order the candidates and trusts that
//! order as-is: no secondary scoring, no backfill of candidates the service left out.
//! When the service fails or its reply is unusable the [`RerankFallback`] policy decides
//! between retrieval order and an error.

mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod prompt;
pub mod reasoner;


pub use error::RerankError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockReasoner;
pub use prompt::{RerankPrompt, parse_ranking};
pub use reasoner::GenaiReasoner;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, warn};

use crate::retriever::Candidate;

/// A candidate with its final 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub rank: usize,
    pub candidate: Candidate,
}

/// Orders candidates for a query and keeps at most `top_k`.
///
/// Implementations return only items drawn from `candidates`, each at most once.
pub trait Reranker: Send + Sync {
    fn rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        top_k: usize,
    ) -> impl Future<Output = Result<Vec<Recommendation>, RerankError>> + Send;
}

/// Produces a free-text reply to a ranking prompt.
pub trait ReasoningService: Send + Sync {
    fn complete(
        &self,
        prompt: &RerankPrompt,
    ) -> impl Future<Output = Result<String, RerankError>> + Send;
}

/// What [`LlmReranker`] does when the reasoning service cannot produce a ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RerankFallback {
    /// Keep the first `top_k` candidates in retrieval order.
    #[default]
    RetrievalOrder,
    /// Propagate the error.
    Fail,
}

impl fmt::Display for RerankFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RerankFallback::RetrievalOrder => f.write_str("retrieval-order"),
            RerankFallback::Fail => f.write_str("fail"),
        }
    }
}

impl FromStr for RerankFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retrieval-order" | "retrieval_order" | "passthrough" => {
                Ok(RerankFallback::RetrievalOrder)
            }
            "fail" | "error" => Ok(RerankFallback::Fail),
            other => Err(format!(
                "unknown rerank fallback '{other}' (expected 'retrieval-order' or 'fail')"
            )),
        }
    }
}

fn ranked(candidates: impl IntoIterator<Item = Candidate>) -> Vec<Recommendation> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| Recommendation {
            rank: i + 1,
            candidate,
        })
        .collect()
}

/// Keeps retrieval order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughReranker;

impl Reranker for PassthroughReranker {
    async fn rerank(
        &self,
        _query: &str,
        candidates: Vec<Candidate>,
        top_k: usize,
    ) -> Result<Vec<Recommendation>, RerankError> {
        Ok(ranked(candidates.into_iter().take(top_k)))
    }
}

/// Reranks through a reasoning service.
#[derive(Debug)]
pub struct LlmReranker<S> {
    service: S,
    fallback: RerankFallback,
}

impl<S: ReasoningService> LlmReranker<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            fallback: RerankFallback::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: RerankFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> RerankFallback {
        self.fallback
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    async fn ranking(
        &self,
        query: &str,
        candidates: &[Candidate],
        top_k: usize,
    ) -> Result<Vec<usize>, RerankError> {
        let prompt = RerankPrompt::new(query, candidates, top_k);
        let reply = self.service.complete(&prompt).await?;

        match parse_ranking(&reply, candidates.len()) {
            Some(indices) if !indices.is_empty() => Ok(indices),
            Some(_) => Err(RerankError::UnusableReply {
                reason: "ranking holds no valid candidate index".to_string(),
            }),
            None => Err(RerankError::UnusableReply {
                reason: "no JSON ranking found in reply".to_string(),
            }),
        }
    }
}

impl<S: ReasoningService> Reranker for LlmReranker<S> {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        top_k: usize,
    ) -> Result<Vec<Recommendation>, RerankError> {
        if candidates.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        match self.ranking(query, &candidates, top_k).await {
            Ok(indices) => {
                debug!(
                    candidates = candidates.len(),
                    ranked = indices.len(),
                    top_k,
                    "Reranked candidates"
                );
                let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
                Ok(ranked(
                    indices
                        .into_iter()
                        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
                        .take(top_k),
                ))
            }
            Err(e) => match self.fallback {
                RerankFallback::RetrievalOrder => {
                    warn!(error = %e, top_k, "Reranking failed; keeping retrieval order");
                    Ok(ranked(candidates.into_iter().take(top_k)))
                }
                RerankFallback::Fail => Err(e),
            },
        }
    }
}

/// Runtime-selected reranker used by the binary.
#[derive(Debug)]
pub enum RerankerBackend {
    Passthrough(PassthroughReranker),
    Llm(LlmReranker<GenaiReasoner>),
}

impl Reranker for RerankerBackend {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        top_k: usize,
    ) -> Result<Vec<Recommendation>, RerankError> {
        match self {
            RerankerBackend::Passthrough(r) => r.rerank(query, candidates, top_k).await,
            RerankerBackend::Llm(r) => r.rerank(query, candidates, top_k).await,
        }
    }
}
