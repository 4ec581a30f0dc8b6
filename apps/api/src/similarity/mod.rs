//! Semantic similarity collaborator: text embeddings plus an in-process
//! vector index used to surface comparable candidates.
//!
//! The pipeline only depends on the `SimilarityOracle` trait. `IndexedOracle`
//! is the bundled implementation; tests swap in fakes.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub mod embedder;

pub use embedder::{Embedder, HashingEmbedder, HttpEmbedder};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding service returned no vectors")]
    EmptyResponse,

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    JobDescription,
}

/// Metadata stored alongside each indexed vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub kind: DocumentKind,
    pub owner_id: Uuid,
    /// Candidate name for résumés, title for job descriptions.
    pub label: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub metadata: DocumentMetadata,
    pub score: f64,
}

/// Embedding and vector-search contract used by the similarity stage.
#[async_trait]
pub trait SimilarityOracle: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError>;

    /// Cosine similarity clamped to [0, 1].
    fn similarity(&self, a: &[f32], b: &[f32]) -> f64 {
        cosine_similarity(a, b)
    }

    /// Adds or replaces the vector stored under `doc_id`.
    async fn index(
        &self,
        doc_id: &str,
        embedding: Vec<f32>,
        metadata: DocumentMetadata,
    ) -> Result<(), OracleError>;

    /// Up to `k` hits, highest score first.
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, OracleError>;
}

/// Cosine similarity clamped to [0, 1]. Empty, mismatched or zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

struct IndexedVector {
    doc_id: String,
    embedding: Vec<f32>,
    metadata: DocumentMetadata,
}

/// Embedder plus an in-memory vector index. Writes take the lock
/// exclusively, so concurrent runs never interleave index updates.
pub struct IndexedOracle {
    embedder: Arc<dyn Embedder>,
    vectors: RwLock<Vec<IndexedVector>>,
}

impl IndexedOracle {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            vectors: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SimilarityOracle for IndexedOracle {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        self.embedder.embed(text).await
    }

    async fn index(
        &self,
        doc_id: &str,
        embedding: Vec<f32>,
        metadata: DocumentMetadata,
    ) -> Result<(), OracleError> {
        let mut vectors = self.vectors.write().await;
        match vectors.iter_mut().find(|v| v.doc_id == doc_id) {
            Some(existing) => {
                existing.embedding = embedding;
                existing.metadata = metadata;
            }
            None => vectors.push(IndexedVector {
                doc_id: doc_id.to_string(),
                embedding,
                metadata,
            }),
        }
        debug!("Indexed {doc_id} ({} vectors total)", vectors.len());
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, OracleError> {
        let vectors = self.vectors.read().await;
        let mut hits: Vec<SearchHit> = vectors
            .iter()
            .map(|v| SearchHit {
                doc_id: v.doc_id.clone(),
                metadata: v.metadata.clone(),
                score: cosine_similarity(query, &v.embedding),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        Ok(hits)
    }
}
