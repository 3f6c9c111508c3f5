// Vector store: embeds chunks and keeps them in a named collection

pub mod memory;
pub mod qdrant;


use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::QdrantConfig;
use crate::llm::Embedder;
use crate::processor::{Chunk, ChunkMetadata};
use crate::{RagError, Result};

pub use memory::MemoryBackend;
pub use qdrant::{
    CollectionInfo, Distance, Payload, PointStruct, QdrantClient, ScoredPoint, VectorParams,
};

/// Number of chunks retrieved per question unless configured otherwise
pub const DEFAULT_TOP_K: usize = 4;

/// Points sent per upsert request
const UPSERT_BATCH_SIZE: usize = 64;

const CONTENT_KEY: &str = "page_content";
const METADATA_KEY: &str = "metadata";
const INGESTED_AT_KEY: &str = "ingested_at";

/// Collection-level operations of a vector database
pub trait CollectionBackend: Send + Sync {
    /// `Ok(None)` only when the collection does not exist
    fn describe_collection(&self, name: &str) -> Result<Option<CollectionInfo>>;

    fn create_collection(&self, name: &str, params: &VectorParams) -> Result<()>;

    /// Deleting a collection that does not exist succeeds
    fn delete_collection(&self, name: &str) -> Result<()>;

    fn upsert_points(&self, name: &str, points: &[PointStruct]) -> Result<()>;

    fn search_points(&self, name: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>>;

    fn count_points(&self, name: &str) -> Result<u64>;
}

pub struct VectorStore {
    backend: Arc<dyn CollectionBackend>,
    embedder: Arc<dyn Embedder>,
    collection_name: String,
    params: VectorParams,
}

impl std::fmt::Debug for VectorStore {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("collection_name", &self.collection_name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl VectorStore {
    /// Open `collection_name`, creating it with `params` if it does not exist
    #[inline]
    pub fn new(
        backend: Arc<dyn CollectionBackend>,
        embedder: Arc<dyn Embedder>,
        collection_name: impl Into<String>,
        params: VectorParams,
    ) -> Result<Self> {
        let store = Self {
            backend,
            embedder,
            collection_name: collection_name.into(),
            params,
        };

        store.ensure_collection()?;
        Ok(store)
    }

    /// Connect to Qdrant and open the configured cosine collection
    #[inline]
    pub fn from_config(config: &QdrantConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let backend = Arc::new(QdrantClient::new(config)?);
        Self::new(
            backend,
            embedder,
            config.collection.clone(),
            VectorParams::cosine(config.vector_size),
        )
    }

    #[inline]
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    #[inline]
    pub fn vector_params(&self) -> VectorParams {
        self.params
    }

    fn ensure_collection(&self) -> Result<()> {
        let Some(info) = self.backend.describe_collection(&self.collection_name)? else {
            info!(
                "Collection {} not found, creating it with {} dimensions",
                self.collection_name, self.params.size
            );
            return self
                .backend
                .create_collection(&self.collection_name, &self.params);
        };

        let existing = info.vector_params();
        if existing.size != self.params.size {
            return Err(RagError::DimensionMismatch {
                expected: existing.size,
                actual: self.params.size,
            });
        }
        if existing.distance != self.params.distance {
            return Err(RagError::VectorStore(format!(
                "Collection {} uses {:?} distance, expected {:?}",
                self.collection_name, existing.distance, self.params.distance
            )));
        }

        debug!(
            "Using existing collection {} ({} points)",
            self.collection_name,
            info.points_count.unwrap_or_default()
        );
        Ok(())
    }

    /// Embed and store chunks, returning how many points were written.
    /// Every embedding is checked before the first point is sent.
    #[inline]
    pub fn add_documents(&self, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts)?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::VectorStore(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        for embedding in &embeddings {
            self.check_dimension(embedding)?;
        }

        let ingested_at = Utc::now().to_rfc3339();
        let points = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, vector)| Ok(PointStruct::new(vector, chunk_payload(chunk, &ingested_at)?)))
            .collect::<Result<Vec<_>>>()?;

        for batch in points.chunks(UPSERT_BATCH_SIZE) {
            self.backend.upsert_points(&self.collection_name, batch)?;
        }

        info!(
            "Added {} chunks to collection {}",
            points.len(),
            self.collection_name
        );
        Ok(points.len())
    }

    /// The `k` chunks closest to `query`
    #[inline]
    pub fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
        Ok(self
            .similarity_search_with_score(query, k)?
            .into_iter()
            .map(|(chunk, _)| chunk)
            .collect())
    }

    /// The `k` chunks closest to `query`, best first, with their similarity scores
    #[inline]
    pub fn similarity_search_with_score(&self, query: &str, k: usize) -> Result<Vec<(Chunk, f32)>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed_query(query)?;
        self.check_dimension(&vector)?;

        let points = self
            .backend
            .search_points(&self.collection_name, &vector, k)?;
        debug!("Retrieved {} chunks for query", points.len());

        points
            .into_iter()
            .map(|point| Ok((chunk_from_point(&point)?, point.score)))
            .collect()
    }

    /// Drop every stored chunk by recreating the collection
    #[inline]
    pub fn clear_collection(&self) -> Result<()> {
        self.backend.delete_collection(&self.collection_name)?;
        self.backend
            .create_collection(&self.collection_name, &self.params)?;
        info!("Cleared collection {}", self.collection_name);
        Ok(())
    }

    #[inline]
    pub fn count(&self) -> Result<u64> {
        self.backend.count_points(&self.collection_name)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() == self.params.size {
            Ok(())
        } else {
            Err(RagError::DimensionMismatch {
                expected: self.params.size,
                actual: vector.len(),
            })
        }
    }
}

fn chunk_payload(chunk: &Chunk, ingested_at: &str) -> Result<Payload> {
    let metadata = serde_json::to_value(&chunk.metadata)
        .map_err(|e| RagError::VectorStore(format!("Failed to serialize metadata: {}", e)))?;

    let mut payload = Payload::new();
    payload.insert(CONTENT_KEY.to_string(), Value::String(chunk.content.clone()));
    payload.insert(METADATA_KEY.to_string(), metadata);
    payload.insert(
        INGESTED_AT_KEY.to_string(),
        Value::String(ingested_at.to_string()),
    );
    Ok(payload)
}

fn chunk_from_point(point: &ScoredPoint) -> Result<Chunk> {
    let payload = point
        .payload
        .as_ref()
        .ok_or_else(|| RagError::VectorStore(format!("Point {} has no payload", point.id)))?;

    let content = payload
        .get(CONTENT_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            RagError::VectorStore(format!("Point {} has no {}", point.id, CONTENT_KEY))
        })?
        .to_string();

    let metadata_value = payload.get(METADATA_KEY).cloned().unwrap_or(Value::Null);
    let metadata: ChunkMetadata = serde_json::from_value(metadata_value).map_err(|e| {
        RagError::VectorStore(format!("Point {} has invalid metadata: {}", point.id, e))
    })?;

    Ok(Chunk { content, metadata })
}
