// Qdrant REST client for a single-vector collection


use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::CollectionBackend;
use crate::config::QdrantConfig;
use crate::service::ServiceAgent;
use crate::{RagError, Result};

const SERVICE_NAME: &str = "Qdrant";

pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Cosine,
    Euclid,
    Dot,
    Manhattan,
}

/// Vector size and metric a collection is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorParams {
    pub size: usize,
    pub distance: Distance,
}

impl VectorParams {
    #[inline]
    pub fn cosine(size: usize) -> Self {
        Self {
            size,
            distance: Distance::Cosine,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub points_count: Option<u64>,
    pub config: CollectionConfig,
}

impl CollectionInfo {
    #[inline]
    pub fn vector_params(&self) -> VectorParams {
        self.config.params.vectors
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionConfig {
    pub params: CollectionParams,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionParams {
    pub vectors: VectorParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointStruct {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

impl PointStruct {
    /// A point with a fresh random id
    #[inline]
    pub fn new(vector: Vec<f32>, payload: Payload) -> Self {
        Self {
            id: Uuid::new_v4(),
            vector,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredPoint {
    /// Qdrant ids are either unsigned integers or UUID strings
    pub id: Value,
    pub score: f32,
    #[serde(default)]
    pub payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct QdrantResponse<T> {
    result: T,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    points: &'a [PointStruct],
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Serialize)]
struct CountRequest {
    exact: bool,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: u64,
}

#[derive(Debug, Clone)]
pub struct QdrantClient {
    agent: ServiceAgent,
}

impl QdrantClient {
    #[inline]
    pub fn new(config: &QdrantConfig) -> Result<Self> {
        let base_url = config
            .url()
            .map_err(|e| RagError::Config(format!("Failed to generate Qdrant URL: {}", e)))?;

        let agent = ServiceAgent::new(SERVICE_NAME, base_url)
            .with_timeout(Duration::from_secs(config.timeout_seconds))
            .with_retry_attempts(config.retry_attempts);

        Ok(Self { agent })
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.agent = self.agent.with_retry_attempts(attempts);
        self
    }

    /// Check that the Qdrant server answers on its root endpoint
    #[inline]
    pub fn ping(&self) -> Result<()> {
        debug!("Pinging Qdrant at {}", self.agent.base_url());
        let _: Value = self.agent.get_json("/")?;
        Ok(())
    }
}

fn collection_path(name: &str) -> String {
    format!("/collections/{}", name)
}

impl CollectionBackend for QdrantClient {
    #[inline]
    fn describe_collection(&self, name: &str) -> Result<Option<CollectionInfo>> {
        match self
            .agent
            .get_json::<QdrantResponse<CollectionInfo>>(&collection_path(name))
        {
            Ok(response) => Ok(Some(response.result)),
            Err(e) if e.is_not_found() => {
                debug!("Collection {} does not exist", name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[inline]
    fn create_collection(&self, name: &str, params: &VectorParams) -> Result<()> {
        let request = CreateCollectionRequest { vectors: *params };
        let _: QdrantResponse<Value> = self.agent.put_json(&collection_path(name), &request)?;
        info!(
            "Created collection {} ({} dimensions, {:?})",
            name, params.size, params.distance
        );
        Ok(())
    }

    #[inline]
    fn delete_collection(&self, name: &str) -> Result<()> {
        match self
            .agent
            .delete_json::<QdrantResponse<Value>>(&collection_path(name))
        {
            Ok(_) => {
                info!("Deleted collection {}", name);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!("Collection {} was already gone", name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[inline]
    fn upsert_points(&self, name: &str, points: &[PointStruct]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let path = format!("{}/points?wait=true", collection_path(name));
        let _: QdrantResponse<Value> = self.agent.put_json(&path, &UpsertRequest { points })?;
        debug!("Upserted {} points into {}", points.len(), name);
        Ok(())
    }

    #[inline]
    fn search_points(&self, name: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>> {
        let path = format!("{}/points/search", collection_path(name));
        let request = SearchRequest {
            vector,
            limit,
            with_payload: true,
        };

        let response: QdrantResponse<Vec<ScoredPoint>> = self.agent.post_json(&path, &request)?;
        debug!("Search in {} returned {} points", name, response.result.len());
        Ok(response.result)
    }

    #[inline]
    fn count_points(&self, name: &str) -> Result<u64> {
        let path = format!("{}/points/count", collection_path(name));
        let response: QdrantResponse<CountResult> =
            self.agent.post_json(&path, &CountRequest { exact: true })?;
        Ok(response.result.count)
    }
}
