// In-process collection backend with brute-force scoring

#[cfg(test)]
mod tests;

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::{
    CollectionBackend, CollectionInfo, Distance, PointStruct, ScoredPoint, VectorParams,
    qdrant::{CollectionConfig, CollectionParams},
};
use crate::{RagError, Result};

#[derive(Debug)]
struct MemoryCollection {
    params: VectorParams,
    points: Vec<PointStruct>,
}

/// Keeps collections in memory; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemoryBackend {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn collection_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, MemoryCollection>>> {
        self.collections
            .read()
            .map_err(|_| RagError::VectorStore("Collection lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, MemoryCollection>>> {
        self.collections
            .write()
            .map_err(|_| RagError::VectorStore("Collection lock poisoned".to_string()))
    }
}

fn missing(name: &str) -> RagError {
    RagError::VectorStore(format!("Collection {} does not exist", name))
}

/// Higher is better for every metric, as in Qdrant search results
fn score(distance: Distance, a: &[f32], b: &[f32]) -> f32 {
    match distance {
        Distance::Cosine => cosine_similarity(a, b),
        Distance::Dot => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        Distance::Euclid => -a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
        Distance::Manhattan => -a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f32>(),
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

impl CollectionBackend for MemoryBackend {
    #[inline]
    fn describe_collection(&self, name: &str) -> Result<Option<CollectionInfo>> {
        Ok(self.read()?.get(name).map(|collection| CollectionInfo {
            status: Some("green".to_string()),
            points_count: Some(collection.points.len() as u64),
            config: CollectionConfig {
                params: CollectionParams {
                    vectors: collection.params,
                },
            },
        }))
    }

    #[inline]
    fn create_collection(&self, name: &str, params: &VectorParams) -> Result<()> {
        let mut collections = self.write()?;
        if collections.contains_key(name) {
            return Err(RagError::VectorStore(format!(
                "Collection {} already exists",
                name
            )));
        }

        collections.insert(
            name.to_string(),
            MemoryCollection {
                params: *params,
                points: Vec::new(),
            },
        );
        debug!("Created in-memory collection {}", name);
        Ok(())
    }

    #[inline]
    fn delete_collection(&self, name: &str) -> Result<()> {
        self.write()?.remove(name);
        Ok(())
    }

    #[inline]
    fn upsert_points(&self, name: &str, points: &[PointStruct]) -> Result<()> {
        let mut collections = self.write()?;
        let collection = collections.get_mut(name).ok_or_else(|| missing(name))?;

        if let Some(point) = points
            .iter()
            .find(|point| point.vector.len() != collection.params.size)
        {
            return Err(RagError::DimensionMismatch {
                expected: collection.params.size,
                actual: point.vector.len(),
            });
        }

        for point in points {
            match collection.points.iter_mut().find(|p| p.id == point.id) {
                Some(existing) => *existing = point.clone(),
                None => collection.points.push(point.clone()),
            }
        }
        Ok(())
    }

    #[inline]
    fn search_points(&self, name: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>> {
        let collections = self.read()?;
        let collection = collections.get(name).ok_or_else(|| missing(name))?;

        let mut scored: Vec<ScoredPoint> = collection
            .points
            .iter()
            .map(|point| ScoredPoint {
                id: Value::String(point.id.to_string()),
                score: score(collection.params.distance, vector, &point.vector),
                payload: Some(point.payload.clone()),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }

    #[inline]
    fn count_points(&self, name: &str) -> Result<u64> {
        let collections = self.read()?;
        let collection = collections.get(name).ok_or_else(|| missing(name))?;
        Ok(collection.points.len() as u64)
    }
}
