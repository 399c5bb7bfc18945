use async_trait::async_trait;
use medisense_models::VectorHit;
use qdrant_client::{
    prelude::*,
    qdrant::{
        point_id::PointIdOptions, value::Kind, vectors_config::Config, CountPoints, CreateCollection,
        Distance, PointId, SearchPoints, Value as QdrantValue, VectorParams, VectorsConfig,
    },
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::{VectorBackend, VectorPoint};
use crate::errors::{VectorResult, VectorStoreError};

/// [`VectorBackend`] over a Qdrant server (gRPC)
pub struct QdrantBackend {
    client: QdrantClient,
    timeout: Duration,
    closed: AtomicBool,
}

impl QdrantBackend {
    pub fn new(url: &str, api_key: Option<String>, timeout_secs: u64) -> VectorResult<Self> {
        tracing::info!("Connecting to Qdrant at: {}", url);

        let mut config = QdrantClient::from_url(url);
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }
        let client = config
            .build()
            .map_err(|e| VectorStoreError::Backend(format!("Failed to create Qdrant client: {}", e)))?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
            closed: AtomicBool::new(false),
        })
    }

    /// Run a client call under the request timeout
    async fn timed<T, E, F>(&self, operation: &'static str, call: F) -> VectorResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        if self.closed.load(Ordering::Acquire) {
            return Err(VectorStoreError::Closed);
        }
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(VectorStoreError::Backend(format!("{} failed: {}", operation, e))),
            Err(_) => Err(VectorStoreError::Timeout(operation)),
        }
    }
}

fn to_qdrant_payload(payload: Map<String, Value>) -> Payload {
    let fields: HashMap<String, QdrantValue> = payload
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => QdrantValue::from(s),
                other => QdrantValue::from(other.to_string()),
            };
            (key, value)
        })
        .collect();
    Payload::new_from_hashmap(fields)
}

fn from_qdrant_payload(payload: HashMap<String, QdrantValue>) -> Map<String, Value> {
    payload
        .into_iter()
        .filter_map(|(key, value)| match value.kind {
            Some(Kind::StringValue(s)) => Some((key, Value::String(s))),
            _ => None,
        })
        .collect()
}

fn numeric_id(id: Option<PointId>) -> Option<u64> {
    match id?.point_id_options? {
        PointIdOptions::Num(n) => Some(n),
        PointIdOptions::Uuid(_) => None,
    }
}

#[async_trait]
impl VectorBackend for QdrantBackend {
    async fn collection_exists(&self, collection: &str) -> VectorResult<bool> {
        let response = self.timed("list_collections", self.client.list_collections()).await?;
        Ok(response.collections.iter().any(|c| c.name == collection))
    }

    async fn create_collection(&self, collection: &str, dimension: usize) -> VectorResult<()> {
        tracing::info!("Creating Qdrant collection: {} (dim: {})", collection, dimension);

        let create_collection = CreateCollection {
            collection_name: collection.to_string(),
            vectors_config: Some(VectorsConfig {
                config: Some(Config::Params(VectorParams {
                    size: dimension as u64,
                    distance: Distance::Cosine.into(),
                    ..Default::default()
                })),
            }),
            ..Default::default()
        };

        self.timed("create_collection", self.client.create_collection(&create_collection))
            .await?;
        tracing::info!("Collection {} created successfully", collection);
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> VectorResult<()> {
        tracing::debug!("Upserting {} points to collection {}", points.len(), collection);

        let qdrant_points: Vec<PointStruct> = points
            .into_iter()
            .map(|p| PointStruct::new(p.id, p.vector, to_qdrant_payload(p.payload)))
            .collect();

        self.timed(
            "upsert",
            self.client.upsert_points_blocking(collection, None, qdrant_points, None),
        )
        .await?;
        Ok(())
    }

    async fn search(&self, collection: &str, vector: &[f32], limit: usize) -> VectorResult<Vec<VectorHit>> {
        let search_points = SearchPoints {
            collection_name: collection.to_string(),
            vector: vector.to_vec(),
            limit: limit as u64,
            with_payload: Some(true.into()),
            ..Default::default()
        };

        let response = self.timed("search", self.client.search_points(&search_points)).await?;

        let hits: Vec<VectorHit> = response
            .result
            .into_iter()
            .filter_map(|point| {
                let id = numeric_id(point.id)?;
                Some(VectorHit::from_payload(id, point.score, &from_qdrant_payload(point.payload)))
            })
            .collect();

        tracing::debug!("Found {} results from Qdrant", hits.len());
        Ok(hits)
    }

    async fn count(&self, collection: &str) -> VectorResult<u64> {
        let request = CountPoints {
            collection_name: collection.to_string(),
            exact: Some(true),
            ..Default::default()
        };
        let response = self.timed("count", self.client.count(&request)).await?;
        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn delete_collection(&self, collection: &str) -> VectorResult<()> {
        self.timed("delete_collection", self.client.delete_collection(collection))
            .await?;
        tracing::info!("Collection {} deleted", collection);
        Ok(())
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!("Qdrant client closed");
        }
    }
}
