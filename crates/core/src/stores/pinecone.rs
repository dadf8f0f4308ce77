use crate::error::ServiceError;
use crate::models::{ScoredChunk, VectorRecord};
use crate::traits::VectorIndex;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use url::Url;

const UPSERT_BATCH_SIZE: usize = 100;

/// Pinecone-style vector collection reached over its index host URL.
/// Records land in a namespace named after the collection; the index itself
/// must already exist.
pub struct PineconeStore {
    client: Client,
    endpoint: Url,
    api_key: String,
    collection: String,
}

impl PineconeStore {
    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        collection: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            client: Client::new(),
            endpoint: Url::parse(endpoint)?,
            api_key: api_key.into(),
            collection: collection.into(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn route(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.as_str().trim_end_matches('/'), path)
    }

    fn classify(&self, status: StatusCode) -> ServiceError {
        if status == StatusCode::NOT_FOUND {
            ServiceError::CollectionNotFound(self.collection.clone())
        } else {
            ServiceError::Collection(status.to_string())
        }
    }
}

#[async_trait]
impl VectorIndex for PineconeStore {
    async fn upsert_records(&self, records: &[VectorRecord]) -> Result<(), ServiceError> {
        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let vectors = batch
                .iter()
                .map(|record| {
                    json!({
                        "id": record.record_id,
                        "values": record.embedding,
                        "metadata": { "text": record.text },
                    })
                })
                .collect::<Vec<_>>();

            let response = self
                .client
                .post(self.route("/vectors/upsert"))
                .header("Api-Key", &self.api_key)
                .json(&json!({
                    "vectors": vectors,
                    "namespace": self.collection,
                }))
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(self.classify(response.status()));
            }
        }

        Ok(())
    }

    async fn query_similar(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, ServiceError> {
        let response = self
            .client
            .post(self.route("/query"))
            .header("Api-Key", &self.api_key)
            .json(&json!({
                "vector": vector,
                "topK": top_k,
                "namespace": self.collection,
                "includeMetadata": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.classify(response.status()));
        }

        let parsed: Value = response.json().await?;
        let matches = parsed
            .pointer("/matches")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut hits = Vec::new();
        for hit in matches {
            let record_id = hit
                .pointer("/id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let score = hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0);
            let text = hit
                .pointer("/metadata/text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            hits.push(ScoredChunk {
                record_id,
                score,
                text,
            });
        }

        Ok(hits)
    }
}
