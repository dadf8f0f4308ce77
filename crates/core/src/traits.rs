use crate::error::ServiceError;
use crate::models::{ScoredChunk, VectorRecord};
use async_trait::async_trait;

/// A named, process-external vector collection. Creation of the collection
/// itself is out of band; a missing collection surfaces as
/// `ServiceError::CollectionNotFound`.
#[async_trait]
pub trait VectorIndex {
    async fn upsert_records(&self, records: &[VectorRecord]) -> Result<(), ServiceError>;

    async fn query_similar(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, ServiceError>;
}
