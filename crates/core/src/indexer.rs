use crate::embeddings::Embedder;
use crate::error::ServiceError;
use crate::models::{Chunk, VectorRecord};
use crate::traits::VectorIndex;

/// Embeds every chunk and upserts the (vector, text) records into the
/// collection. At-least-once: a retry after partial failure re-upserts, but
/// the content-derived chunk ids make that overwrite the same records.
pub async fn index_chunks<E, V>(
    embedder: &E,
    collection: &V,
    chunks: &[Chunk],
) -> Result<usize, ServiceError>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
{
    if chunks.is_empty() {
        return Ok(0);
    }

    let texts = chunks
        .iter()
        .map(|chunk| chunk.text.clone())
        .collect::<Vec<_>>();
    let embeddings = embedder.embed_batch(&texts).await?;

    if embeddings.len() != chunks.len() {
        return Err(ServiceError::Embedding(format!(
            "embedding count {} does not match chunk count {}",
            embeddings.len(),
            chunks.len()
        )));
    }

    let expected = embedder.dimensions();
    let records = chunks
        .iter()
        .zip(embeddings)
        .map(|(chunk, embedding)| {
            if embedding.len() != expected {
                return Err(ServiceError::Embedding(format!(
                    "embedding dimension {} != {}",
                    embedding.len(),
                    expected
                )));
            }

            Ok(VectorRecord {
                record_id: chunk.chunk_id.clone(),
                embedding,
                text: chunk.text.clone(),
            })
        })
        .collect::<Result<Vec<_>, ServiceError>>()?;

    collection.upsert_records(&records).await?;
    Ok(records.len())
}
