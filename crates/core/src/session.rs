use crate::chat::ChatModel;
use crate::chunking::{build_chunks, ChunkingConfig};
use crate::embeddings::Embedder;
use crate::engine::ConversationEngine;
use crate::error::{IngestError, ServiceError, SessionError};
use crate::extractor::{extract_raw_text, PdfExtractor};
use crate::indexer::index_chunks;
use crate::models::{ChatMessage, ProcessReport, UploadedDocument, UsageTotals};
use crate::traits::VectorIndex;
use chrono::Utc;
use std::sync::Arc;

/// Per-interaction state for one user: the active conversation engine, the
/// ordered transcript, and cumulative usage counters. One session is owned
/// by one interactive surface and never shared.
pub struct Session<X, E, V, C>
where
    X: PdfExtractor,
    E: Embedder,
    V: VectorIndex,
    C: ChatModel,
{
    extractor: X,
    embedder: Arc<E>,
    collection: Arc<V>,
    chat: Arc<C>,
    collection_name: String,
    chunking: ChunkingConfig,
    engine: Option<ConversationEngine<E, V, C>>,
    history: Vec<ChatMessage>,
    usage: UsageTotals,
}

impl<X, E, V, C> Session<X, E, V, C>
where
    X: PdfExtractor,
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
    C: ChatModel + Send + Sync,
{
    pub fn new(
        extractor: X,
        embedder: Arc<E>,
        collection: Arc<V>,
        chat: Arc<C>,
        collection_name: impl Into<String>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            extractor,
            embedder,
            collection,
            chat,
            collection_name: collection_name.into(),
            chunking,
            engine: None,
            history: Vec::new(),
            usage: UsageTotals::default(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    /// Extract, chunk, and index the uploaded documents, then swap in a new
    /// conversation engine. Re-processing resets both the transcript and the
    /// usage counters: the new engine answers over a new document set, and a
    /// transcript about the old one would misattribute its answers.
    pub async fn process_documents(
        &mut self,
        documents: &[UploadedDocument],
    ) -> Result<ProcessReport, SessionError> {
        if documents.is_empty() {
            return Err(IngestError::InvalidArgument(
                "no documents to process".to_string(),
            )
            .into());
        }

        let raw_text = extract_raw_text(&self.extractor, documents)?;
        let chunks = build_chunks(&self.collection_name, &raw_text, self.chunking)?;

        if chunks.is_empty() {
            return Err(IngestError::InvalidArgument(
                "documents contained no extractable text".to_string(),
            )
            .into());
        }

        let records_upserted =
            index_chunks(self.embedder.as_ref(), self.collection.as_ref(), &chunks).await?;

        self.engine = Some(ConversationEngine::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.collection),
            Arc::clone(&self.chat),
        ));
        self.history.clear();
        self.usage = UsageTotals::default();

        Ok(ProcessReport {
            documents: documents.len(),
            chunks: chunks.len(),
            records_upserted,
            processed_at: Utc::now(),
        })
    }

    /// Answers one question against the processed documents. The question
    /// and answer are appended to the transcript as one pair, and the call's
    /// usage is added to the session totals.
    pub async fn ask(&mut self, question: &str) -> Result<String, ServiceError> {
        let engine = self.engine.as_ref().ok_or_else(|| {
            ServiceError::NotReady("process documents before asking questions".to_string())
        })?;

        let outcome = engine.ask(question, &self.history).await?;
        self.history = outcome.history;
        self.usage.record(&outcome.usage);

        Ok(outcome.answer)
    }

    /// The transcript in submission order, each entry carrying its role.
    pub fn render(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn usage(&self) -> &UsageTotals {
        &self.usage
    }
}
