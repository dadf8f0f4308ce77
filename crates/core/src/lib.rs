pub mod chat;
pub mod chunking;
pub mod embeddings;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod indexer;
pub mod ingest;
pub mod models;
pub mod session;
pub mod stores;
pub mod traits;

pub use chat::{ChatCompletion, ChatModel, OpenAiChatModel, DEFAULT_CHAT_MODEL};
pub use chunking::{
    build_chunks, make_chunk_id, split_text, ChunkingConfig, DEFAULT_MAX_CHARS,
    DEFAULT_OVERLAP_CHARS,
};
pub use embeddings::{Embedder, OpenAiEmbedder, DEFAULT_EMBEDDING_MODEL};
pub use engine::{AskOutcome, ConversationEngine, DEFAULT_TOP_K};
pub use error::{IngestError, ServiceError, SessionError};
pub use extractor::{extract_raw_text, LopdfExtractor, PdfExtractor};
pub use indexer::index_chunks;
pub use ingest::{discover_pdf_files, load_documents};
pub use models::{
    CallUsage, ChatMessage, ChatRole, Chunk, ProcessReport, ScoredChunk, UploadedDocument,
    UsageTotals, VectorRecord,
};
pub use session::Session;
pub use stores::PineconeStore;
pub use traits::VectorIndex;
