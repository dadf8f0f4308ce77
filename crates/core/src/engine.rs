use crate::chat::ChatModel;
use crate::embeddings::Embedder;
use crate::error::ServiceError;
use crate::models::{CallUsage, ChatMessage, ScoredChunk};
use crate::traits::VectorIndex;
use std::sync::Arc;

/// Retriever default: how many chunks back each question.
pub const DEFAULT_TOP_K: usize = 4;

#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub answer: String,
    pub history: Vec<ChatMessage>,
    pub usage: CallUsage,
}

/// Pairs a retriever over the vector collection with the hosted chat model.
/// `ask` is the only operation: retrieve context, call the model once, and
/// hand back the answer with the question/answer pair appended to history.
pub struct ConversationEngine<E, V, C>
where
    E: Embedder,
    V: VectorIndex,
    C: ChatModel,
{
    embedder: Arc<E>,
    collection: Arc<V>,
    chat: Arc<C>,
    top_k: usize,
}

impl<E, V, C> ConversationEngine<E, V, C>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
    C: ChatModel + Send + Sync,
{
    pub fn new(embedder: Arc<E>, collection: Arc<V>, chat: Arc<C>) -> Self {
        Self {
            embedder,
            collection,
            chat,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub async fn ask(
        &self,
        question: &str,
        history: &[ChatMessage],
    ) -> Result<AskOutcome, ServiceError> {
        if question.trim().is_empty() {
            return Err(ServiceError::Chat("question is empty".to_string()));
        }

        let query_vectors = self.embedder.embed_batch(&[question.to_string()]).await?;
        let query_vector = query_vectors
            .first()
            .ok_or_else(|| ServiceError::Embedding("no embedding for question".to_string()))?;

        let hits = self.collection.query_similar(query_vector, self.top_k).await?;
        let messages = build_messages(&hits, history, question);
        let completion = self.chat.complete(&messages).await?;

        let mut updated = history.to_vec();
        updated.push(ChatMessage::user(question));
        updated.push(ChatMessage::assistant(&completion.answer));

        Ok(AskOutcome {
            answer: completion.answer,
            history: updated,
            usage: completion.usage,
        })
    }
}

fn build_messages(hits: &[ScoredChunk], history: &[ChatMessage], question: &str) -> Vec<ChatMessage> {
    let mut context = String::from(
        "You answer questions about the user's documents. \
         Use only the following document excerpts; say so when they do not \
         contain the answer.",
    );
    for (index, hit) in hits.iter().enumerate() {
        context.push_str(&format!("\n\n[excerpt {}]\n{}", index + 1, hit.text));
    }

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(context));
    messages.extend_from_slice(history);
    messages.push(ChatMessage::user(question));
    messages
}

#[cfg(test)]
mod tests {
    use super::{build_messages, ConversationEngine};
    use crate::chat::{ChatCompletion, ChatModel};
    use crate::embeddings::Embedder;
    use crate::error::ServiceError;
    use crate::models::{CallUsage, ChatMessage, ChatRole, ScoredChunk, VectorRecord};
    use crate::traits::VectorIndex;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        fn dimensions(&self) -> usize {
            4
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
            Ok(texts.iter().map(|_| vec![0.1, 0.2, 0.3, 0.4]).collect())
        }
    }

    struct FakeCollection {
        hits: Vec<ScoredChunk>,
    }

    #[async_trait]
    impl VectorIndex for FakeCollection {
        async fn upsert_records(&self, _records: &[VectorRecord]) -> Result<(), ServiceError> {
            Ok(())
        }

        async fn query_similar(
            &self,
            _vector: &[f32],
            _top_k: usize,
        ) -> Result<Vec<ScoredChunk>, ServiceError> {
            Ok(self.hits.clone())
        }
    }

    #[derive(Default)]
    struct RecordingChat {
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl ChatModel for RecordingChat {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ServiceError> {
            self.requests.lock().unwrap().push(messages.to_vec());
            Ok(ChatCompletion {
                answer: "The manual covers pump maintenance.".to_string(),
                usage: CallUsage {
                    prompt_tokens: 40,
                    completion_tokens: 10,
                    total_tokens: 50,
                    cost: 0.0018,
                },
            })
        }
    }

    fn hit(text: &str) -> ScoredChunk {
        ScoredChunk {
            record_id: "r".to_string(),
            score: 0.9,
            text: text.to_string(),
        }
    }

    #[test]
    fn prompt_carries_context_history_and_question() {
        let history = vec![
            ChatMessage::user("What is this?"),
            ChatMessage::assistant("A manual."),
        ];
        let messages = build_messages(&[hit("pump specs")], &history, "Which pump?");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[0].content.contains("pump specs"));
        assert_eq!(messages[1].content, "What is this?");
        assert_eq!(messages[3].role, ChatRole::User);
        assert_eq!(messages[3].content, "Which pump?");
    }

    #[tokio::test]
    async fn ask_appends_the_pair_atomically() {
        let engine = ConversationEngine::new(
            Arc::new(FakeEmbedder),
            Arc::new(FakeCollection {
                hits: vec![hit("pump maintenance schedule")],
            }),
            Arc::new(RecordingChat::default()),
        );

        let outcome = engine.ask("What is this about?", &[]).await.unwrap();

        assert!(!outcome.answer.is_empty());
        assert_eq!(outcome.history.len(), 2);
        assert_eq!(outcome.history[0].role, ChatRole::User);
        assert_eq!(outcome.history[1].role, ChatRole::Assistant);
        assert_eq!(outcome.usage.total_tokens, 50);
    }

    #[tokio::test]
    async fn empty_question_never_reaches_the_chat_service() {
        let chat = Arc::new(RecordingChat::default());
        let engine = ConversationEngine::new(
            Arc::new(FakeEmbedder),
            Arc::new(FakeCollection { hits: Vec::new() }),
            Arc::clone(&chat),
        );

        let result = engine.ask("   ", &[]).await;

        assert!(matches!(result, Err(ServiceError::Chat(_))));
        assert!(chat.requests.lock().unwrap().is_empty());
    }
}
