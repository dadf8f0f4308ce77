use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded file, alive only for the duration of one processing request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub chunk_index: u64,
    pub text: String,
}

/// One (embedding, text) pair destined for the vector collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub record_id: String,
    pub embedding: Vec<f32>,
    pub text: String,
}

/// A retrieval hit returned by the vector collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub record_id: String,
    pub score: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Token and cost accounting for one chat-model call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CallUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cost: f64,
}

/// Cumulative usage across a session, in submission order.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageTotals {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_cost: f64,
}

impl UsageTotals {
    pub fn record(&mut self, usage: &CallUsage) {
        self.total_tokens += usage.total_tokens;
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.total_cost += usage.cost;
    }
}

/// Summary of one document-processing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessReport {
    pub documents: usize,
    pub chunks: usize,
    pub records_upserted: usize,
    pub processed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{CallUsage, UsageTotals};

    #[test]
    fn usage_totals_accumulate_per_call_counters() {
        let mut totals = UsageTotals::default();
        let call = CallUsage {
            prompt_tokens: 120,
            completion_tokens: 30,
            total_tokens: 150,
            cost: 0.0054,
        };

        totals.record(&call);
        totals.record(&call);

        assert_eq!(totals.prompt_tokens, 240);
        assert_eq!(totals.completion_tokens, 60);
        assert_eq!(totals.total_tokens, 300);
        assert!((totals.total_cost - 0.0108).abs() < 1e-12);
    }
}
