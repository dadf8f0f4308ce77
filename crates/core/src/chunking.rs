use crate::error::IngestError;
use crate::models::Chunk;
use sha2::{Digest, Sha256};

pub const DEFAULT_MAX_CHARS: usize = 750;
pub const DEFAULT_OVERLAP_CHARS: usize = 200;

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            overlap_chars: DEFAULT_OVERLAP_CHARS,
        }
    }
}

impl ChunkingConfig {
    fn validate(&self) -> Result<(), IngestError> {
        if self.max_chars == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "max_chars must be positive".to_string(),
            ));
        }
        if self.overlap_chars >= self.max_chars {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap {} must be smaller than max chunk size {}",
                self.overlap_chars, self.max_chars
            )));
        }
        Ok(())
    }
}

/// Splits text into overlapping windows of at most `max_chars` characters.
///
/// Each window after the first starts `overlap_chars` before the previous
/// window's end, so every chunk is an exact substring of the input and
/// consecutive chunks share exactly the configured overlap. A window that
/// does not reach the end of the input is cut at the latest natural boundary
/// (paragraph break, then sentence end, then word gap) found past the
/// overlap region; only boundary-free text is cut mid-token.
pub fn split_text(text: &str, config: ChunkingConfig) -> Result<Vec<String>, IngestError> {
    config.validate()?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let hard_end = (start + config.max_chars).min(chars.len());
        let end = if hard_end == chars.len() {
            hard_end
        } else {
            natural_cut(&chars, start + config.overlap_chars, hard_end)
        };

        chunks.push(chars[start..end].iter().collect());

        if end == chars.len() {
            break;
        }
        start = end - config.overlap_chars;
    }

    Ok(chunks)
}

/// Latest admissible cut index in `(floor, hard_end]`, preferring paragraph
/// breaks over sentence ends over word gaps. The floor keeps every chunk
/// longer than the overlap, which guarantees forward progress.
fn natural_cut(chars: &[char], floor: usize, hard_end: usize) -> usize {
    let boundaries: [fn(&[char], usize) -> bool; 3] = [paragraph_cut, sentence_cut, word_cut];

    for boundary in boundaries {
        for index in (floor + 1..=hard_end).rev() {
            if boundary(chars, index) {
                return index;
            }
        }
    }

    hard_end
}

fn paragraph_cut(chars: &[char], index: usize) -> bool {
    index >= 2 && chars[index - 1] == '\n' && chars[index - 2] == '\n'
}

fn sentence_cut(chars: &[char], index: usize) -> bool {
    index >= 2 && chars[index - 1].is_whitespace() && matches!(chars[index - 2], '.' | '!' | '?')
}

fn word_cut(chars: &[char], index: usize) -> bool {
    index >= 1 && chars[index - 1].is_whitespace()
}

pub fn build_chunks(
    collection: &str,
    text: &str,
    config: ChunkingConfig,
) -> Result<Vec<Chunk>, IngestError> {
    let pieces = split_text(text, config)?;

    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(index, piece)| Chunk {
            chunk_id: make_chunk_id(collection, index as u64, &piece),
            chunk_index: index as u64,
            text: piece,
        })
        .collect())
}

/// Content-derived id: re-upserting the same chunk overwrites the previous
/// record instead of inserting a duplicate.
pub fn make_chunk_id(collection: &str, index: u64, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(collection.as_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ChunkingConfig {
        ChunkingConfig::default()
    }

    fn reassemble(chunks: &[String], overlap: usize) -> String {
        let mut rebuilt = String::new();
        for (index, chunk) in chunks.iter().enumerate() {
            if index == 0 {
                rebuilt.push_str(chunk);
            } else {
                rebuilt.extend(chunk.chars().skip(overlap));
            }
        }
        rebuilt
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split_text("", config()).unwrap().is_empty());
        assert!(split_text("  \n\t ", config()).unwrap().is_empty());
    }

    #[test]
    fn short_input_is_a_single_chunk_equal_to_input() {
        let text = "A single short paragraph about pumps.";
        let chunks = split_text(text, config()).unwrap();
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn boundary_free_input_cuts_exact_windows() {
        let text = "x".repeat(2_000);
        let chunks = split_text(&text, config()).unwrap();

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].len(), 750);
        assert_eq!(chunks[1].len(), 750);
        assert_eq!(chunks[2].len(), 750);
        assert_eq!(chunks[3].len(), 350);

        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(pair[0].chars().count() - 200).collect();
            let head: String = pair[1].chars().take(200).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn removing_overlaps_reconstructs_the_input() {
        let sentence = "Alpha beta gamma delta epsilon zeta. ";
        let text = sentence.repeat(60);
        let chunks = split_text(&text, config()).unwrap();

        assert!(chunks.len() > 2);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 750));
        assert_eq!(reassemble(&chunks, 200), text);
    }

    #[test]
    fn paragraph_breaks_are_preferred_cut_points() {
        let text = format!("{}\n\n{}", "a".repeat(600), "b".repeat(600));
        let chunks = split_text(&text, config()).unwrap();

        assert_eq!(chunks[0], format!("{}\n\n", "a".repeat(600)));
        assert_eq!(chunks.len(), 3);
        // The b-run has no boundaries left, so the next window is a hard cut.
        assert_eq!(chunks[1].chars().count(), 750);
        assert_eq!(reassemble(&chunks, 200), text);
    }

    #[test]
    fn sentence_ends_are_used_when_no_paragraph_break_fits() {
        let sentence = "Alpha beta gamma delta. ";
        let text = sentence.repeat(50);
        let chunks = split_text(&text, config()).unwrap();

        assert!(chunks[0].ends_with(". "));
        assert_eq!(chunks[0].chars().count(), 744);
    }

    #[test]
    fn overlap_must_be_smaller_than_window() {
        let invalid = ChunkingConfig {
            max_chars: 200,
            overlap_chars: 200,
        };
        let result = split_text("some text", invalid);
        assert!(matches!(result, Err(IngestError::InvalidChunkConfig(_))));
    }

    #[test]
    fn chunk_ids_are_deterministic_and_distinct() {
        let text = "x".repeat(2_000);
        let first = build_chunks("topic-modeling", &text, config()).unwrap();
        let second = build_chunks("topic-modeling", &text, config()).unwrap();

        assert_eq!(first.len(), second.len());
        for (left, right) in first.iter().zip(second.iter()) {
            assert_eq!(left.chunk_id, right.chunk_id);
        }

        let mut ids: Vec<_> = first.iter().map(|chunk| chunk.chunk_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), first.len());
    }
}
