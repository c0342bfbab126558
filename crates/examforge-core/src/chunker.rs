//! Sentence-bounded text chunking.
//!
//! Source text is cut into segments of at most `max_length` characters so
//! each fits in a single generation request. Cuts only happen at sentence
//! boundaries; a single sentence longer than the limit becomes its own
//! oversized chunk rather than being split mid-sentence.

/// Default upper bound on chunk length, in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 3000;

/// Sentence delimiter chunks are cut on.
pub const SENTENCE_DELIMITER: &str = ". ";

/// A contiguous segment of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in the document, starting at 0.
    pub index: usize,
    /// The chunk text, delimiters included.
    pub text: String,
}

impl Chunk {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split `text` into ordered chunks of at most `max_length` characters.
///
/// Sentences are accumulated greedily. Empty input yields no chunks.
/// Concatenating the chunks gives back [`normalize`]`(text)`.
pub fn split(text: &str, max_length: usize) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0;

    for token in sentence_tokens(text) {
        let token_len = token.chars().count();
        if !buffer.is_empty() && buffer_len + token_len > max_length {
            chunks.push(Chunk {
                index: chunks.len(),
                text: std::mem::take(&mut buffer),
            });
            buffer_len = 0;
        }
        buffer.push_str(&token);
        buffer_len += token_len;
    }

    if !buffer.is_empty() {
        chunks.push(Chunk {
            index: chunks.len(),
            text: buffer,
        });
    }

    chunks
}

/// The text as the chunks reproduce it: terminated by the sentence delimiter.
///
/// A trailing `"."` gains a space, anything else gains `". "`; text already
/// ending in `". "` is unchanged.
pub fn normalize(text: &str) -> String {
    sentence_tokens(text).concat()
}

/// Sentences with their delimiter re-appended.
fn sentence_tokens(text: &str) -> Vec<String> {
    let pieces: Vec<&str> = text.split(SENTENCE_DELIMITER).collect();
    let last = pieces.len() - 1;

    pieces
        .into_iter()
        .enumerate()
        .filter_map(|(i, piece)| {
            if i < last {
                Some(format!("{piece}{SENTENCE_DELIMITER}"))
            } else if piece.is_empty() {
                None
            } else if piece.ends_with('.') {
                Some(format!("{piece} "))
            } else {
                Some(format!("{piece}{SENTENCE_DELIMITER}"))
            }
        })
        .collect()
}
