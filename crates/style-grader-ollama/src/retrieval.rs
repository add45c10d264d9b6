//! Keyword retrieval over reference documents.
//!
//! Documents (the style guide itself, course notes, ...) are split into
//! overlapping line-based chunks. A query is scored against every chunk by
//! the number of distinct lowercase word tokens they share.

use std::collections::HashSet;
use style_grader_core::{ContextSource, SemanticConfig};
use tracing::debug;

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default number of lines carried over between chunks.
pub const DEFAULT_OVERLAP_LINES: usize = 3;

/// Default number of chunks returned by a search.
pub const DEFAULT_TOP_K: usize = 3;

/// One piece of an indexed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Name of the document the chunk came from.
    pub document: String,
    /// Position of the chunk within its document.
    pub index: usize,
    /// Chunk text.
    pub text: String,
    tokens: HashSet<String>,
}

impl Chunk {
    fn new(document: &str, index: usize, text: String) -> Self {
        let tokens = tokenize(&text);
        Self {
            document: document.to_string(),
            index,
            text,
            tokens,
        }
    }
}

/// Splits `content` into chunks of roughly `chunk_size` characters.
///
/// Lines are never split. When adding a line would push a non-empty chunk
/// past `chunk_size`, the chunk is closed and the next one starts with its
/// last `overlap_lines` lines. At least one line is always dropped, and
/// carried lines are dropped oldest first while they leave no room for the
/// next line.
#[must_use]
pub fn chunk_document(content: &str, chunk_size: usize, overlap_lines: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut size = 0;

    for line in content.split('\n') {
        let line_size = line.chars().count();
        if size + line_size > chunk_size && !current.is_empty() {
            chunks.push(current.join("\n"));
            let carried = overlap_lines.min(current.len() - 1);
            current.drain(..current.len() - carried);
            size = current.iter().map(|l| l.chars().count()).sum();
            while size + line_size > chunk_size && !current.is_empty() {
                size -= current.remove(0).chars().count();
            }
            current.push(line);
            size += line_size;
        } else {
            current.push(line);
            size += line_size;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }
    chunks
}

/// In-memory chunk index.
#[derive(Debug, Clone)]
pub struct ChunkIndex {
    chunks: Vec<Chunk>,
    chunk_size: usize,
    overlap_lines: usize,
    top_k: usize,
}

impl Default for ChunkIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP_LINES)
    }
}

impl ChunkIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new(chunk_size: usize, overlap_lines: usize) -> Self {
        Self {
            chunks: Vec::new(),
            chunk_size: chunk_size.max(1),
            overlap_lines,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Creates an empty index with the chunking settings of `config`.
    #[must_use]
    pub fn from_config(config: &SemanticConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap_lines).with_top_k(config.top_k)
    }

    /// Sets how many chunks [`ContextSource::context_for`] returns.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Chunks and indexes a document. Returns the number of chunks added.
    pub fn add_document(&mut self, name: &str, content: &str) -> usize {
        let before = self.chunks.len();
        for (index, text) in chunk_document(content, self.chunk_size, self.overlap_lines)
            .into_iter()
            .enumerate()
        {
            if !text.trim().is_empty() {
                self.chunks.push(Chunk::new(name, index, text));
            }
        }
        let added = self.chunks.len() - before;
        debug!("Indexed {}: {} chunk(s)", name, added);
        added
    }

    /// Number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if nothing has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns up to `top_k` chunks sharing words with `query`, best first.
    ///
    /// Chunks sharing nothing are never returned. Equal scores keep
    /// insertion order.
    #[must_use]
    pub fn search(&self, query: &str, top_k: usize) -> Vec<&Chunk> {
        let query = tokenize(query);
        let mut scored: Vec<(usize, &Chunk)> = self
            .chunks
            .iter()
            .map(|chunk| (chunk.tokens.intersection(&query).count(), chunk))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(top_k).map(|(_, c)| c).collect()
    }
}

impl ContextSource for ChunkIndex {
    fn context_for(&self, source: &str) -> Option<String> {
        let hits = self.search(source, self.top_k);
        if hits.is_empty() {
            return None;
        }
        Some(
            hits.iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join("\n---\n"),
        )
    }
}

/// Distinct lowercase words of at least two characters.
fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().count() > 1)
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_document_is_one_chunk() {
        assert_eq!(chunk_document("a\nb\nc", 100, 3), vec!["a\nb\nc"]);
    }

    #[test]
    fn chunks_overlap_by_trailing_lines() {
        let content = "aaaa\nbbbb\ncccc\ndddd\neeee";
        let chunks = chunk_document(content, 10, 1);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "bbbb\ncccc", "cccc\ndddd", "dddd\neeee"]);
    }

    #[test]
    fn overlap_never_carries_a_whole_chunk() {
        let chunks = chunk_document("aaaa\nbbbb\ncccc\ndddd", 10, 5);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "bbbb\ncccc", "cccc\ndddd"]);
        assert!(chunks.iter().all(|c| c.replace('\n', "").chars().count() <= 10));
    }

    #[test]
    fn carried_lines_yield_to_a_long_line() {
        let chunks = chunk_document("aaaaa\nbbbbb\ncccccccc", 12, 2);
        assert_eq!(chunks, vec!["aaaaa\nbbbbb", "cccccccc"]);
    }

    #[test]
    fn no_overlap() {
        let chunks = chunk_document("aaaa\nbbbb\ncccc", 8, 0);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn oversized_line_gets_its_own_chunk() {
        let long = "x".repeat(30);
        let content = format!("ab\n{long}\ncd");
        let chunks = chunk_document(&content, 10, 0);
        assert_eq!(chunks, vec!["ab".to_string(), long, "cd".to_string()]);
    }

    #[test]
    fn search_ranks_by_shared_words() {
        let mut index = ChunkIndex::new(60, 0);
        index.add_document("notes", "Memory: pair every new with delete.");
        index.add_document("style", "Naming: functions use camelCase names.");
        index.add_document("misc", "Unrelated text about testing.");
        assert_eq!(index.len(), 3);

        let hits = index.search("int* p = new int; delete p;", 3);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document, "notes");

        let hits = index.search("new delete functions names", 3);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document, "notes");
        assert_eq!(hits[1].document, "style");
    }

    #[test]
    fn search_respects_top_k() {
        let mut index = ChunkIndex::new(500, 0);
        for name in ["a", "b", "c", "d"] {
            index.add_document(name, "braces around every body");
        }
        let hits = index.search("braces", 2);
        assert_eq!(hits.iter().map(|c| c.document.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn context_joins_hits() {
        let mut index = ChunkIndex::default().with_top_k(2);
        index.add_document("one", "Use nullptr instead of NULL.");
        index.add_document("two", "Avoid NULL in new code.");
        assert_eq!(
            index.context_for("int* p = NULL;").as_deref(),
            Some("Use nullptr instead of NULL.\n---\nAvoid NULL in new code.")
        );
        assert_eq!(index.context_for("x"), None);
    }

    #[test]
    fn empty_index_gives_no_context() {
        let index = ChunkIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.context_for("int main() {}"), None);
    }
}
