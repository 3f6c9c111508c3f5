#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Chunk, ChunkMetadata, Document};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Boundaries tried in order: paragraph, line, word, character
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Configuration for document splitting, measured in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum number of characters per chunk
    pub chunk_size: usize,
    /// Number of characters carried over between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Splits text at the largest natural boundary that keeps chunks within budget.
///
/// Each separator stays attached to the start of the piece that follows it, so
/// every chunk is an exact (whitespace-trimmed) span of the input.
#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    config: ChunkingConfig,
    separators: Vec<String>,
}

impl RecursiveTextSplitter {
    #[inline]
    pub fn new(config: ChunkingConfig) -> Self {
        Self {
            config,
            separators: DEFAULT_SEPARATORS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[inline]
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn config(&self) -> ChunkingConfig {
        self.config
    }

    /// Split raw text into chunk strings
    #[inline]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Split loaded documents into chunks carrying the document metadata
    #[inline]
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for document in documents {
            let text = document.content.as_str();
            // Byte span of the previous chunk within `text`
            let mut previous: Option<(usize, usize)> = None;

            for (chunk_index, content) in self.split_text(text).into_iter().enumerate() {
                let start_index = match previous {
                    None => locate(text, &content, 0, 0),
                    Some((start, end)) => {
                        let after_previous = char_after(text, start);
                        let from = chars_before(text, end, self.config.chunk_overlap)
                            .max(after_previous);
                        locate(text, &content, from, after_previous)
                    }
                };
                previous = Some((start_index, start_index + content.len()));

                chunks.push(Chunk {
                    content,
                    metadata: ChunkMetadata {
                        document: document.metadata.clone(),
                        chunk_index,
                        start_index,
                    },
                });
            }
        }

        debug!(
            "Split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        let (separator, remaining) = pick_separator(text, separators);
        let splits = split_keeping_separator(text, separator);

        let mut good_splits: Vec<&str> = Vec::new();
        for split in splits {
            if char_len(split) < self.config.chunk_size {
                good_splits.push(split);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }

            if remaining.is_empty() {
                final_chunks.push(split.to_string());
            } else {
                final_chunks.extend(self.split_recursive(split, remaining));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }

        final_chunks
    }

    /// Greedily pack adjacent pieces into chunks, keeping a tail of at most
    /// `chunk_overlap` characters as the start of the next chunk
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let ChunkingConfig {
            chunk_size,
            chunk_overlap,
        } = self.config;

        let mut docs = Vec::new();
        let mut window: Vec<(&str, usize)> = Vec::new();
        let mut window_start = 0;
        let mut total = 0;

        for &split in splits {
            let len = char_len(split);

            if total + len > chunk_size && window.len() > window_start {
                if total > chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, chunk_size
                    );
                }

                if let Some(doc) = join_pieces(&window[window_start..]) {
                    docs.push(doc);
                }

                while total > chunk_overlap || (total + len > chunk_size && total > 0) {
                    total -= window[window_start].1;
                    window_start += 1;
                }
            }

            window.push((split, len));
            total += len;
        }

        if let Some(doc) = join_pieces(&window[window_start..]) {
            docs.push(doc);
        }

        docs
    }
}

impl Default for RecursiveTextSplitter {
    #[inline]
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return (separator.as_str(), &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[i + 1..]);
        }
    }

    (separators.last().map_or("", String::as_str), &[])
}

/// Split `text` before every occurrence of `separator`, dropping empty pieces.
/// An empty separator splits into single characters.
#[expect(
    clippy::string_slice,
    reason = "all offsets come from char_indices or match_indices"
)]
fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut piece_start = 0;
    for (index, _) in text.match_indices(separator) {
        if index > piece_start {
            pieces.push(&text[piece_start..index]);
        }
        piece_start = index;
    }
    if piece_start < text.len() {
        pieces.push(&text[piece_start..]);
    }

    pieces.retain(|piece| !piece.is_empty());
    pieces
}

fn join_pieces(pieces: &[(&str, usize)]) -> Option<String> {
    let joined: String = pieces.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Byte offset of `chunk` in `text`, searching from `from` and then from `fallback`
fn locate(text: &str, chunk: &str, from: usize, fallback: usize) -> usize {
    [from, fallback]
        .into_iter()
        .find_map(|start| text.get(start..)?.find(chunk).map(|position| start + position))
        .unwrap_or(from)
}

/// Byte offset `count` characters before `end`
fn chars_before(text: &str, end: usize, count: usize) -> usize {
    if count == 0 {
        return end;
    }

    text.get(..end)
        .and_then(|head| head.char_indices().rev().nth(count - 1))
        .map_or(0, |(index, _)| index)
}

/// Byte offset of the character following the one at `index`
fn char_after(text: &str, index: usize) -> usize {
    text.get(index..)
        .and_then(|tail| tail.chars().next())
        .map_or(index, |c| index + c.len_utf8())
}

#[inline]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
