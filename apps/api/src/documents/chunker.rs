//! Text Chunker — splits resume text into overlapping, section-aware word windows.
//!
//! Headings are matched line-by-line against `SECTION_HEADINGS`. When at least two
//! blocks are found each block is windowed on its own; otherwise the whole text is.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CHUNK_SIZE: usize = 800;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Heading words that open a section (matched case-insensitively). A heading may
/// stand alone or lead its line as `Skills: Rust, Go`.
pub const SECTION_HEADINGS: &[&str] = &[
    "summary",
    "professional summary",
    "profile",
    "about me",
    "experience",
    "work experience",
    "employment history",
    "professional experience",
    "education",
    "academic background",
    "skills",
    "technical skills",
    "core competencies",
    "projects",
    "key projects",
    "certifications",
    "certificates",
    "awards",
    "achievements",
    "honors",
];

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = SECTION_HEADINGS
        .iter()
        .map(|h| regex::escape(h).replace(' ', r"\s+"))
        .collect();
    Regex::new(&format!(r"(?i)^(?:{})\s*(?::.*)?$", alternatives.join("|")))
        .expect("section heading pattern is valid")
});

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+").expect("word pattern is valid"));

#[derive(Debug, Error, PartialEq)]
pub enum ChunkerError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Header,
    Content,
    Section,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub source: String,
    pub chunk_type: ChunkType,
    /// Best-effort offsets into the original text; never used for re-slicing.
    pub start_char: usize,
    pub end_char: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    pub index: usize,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkStats {
    pub total_chunks: usize,
    pub avg_chunk_size: usize,
    pub total_characters: usize,
}

/// A contiguous slice of the source text, opened by a heading or not.
#[derive(Debug)]
struct Block<'a> {
    text: &'a str,
    offset: usize,
    is_section: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkerError> {
        if chunk_size == 0 {
            return Err(ChunkerError::ZeroChunkSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkerError::OverlapTooLarge {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    pub fn chunk_document(&self, text: &str, source: &str) -> Vec<TextChunk> {
        let blocks = split_into_blocks(text);

        let blocks = if blocks.len() > 1 {
            blocks
        } else {
            vec![Block {
                text,
                offset: 0,
                is_section: false,
            }]
        };

        let mut chunks = Vec::new();
        for block in blocks {
            for (i, (chunk_text, start, end)) in self.windows(block.text).into_iter().enumerate() {
                let chunk_type = if block.is_section && i == 0 {
                    ChunkType::Section
                } else {
                    ChunkType::Content
                };
                chunks.push(TextChunk {
                    text: chunk_text,
                    index: chunks.len(),
                    metadata: ChunkMetadata {
                        source: source.to_string(),
                        chunk_type,
                        start_char: block.offset + start,
                        end_char: block.offset + end,
                    },
                });
            }
        }
        chunks
    }

    /// Sliding word windows over `text`: `(joined words, start offset, end offset)`.
    fn windows(&self, text: &str) -> Vec<(String, usize, usize)> {
        let words: Vec<regex::Match<'_>> = WORD_RE.find_iter(text).collect();
        let mut windows = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            let slice = &words[start..end];
            let joined = slice
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            windows.push((joined, slice[0].start(), slice[slice.len() - 1].end()));

            if end == words.len() {
                break;
            }
            start += self.stride();
        }
        windows
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

pub fn is_section_heading(line: &str) -> bool {
    HEADING_RE.is_match(line.trim())
}

/// Splits text at heading lines. Blank blocks are dropped.
fn split_into_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut block_start = 0;
    let mut block_is_section = false;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if is_section_heading(line) && offset > block_start {
            blocks.push(Block {
                text: &text[block_start..offset],
                offset: block_start,
                is_section: block_is_section,
            });
            block_start = offset;
        }
        if is_section_heading(line) {
            block_is_section = true;
        }
        offset += line.len();
    }
    if offset > block_start {
        blocks.push(Block {
            text: &text[block_start..offset],
            offset: block_start,
            is_section: block_is_section,
        });
    }

    blocks.retain(|b| !b.text.trim().is_empty());
    blocks
}

pub fn chunk_stats(chunks: &[TextChunk]) -> ChunkStats {
    let total_characters: usize = chunks.iter().map(|c| c.text.chars().count()).sum();
    let avg_chunk_size = if chunks.is_empty() {
        0
    } else {
        (total_characters as f64 / chunks.len() as f64).round() as usize
    };
    ChunkStats {
        total_chunks: chunks.len(),
        avg_chunk_size,
        total_characters,
    }
}
