use std::borrow::Cow;
use std::collections::VecDeque;
use std::ops::Range;

use super::types::{Chunk, ChunkMetadata, Page};
use crate::text::truncate_to_bytes;

/// Split points tried in order; each stays attached to the piece before it.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "? ", "! ", " ", ""];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitterConfig {
    /// Maximum chunk length, in characters.
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk into the next.
    pub chunk_overlap: usize,
    /// Byte ceiling for the text copy stored in chunk metadata.
    pub metadata_text_bytes: usize,
    /// Drop `\r` and turn `\n` into a space before splitting.
    pub strip_newlines: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            metadata_text_bytes: 36_000,
            strip_newlines: true,
        }
    }
}

impl SplitterConfig {
    /// Clamp to a usable configuration: `chunk_size >= 1` and `chunk_overlap < chunk_size`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.chunk_size = self.chunk_size.max(1);
        if self.chunk_overlap >= self.chunk_size {
            self.chunk_overlap = self.chunk_size - 1;
        }
        self
    }
}

/// Recursive character splitter producing overlapping, gap-free chunks.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(SplitterConfig::default())
    }
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Page text as the splitter sees it; chunk offsets index into this string.
    #[must_use]
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.config.strip_newlines && text.contains(['\n', '\r']) {
            Cow::Owned(text.replace('\r', "").replace('\n', " "))
        } else {
            Cow::Borrowed(text)
        }
    }

    #[must_use]
    pub fn split(&self, page: &Page) -> Vec<Chunk> {
        let text = self.normalize(&page.text);
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut pieces = Vec::new();
        split_pieces(&text, 0..text.len(), SEPARATORS, self.config.chunk_size, &mut pieces);

        merge_pieces(&text, &pieces, self.config.chunk_size, self.config.chunk_overlap)
            .into_iter()
            .filter(|range| !text[range.clone()].trim().is_empty())
            .enumerate()
            .map(|(index, range)| {
                let chunk_text = &text[range.clone()];
                Chunk {
                    text: chunk_text.to_owned(),
                    page_number: page.number,
                    index,
                    start: range.start,
                    end: range.end,
                    metadata: ChunkMetadata {
                        text: truncate_to_bytes(chunk_text, self.config.metadata_text_bytes)
                            .to_owned(),
                        page_number: page.number,
                    },
                }
            })
            .collect()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Break `range` of `text` into contiguous pieces of at most `chunk_size` characters.
fn split_pieces(
    text: &str,
    range: Range<usize>,
    separators: &[&str],
    chunk_size: usize,
    out: &mut Vec<Range<usize>>,
) {
    let span = &text[range.clone()];
    if char_len(span) <= chunk_size {
        out.push(range);
        return;
    }

    let Some(pos) = separators
        .iter()
        .position(|sep| sep.is_empty() || span.contains(sep))
    else {
        out.push(range);
        return;
    };
    let sep = separators[pos];

    if sep.is_empty() {
        let mut start = range.start;
        for (count, (offset, _)) in span.char_indices().enumerate() {
            if count > 0 && count % chunk_size == 0 {
                out.push(start..range.start + offset);
                start = range.start + offset;
            }
        }
        out.push(start..range.end);
        return;
    }

    let rest = &separators[pos + 1..];
    let mut piece_start = range.start;
    for (offset, _) in span.match_indices(sep) {
        let piece_end = range.start + offset + sep.len();
        split_pieces(text, piece_start..piece_end, rest, chunk_size, out);
        piece_start = piece_end;
    }
    if piece_start < range.end {
        split_pieces(text, piece_start..range.end, rest, chunk_size, out);
    }
}

/// Greedily join contiguous pieces into chunks, carrying up to `overlap`
/// trailing characters into the next chunk.
fn merge_pieces(
    text: &str,
    pieces: &[Range<usize>],
    chunk_size: usize,
    overlap: usize,
) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<(Range<usize>, usize)> = VecDeque::new();
    let mut window_len = 0;

    for piece in pieces {
        let len = char_len(&text[piece.clone()]);

        if window_len + len > chunk_size
            && let (Some(first), Some(last)) = (window.front(), window.back())
        {
            chunks.push(first.0.start..last.0.end);
            while let Some(&(_, front_len)) = window.front() {
                if window_len > overlap || window_len + len > chunk_size {
                    window_len -= front_len;
                    window.pop_front();
                } else {
                    break;
                }
            }
        }

        window.push_back((piece.clone(), len));
        window_len += len;
    }

    if let (Some(first), Some(last)) = (window.front(), window.back()) {
        chunks.push(first.0.start..last.0.end);
    }
    chunks
}
