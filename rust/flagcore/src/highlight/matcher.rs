//! Segment matcher
//!
//! Glyphs are tested before aliases: a flag is an unambiguous token and
//! must not be masked by an alias of some other term appearing in the same
//! text. At most one term is chosen per segment.

use serde::Serialize;
use std::ops::Range;

use super::term_index::{MatchKind, MatcherEntry, TermIndex};

/// The term chosen for one text segment.
#[derive(Debug, Clone)]
pub struct SegmentMatch<'a> {
    pub entry: &'a MatcherEntry,
    /// Byte range of the first occurrence in the segment text
    pub first: Range<usize>,
}

impl<'a> SegmentMatch<'a> {
    pub fn kind(&self) -> MatchKind {
        self.entry.kind()
    }

    pub fn term_name(&self) -> &str {
        &self.entry.term_name
    }

    pub fn describe(&self, text: &str) -> MatchDescriptor {
        let matched_text = text.get(self.first.clone()).unwrap_or_default().to_string();
        let utf16_start = text
            .get(..self.first.start)
            .map(|prefix| prefix.encode_utf16().count())
            .unwrap_or_default();
        let utf16_end = utf16_start + matched_text.encode_utf16().count();

        MatchDescriptor {
            term_id: self.entry.term_id.clone(),
            term_name: self.entry.term_name.clone(),
            kind: self.kind(),
            matched_text,
            start: self.first.start,
            end: self.first.end,
            utf16_start,
            utf16_end,
        }
    }
}

/// Owned, serializable form of a match. Serialized offsets are UTF-16 code
/// units, which is how JS strings index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDescriptor {
    pub term_id: String,
    pub term_name: String,
    pub kind: MatchKind,
    pub matched_text: String,
    /// Byte range in the segment text
    #[serde(skip)]
    pub start: usize,
    #[serde(skip)]
    pub end: usize,
    #[serde(rename = "start")]
    pub utf16_start: usize,
    #[serde(rename = "end")]
    pub utf16_end: usize,
}

/// Decide which term, if any, owns `text`.
pub fn find_match<'a>(text: &str, index: &'a TermIndex) -> Option<SegmentMatch<'a>> {
    if let Some(entry) = index.first_glyph(text) {
        return locate(text, entry);
    }
    index.first_alias(text).and_then(|entry| locate(text, entry))
}

fn locate<'a>(text: &str, entry: &'a MatcherEntry) -> Option<SegmentMatch<'a>> {
    entry
        .find_all(text)
        .into_iter()
        .next()
        .map(|first| SegmentMatch { entry, first })
}
