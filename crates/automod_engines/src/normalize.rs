#![forbid(unsafe_code)]

//! Canonical text forms used to defeat common word-filter evasion.
//!
//! Every form keeps plain whitespace where it was, so word-boundary matching
//! never joins two neighbouring words into a blocked term.

use std::ops::Range;

use unicode_normalization::UnicodeNormalization;

pub const LEET_SUBSTITUTIONS: [(char, char); 9] = [
    ('0', 'o'),
    ('1', 'i'),
    ('3', 'e'),
    ('4', 'a'),
    ('5', 's'),
    ('7', 't'),
    ('$', 's'),
    ('@', 'a'),
    ('!', 'i'),
];

pub const SEPARATORS: [char; 4] = ['_', '-', '.', '|'];

pub fn is_separator(c: char) -> bool {
    SEPARATORS.contains(&c)
}

pub fn leet_to_plain(c: char) -> char {
    LEET_SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
        .unwrap_or(c)
}

/// Compatibility fold (full-width and stylised letters to plain forms) plus lowercase.
pub fn fold_compat(raw: &str) -> String {
    raw.nfkc().collect::<String>().to_lowercase()
}

/// Lowercased, compatibility-folded text with leet digits/symbols mapped to letters.
pub fn normalize(raw: &str) -> String {
    fold_compat(raw).chars().map(leet_to_plain).collect()
}

/// Removes `_ - . |` wherever they appear; whitespace is untouched.
pub fn strip_separators(raw: &str) -> String {
    raw.chars().filter(|c| !is_separator(*c)).collect()
}

/// Removes separator runs together with the whitespace hugging them (`h - a - c - k`).
pub fn strip_separators_with_spacing(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if !is_separator(c) {
            out.push(c);
            continue;
        }
        let kept = out.trim_end_matches(char::is_whitespace).len();
        out.truncate(kept);
        while let Some(&next) = chars.peek() {
            if is_separator(next) || next.is_whitespace() {
                chars.next();
            } else {
                break;
            }
        }
    }
    out
}

/// Compatibility-folded text that remembers which raw bytes produced each
/// folded byte, so matches found in the folded form can be cut out of the raw one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldMap {
    folded: String,
    /// `(folded_start, raw_range)` per raw char, in order.
    segments: Vec<(usize, Range<usize>)>,
}

impl FoldMap {
    pub fn of(raw: &str) -> Self {
        let mut folded = String::with_capacity(raw.len());
        let mut segments = Vec::new();
        for (start, c) in raw.char_indices() {
            let folded_start = folded.len();
            folded.extend(std::iter::once(c).nfkc().flat_map(char::to_lowercase));
            if folded.len() > folded_start {
                segments.push((folded_start, start..start + c.len_utf8()));
            }
        }
        Self { folded, segments }
    }

    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// Smallest raw byte range covering every raw char that fed `folded`.
    pub fn raw_range(&self, folded: Range<usize>) -> Option<Range<usize>> {
        if folded.is_empty() || folded.end > self.folded.len() {
            return None;
        }
        let first = self.segment_at(folded.start)?;
        let last = self.segment_at(folded.end - 1)?;
        Some(first.start..last.end)
    }

    fn segment_at(&self, folded_offset: usize) -> Option<&Range<usize>> {
        let idx = self
            .segments
            .partition_point(|(start, _)| *start <= folded_offset)
            .checked_sub(1)?;
        self.segments.get(idx).map(|(_, raw)| raw)
    }
}

/// Candidate forms of one message tried by the bad-word matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchForms {
    pub literal: String,
    pub leet: String,
    pub stripped: String,
    pub stripped_spacing: String,
}

impl MatchForms {
    pub fn of(content: &str) -> Self {
        let literal = fold_compat(content);
        let leet = literal.chars().map(leet_to_plain).collect();
        let stripped = strip_separators(&literal);
        let stripped_spacing = strip_separators_with_spacing(&literal);
        Self {
            literal,
            leet,
            stripped,
            stripped_spacing,
        }
    }

    pub fn plain(&self) -> [&str; 2] {
        [&self.literal, &self.leet]
    }

    pub fn obfuscated(&self) -> [&str; 2] {
        [&self.stripped, &self.stripped_spacing]
    }
}
