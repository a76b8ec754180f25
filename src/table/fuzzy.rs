//! Ranked fuzzy matching for the global table search.
//!
//! Ranks a needle against a haystack on a closeness ladder, best first:
//! whole-string equality, prefix, word prefix, substring, then bare
//! subsequence. The engine keeps every row with any match and orders rows
//! by their best rank, so closer matches surface first.

use crate::data::row::LogRow;

/// Closeness of a match; higher is closer. `NoMatch` rows are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    NoMatch,
    /// Needle letters appear in order, but scattered.
    Subsequence,
    /// Needle appears contiguously somewhere in the value.
    Contains,
    /// Needle is a prefix of some word inside the value.
    WordPrefix,
    /// Needle is a prefix of the whole value.
    Prefix,
    /// Needle equals the value.
    Equal,
}

/// Rank `needle` against `haystack`, case-insensitively.
pub fn rank(haystack: &str, needle: &str) -> Rank {
    if needle.is_empty() {
        return Rank::Equal;
    }

    let haystack = haystack.to_lowercase();
    let needle = needle.to_lowercase();

    if haystack == needle {
        Rank::Equal
    } else if haystack.starts_with(&needle) {
        Rank::Prefix
    } else if word_prefix(&haystack, &needle) {
        Rank::WordPrefix
    } else if haystack.contains(&needle) {
        Rank::Contains
    } else if subsequence(&haystack, &needle) {
        Rank::Subsequence
    } else {
        Rank::NoMatch
    }
}

/// Best rank of `needle` across every cell of the row.
///
/// Empty cells never match, but they never exclude the row either when the
/// needle itself is empty; the engine treats an empty needle as "filter
/// off" before this is ever called.
pub fn rank_row(row: &LogRow, needle: &str) -> Rank {
    row.values()
        .filter(|cell| !cell.is_empty())
        .map(|cell| rank(&cell.to_string(), needle))
        .max()
        .unwrap_or(Rank::NoMatch)
}

fn word_prefix(haystack: &str, needle: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| !word.is_empty() && word.starts_with(needle))
}

fn subsequence(haystack: &str, needle: &str) -> bool {
    let mut chars = haystack.chars();
    needle.chars().all(|n| chars.any(|h| h == n))
}
